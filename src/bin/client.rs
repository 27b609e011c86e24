//! NewsPay CLI client
//!
//! Exercises the gate the way a programmatic consumer would: a plain GET to
//! see the payment challenge, `--pay` to run the payment flow up to the
//! hosted checkout page, and `--with-auth` to fetch news with a purchased
//! token.
//!
//! reqwest sends no User-Agent header unless one is configured, so the gate
//! always classifies this client as programmatic.

use std::process::ExitCode;

use clap::Parser;
use reqwest::StatusCode;

use newspay::types::{offers, Category, CheckoutCreated, PaymentChallenge, PaymentRequest};

#[derive(Parser)]
#[command(
    name = "newspay-client",
    about = "CLI client for the NewsPay News Demo server"
)]
struct Cli {
    /// URL of the NewsPay server
    #[arg(long, default_value = "http://localhost:8000")]
    server_url: String,

    /// Initiate the payment flow
    #[arg(long, conflicts_with = "with_auth")]
    pay: bool,

    /// Make an authenticated GET request using the provided Bearer token
    #[arg(long, value_name = "TOKEN")]
    with_auth: Option<String>,

    /// Purchase access for a specific category: politics, international,
    /// economy, technology, sports or entertainment (use with --pay).
    /// If omitted, purchases access for all categories
    #[arg(long, requires = "pay")]
    category: Option<Category>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = if cli.pay {
        run_payment_flow(&cli).await
    } else if let Some(token) = &cli.with_auth {
        run_authenticated_get(&cli.server_url, token).await
    } else {
        run_plain_get(&cli.server_url).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_payment_flow(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let offer_id = if cli.category.is_some() {
        offers::ONE_CATEGORY
    } else {
        offers::ALL_CATEGORIES
    };
    match cli.category {
        Some(category) => {
            println!("Attempting payment flow ({offer_id}) for category '{category}'...")
        }
        None => println!("Attempting payment flow ({offer_id}) for all categories..."),
    }

    let client = reqwest::Client::new();

    println!("Making initial GET request to {}...", cli.server_url);
    let response = client.get(&cli.server_url).send().await?;
    let status = response.status();
    println!("Initial GET response status: {status}");

    if status != StatusCode::PAYMENT_REQUIRED {
        print_maybe_json(&response.text().await.unwrap_or_default());
        return Err(format!("expected status 402 for payment initiation, got {status}").into());
    }

    let challenge: PaymentChallenge = response.json().await?;
    println!("Received 402 Payment Required. Offer details:");
    println!("{}", serde_json::to_string_pretty(&challenge)?);

    let request = PaymentRequest {
        payment_context_token: challenge.payment_context_token.clone(),
        offer_id: offer_id.to_string(),
        category: cli.category,
    };

    println!(
        "\nMaking POST payment request to {}...",
        challenge.payment_request_url
    );
    println!("Payload:");
    println!("{}", serde_json::to_string_pretty(&request)?);

    let response = client
        .post(&challenge.payment_request_url)
        .json(&request)
        .send()
        .await?;
    let status = response.status();
    println!("\nPayment POST response status: {status}");

    if !status.is_success() {
        println!("\n❌ Payment failed.");
        print_maybe_json(&response.text().await.unwrap_or_default());
        return Err(format!("payment request failed with status {status}").into());
    }

    let created: CheckoutCreated = response.json().await?;
    println!("Payment response body:");
    println!("{}", serde_json::to_string_pretty(&created)?);

    println!("\n✅ Checkout session created successfully!");
    println!("\n🔗 Checkout URL: {}", created.checkout_url);
    println!("\nComplete the payment in your browser:");
    println!("1. Open the checkout URL above");
    println!("2. Copy the Bearer token from the success page");
    println!("3. Use it with: newspay-client --with-auth <TOKEN>");

    Ok(())
}

async fn run_authenticated_get(
    server_url: &str,
    token: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Making authenticated GET request to {server_url}...");

    let client = reqwest::Client::new();
    let response = client.get(server_url).bearer_auth(token).send().await?;
    println!("Response Status Code: {}", response.status());

    println!("\nResponse Body:");
    print_maybe_json(&response.text().await?);
    Ok(())
}

async fn run_plain_get(server_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Making default GET request to {server_url}...");

    let client = reqwest::Client::new();
    let response = client.get(server_url).send().await?;
    println!("Response Status Code: {}", response.status());

    println!("\nResponse Body:");
    print_maybe_json(&response.text().await?);
    Ok(())
}

/// Pretty-print a body as JSON when it parses, raw otherwise
fn print_maybe_json(body: &str) {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => println!("{pretty}"),
            Err(_) => println!("{body}"),
        },
        Err(_) => {
            println!("Response is not valid JSON. Raw text:");
            println!("{body}");
        }
    }
}
