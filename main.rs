//! NewsPay Gate Server
//!
//! Pay-per-access news gate: browsers get the HTML newsroom for free, while
//! programmatic clients buy access through an L402-style 402 flow backed by
//! a Stripe-shaped checkout processor.
//!
//! # Usage
//!
//! ```bash
//! STRIPE_SECRET_KEY=sk_test_... cargo run --bin newspay
//! ```
//!
//! # Environment Variables
//!
//! - `STRIPE_SECRET_KEY` - Processor secret key (required)
//! - `STRIPE_WEBHOOK_SECRET` - Webhook signature secret (unset accepts deliveries unverified)
//! - `STRIPE_API_BASE` - Processor API base (default: `https://api.stripe.com`)
//! - `NEWSPAY_BIND` - Listen address (default: `0.0.0.0:8000`)
//! - `NEWSPAY_PUBLIC_URL` - Externally reachable base URL (default: `http://localhost:8000`)
//! - `NEWSPAY_DB` - Entitlement snapshot path (default: `payments_db.json`)
//! - `RUST_LOG` - Log level filter (default: `info`)

use newspay::config::GateConfig;
use newspay::server::{router, AppState};
use newspay::store::{EntitlementStore, JsonFileBackend};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // A .env file is honored for local development
    dotenvy::dotenv().ok();

    // Initialize tracing with RUST_LOG env filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("Gate failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = GateConfig::from_env()?;
    tracing::info!(
        bind = %config.bind_addr,
        public_url = %config.public_url,
        db = %config.db_path.display(),
        webhook_verification = config.webhook_secret.is_some(),
        "Loaded configuration"
    );

    let store = EntitlementStore::open(JsonFileBackend::new(&config.db_path)).await;
    let state = AppState::new(config.clone(), store)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    println!("📰 NewsPay gate running on http://{}", config.bind_addr);
    println!("📋 Available endpoints:");
    println!("   GET  / - News: HTML for browsers, JSON for entitled clients");
    println!("   POST /l402/payment-request - Accept an offer, get a checkout URL");
    println!("   GET  /payment/success - Processor redirect callback");
    println!("   GET  /payment/cancel - Abandoned checkout page");
    println!("   POST /webhook - Processor event deliveries");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gate shut down gracefully");
    Ok(())
}

/// Waits for Ctrl-C or SIGTERM (Unix) to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down..."),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.expect("failed to listen for Ctrl-C");
        tracing::info!("Received Ctrl-C, shutting down...");
    }
}
