//! HTML pages served to browsers
//!
//! The newsroom page renders every category as a column, newest items
//! first. The success and cancel pages are the landing targets the
//! processor redirects payers to after checkout.

use crate::gate;
use crate::types::ContentItem;

const NEWSROOM_STYLES: &str = r#"<style>
    body { font-family: sans-serif; margin: 0; padding: 0; background-color: #f4f4f4; }
    header { background-color: #333; color: #fff; padding: 1rem 0; text-align: center; margin-bottom: 2rem; }
    h1 { margin: 0; font-size: 2.5rem; }
    .container { width: 95%; margin: 0 auto; }
    .category-container { display: flex; flex-wrap: wrap; gap: 1.5rem; justify-content: center; }
    .category-column { background-color: #fff; padding: 1rem; box-shadow: 0 0 10px rgba(0,0,0,0.1); flex: 1; min-width: 280px; }
    .category-column h2 { margin-top: 0; font-size: 1.8rem; color: #333; border-bottom: 2px solid #eee; padding-bottom: 0.5rem; margin-bottom: 1rem; }
    article { border-bottom: 1px solid #eee; padding-bottom: 1rem; margin-bottom: 1rem; }
    article:last-child { border-bottom: none; margin-bottom: 0; }
    article h3 { margin-top: 0; margin-bottom: 0.5rem; font-size: 1.1rem; color: #444; }
    article p { color: #555; line-height: 1.5; font-size: 0.9rem; margin-bottom: 0.5rem; }
    .metadata { font-size: 0.75rem; color: #777; }
</style>"#;

const CANCEL_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Payment Cancelled</title>
    <style>
        body { font-family: Arial, sans-serif; text-align: center; padding: 50px; }
        .cancel { color: orange; font-size: 24px; margin-bottom: 20px; }
    </style>
</head>
<body>
    <div class="cancel">❌ Payment Cancelled</div>
    <p>Your payment was cancelled. You can try again later.</p>
</body>
</html>"#;

/// Render the full newsroom page, one column per category with content
pub fn newsroom_page(items: &[ContentItem]) -> String {
    let mut columns = String::new();
    for (category, group) in gate::group_by_category(items) {
        columns.push_str("<div class=\"category-column\">\n");
        columns.push_str(&format!("<h2>{}</h2>\n", category.display_name()));
        for item in group {
            columns.push_str(&format!(
                "<article>\n<h3>{}</h3>\n<p>{}</p>\n<div class=\"metadata\">\n<span>{}</span>\n</div>\n</article>\n",
                display_title(&item.title),
                item.description,
                item.timestamp.format("%Y-%m-%d %H:%M"),
            ));
        }
        columns.push_str("</div>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>NewsPay News Demo</title>
    {styles}
</head>
<body>
    <header>
        <h1>NewsPay News</h1>
    </header>
    <div class="container">
        <div class="category-container">
{columns}        </div>
    </div>
</body>
</html>"#,
        styles = NEWSROOM_STYLES,
        columns = columns,
    )
}

/// Render the post-payment landing page carrying the bearer token
pub fn success_page(context_token: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Payment Successful</title>
    <style>
        body {{ font-family: Arial, sans-serif; text-align: center; padding: 50px; }}
        .success {{ color: green; font-size: 24px; margin-bottom: 20px; }}
        .token {{ background: #f0f0f0; padding: 20px; margin: 20px; border-radius: 5px; font-family: monospace; }}
    </style>
</head>
<body>
    <div class="success">✅ Payment Successful!</div>
    <p>Your payment has been processed successfully.</p>
    <p>Use this Bearer token for API access:</p>
    <div class="token">{token}</div>
    <p>You can now use this token with the --with-auth parameter in the client.</p>
</body>
</html>"#,
        token = context_token,
    )
}

/// The page shown when the payer abandons checkout
pub fn cancel_page() -> &'static str {
    CANCEL_PAGE
}

/// Drop a leading `"Something:"` prefix from a headline
fn display_title(title: &str) -> &str {
    match title.split_once(':') {
        Some((_, rest)) => rest.trim(),
        None => title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;
    use chrono::{TimeZone, Utc};

    fn item(category: Category, title: &str, hours_ago: i64) -> ContentItem {
        ContentItem {
            timestamp: Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
                - chrono::Duration::hours(hours_ago),
            title: title.to_string(),
            description: "A description.".to_string(),
            category,
        }
    }

    #[test]
    fn test_newsroom_page_structure() {
        let items = vec![
            item(Category::Politics, "Politics News: Vote Held", 1),
            item(Category::Sports, "Sports News: Final Played", 2),
        ];
        let page = newsroom_page(&items);

        assert!(page.contains("<title>NewsPay News Demo</title>"));
        assert!(page.contains("<h1>NewsPay News</h1>"));
        assert!(page.contains("<h2>Politics</h2>"));
        assert!(page.contains("<h2>Sports</h2>"));
        assert!(page.contains("<h3>Vote Held</h3>"));
    }

    #[test]
    fn test_newsroom_page_omits_empty_categories() {
        let items = vec![item(Category::Economy, "Economy News: Rates Cut", 1)];
        let page = newsroom_page(&items);
        assert!(page.contains("<h2>Economy</h2>"));
        assert!(!page.contains("<h2>Entertainment</h2>"));
    }

    #[test]
    fn test_newsroom_page_formats_timestamps() {
        let items = vec![item(Category::Technology, "Launch", 0)];
        let page = newsroom_page(&items);
        assert!(page.contains("<span>2025-05-01 12:00</span>"));
        assert!(page.contains("<h3>Launch</h3>"));
    }

    #[test]
    fn test_newsroom_page_with_no_items() {
        let page = newsroom_page(&[]);
        assert!(page.contains("category-container"));
        assert!(!page.contains("<h2>"));
    }

    #[test]
    fn test_success_page_carries_token() {
        let page = success_page("ctx-token-1");
        assert!(page.contains("✅ Payment Successful!"));
        assert!(page.contains("<div class=\"token\">ctx-token-1</div>"));
        assert!(page.contains("--with-auth"));
    }

    #[test]
    fn test_cancel_page() {
        let page = cancel_page();
        assert!(page.contains("❌ Payment Cancelled"));
        assert!(page.contains("You can try again later."));
    }

    #[test]
    fn test_display_title_strips_prefix() {
        assert_eq!(display_title("Sports News: Big Win"), "Big Win");
        assert_eq!(display_title("No Prefix Here"), "No Prefix Here");
        assert_eq!(display_title("A: B: C"), "B: C");
    }
}
