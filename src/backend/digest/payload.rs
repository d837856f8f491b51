/**
 * Digest Payload
 *
 * One payload is rendered per run and shared by every recipient send. It
 * captures the recipient list as it was when the run looked it up.
 */
use crate::shared::{Product, Recipient};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestPayload {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<Recipient>,
}

impl DigestPayload {
    pub fn build(products: &[Product], recipients: Vec<Recipient>) -> Self {
        Self {
            subject: render_subject(products.len()),
            body: render_body(products),
            recipients,
        }
    }
}

fn render_subject(count: usize) -> String {
    match count {
        1 => "1 new product in the store".to_string(),
        n => format!("{} new products in the store", n),
    }
}

fn render_body(products: &[Product]) -> String {
    let mut body = String::from("New in the catalog since the last digest:\n\n");
    for product in products {
        body.push_str(&format!("- {} ({})\n", product.name, format_price(product.price_cents)));
        if let Some(description) = product.description.as_deref().filter(|d| !d.trim().is_empty()) {
            body.push_str(&format!("  {}\n", description.trim()));
        }
    }
    body
}

fn format_price(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn product(name: &str, price_cents: i64, description: Option<&str>) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
            price_cents,
            category_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_render() {
        let payload = DigestPayload::build(
            &[
                product("Desk Lamp", 2500, Some("Warm light")),
                product("Mug", 799, None),
            ],
            Vec::new(),
        );

        assert_eq!(payload.subject, "2 new products in the store");
        assert_eq!(
            payload.body,
            "New in the catalog since the last digest:\n\n\
             - Desk Lamp (25.00)\n  Warm light\n\
             - Mug (7.99)\n"
        );
    }

    #[test]
    fn test_singular_subject() {
        let payload = DigestPayload::build(&[product("Mug", 5, None)], Vec::new());
        assert_eq!(payload.subject, "1 new product in the store");
        assert!(payload.body.contains("- Mug (0.05)"));
    }
}
