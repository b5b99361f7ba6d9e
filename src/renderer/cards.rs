use crate::config::COLLAPSED_PRODUCT_COUNT;
use crate::pipeline::{Product, Recommendation};

/// Render a recommendation as plain text: the reply, then numbered product
/// cards. Only the first few cards are shown unless `show_all` is set.
pub fn render_recommendation(rec: &Recommendation, show_all: bool) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(rec.message.trim());
    out.push('\n');

    if rec.products.is_empty() {
        return out;
    }

    let shown = if show_all {
        rec.products.len()
    } else {
        rec.products.len().min(COLLAPSED_PRODUCT_COUNT)
    };

    out.push('\n');
    for (i, product) in rec.products.iter().take(shown).enumerate() {
        out.push_str(&render_card(i + 1, product));
    }

    let hidden = rec.products.len() - shown;
    if hidden > 0 {
        out.push_str(&format!(
            "  (+{} more products, use --all to show them)\n",
            hidden
        ));
    }

    out
}

fn render_card(position: usize, product: &Product) -> String {
    let mut card = format!("  {}. {}", position, product.name);
    if !product.price.is_empty() {
        card.push_str(&format!(" - {}", product.price));
    }
    card.push('\n');

    if let Some(ref description) = product.description {
        if !description.trim().is_empty() {
            card.push_str(&format!("     {}\n", description.trim()));
        }
    }
    if !product.link.is_empty() {
        card.push_str(&format!("     {}\n", product.link));
    }
    card
}
