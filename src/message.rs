use crate::order::{LineItem, Order};

/// Builds the admin notification for an order, formatted for Telegram's HTML
/// parse mode.
pub(crate) fn build_order_notification(order: &Order) -> String {
    let mut lines = vec![
        "🛒 <b>Новый заказ!</b>".to_string(),
        String::new(),
        format!("👤 <b>Покупатель:</b> {}", escape_html(order.customer_name())),
        format!("📱 <b>Контакт:</b> {}", escape_html(order.customer_contact())),
        String::new(),
        "<b>📦 Товары:</b>".to_string(),
    ];

    lines.extend(order.items().iter().map(item_line));

    lines.push(String::new());
    lines.push(format!("💰 <b>Итого:</b> {} ₽", order.total_price()));

    lines.join("\n")
}

fn item_line(item: &LineItem) -> String {
    format!(
        "• {} × {} = {} ₽",
        escape_html(item.title()),
        item.quantity(),
        item.line_total()
    )
}

// Telegram rejects the whole message if user text breaks the markup.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
