use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) const NOT_SPECIFIED: &str = "Не указано";
pub(crate) const DEFAULT_ITEM_TITLE: &str = "Товар";
const DEFAULT_QUANTITY: u32 = 1;

/// An order as submitted by the storefront.
///
/// Fields are kept exactly as received (after coercion of wrongly typed
/// values to "absent"); defaults are applied by the accessors, so the order
/// itself is never rewritten.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Order {
    #[serde(default, deserialize_with = "lenient_text")]
    customer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    customer_contact: Option<String>,
    #[serde(default, deserialize_with = "lenient_items")]
    items: Vec<LineItem>,
    #[serde(default, deserialize_with = "lenient_price")]
    total_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LineItem {
    #[serde(default, deserialize_with = "lenient_text")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_quantity")]
    quantity: Option<u32>,
    #[serde(default, deserialize_with = "lenient_price")]
    price: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum InvalidOrder {
    #[error("Invalid order payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid order payload: expected a JSON object")]
    NotAnObject,
}

impl Order {
    /// Parses a request body. A missing or blank body is an empty order.
    pub fn from_body(body: &[u8]) -> Result<Self, InvalidOrder> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Order::default());
        }
        match serde_json::from_slice::<Value>(body)? {
            value @ Value::Object(_) => Ok(Order::deserialize(value)?),
            _ => Err(InvalidOrder::NotAnObject),
        }
    }

    pub fn customer_name(&self) -> &str {
        self.customer_name.as_deref().unwrap_or(NOT_SPECIFIED)
    }

    pub fn customer_contact(&self) -> &str {
        self.customer_contact.as_deref().unwrap_or(NOT_SPECIFIED)
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn total_price(&self) -> f64 {
        self.total_price.unwrap_or(0.0)
    }
}

impl LineItem {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_ITEM_TITLE)
    }

    pub fn quantity(&self) -> u32 {
        self.quantity.unwrap_or(DEFAULT_QUANTITY)
    }

    pub fn price(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }

    /// Falls back to 0 when the product overflows.
    pub fn line_total(&self) -> f64 {
        let total = self.price() * f64::from(self.quantity());
        if total.is_finite() {
            total
        } else {
            tracing::warn!("Line total of {} overflows, using 0", self.title());
            0.0
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => {
            tracing::warn!("Ignoring non-text value {}, using default", other);
            None
        }
    })
}

fn lenient_quantity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let quantity = match &value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .and_then(|q| u32::try_from(q).ok());

    if quantity.is_none() {
        tracing::warn!("Invalid quantity {}, using default", value);
    }
    Ok(quantity)
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let price = match &value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|p| p.is_finite());

    if price.is_none() {
        tracing::warn!("Invalid price {}, using default", value);
    }
    Ok(price)
}

fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<LineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Null => return Ok(vec![]),
        other => {
            tracing::warn!("Ignoring non-array items {}", other);
            return Ok(vec![]);
        }
    };

    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            Value::Object(_) => LineItem::deserialize(&entry).unwrap_or_else(|e| {
                tracing::warn!("Invalid line item {}: {}", entry, e);
                LineItem::default()
            }),
            other => {
                tracing::warn!("Ignoring non-object line item {}, using defaults", other);
                LineItem::default()
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{InvalidOrder, Order, DEFAULT_ITEM_TITLE, NOT_SPECIFIED};
    use serde_json::json;

    fn order_from(value: serde_json::Value) -> Order {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn when_body_is_empty_object_should_read_defaults() {
        let order = order_from(json!({}));

        assert_eq!(order.customer_name(), NOT_SPECIFIED);
        assert_eq!(order.customer_contact(), NOT_SPECIFIED);
        assert!(order.items().is_empty());
        assert_eq!(order.total_price(), 0.0);
    }

    #[test]
    fn when_fields_are_present_should_read_them() {
        let order = order_from(json!({
            "customerName": "Ann",
            "customerContact": "+1",
            "items": [{"title": "Widget", "quantity": 2, "price": 10}],
            "totalPrice": 20
        }));

        assert_eq!(order.customer_name(), "Ann");
        assert_eq!(order.customer_contact(), "+1");
        assert_eq!(order.items().len(), 1);
        let item = &order.items()[0];
        assert_eq!(item.title(), "Widget");
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.price(), 10.0);
        assert_eq!(item.line_total(), 20.0);
        assert_eq!(order.total_price(), 20.0);
    }

    #[test]
    fn when_item_fields_are_missing_should_default_quantity_to_one() {
        let order = order_from(json!({"items": [{}, {"price": 7.5}]}));

        let items = order.items();
        assert_eq!(items[0].title(), DEFAULT_ITEM_TITLE);
        assert_eq!(items[0].quantity(), 1);
        assert_eq!(items[0].line_total(), 0.0);
        assert_eq!(items[1].line_total(), 7.5);
    }

    #[test]
    fn when_numbers_arrive_as_strings_should_coerce() {
        let order = order_from(json!({
            "items": [{"title": "Tea", "quantity": "3", "price": "2.5"}],
            "totalPrice": "7.5"
        }));

        assert_eq!(order.items()[0].quantity(), 3);
        assert_eq!(order.items()[0].price(), 2.5);
        assert_eq!(order.total_price(), 7.5);
    }

    #[test]
    fn when_numbers_are_invalid_should_fall_back_to_defaults() {
        let order = order_from(json!({
            "items": [
                {"quantity": -2, "price": "cheap"},
                {"quantity": 1.5, "price": [1]},
                {"quantity": 2.0, "price": null}
            ],
            "totalPrice": {"amount": 3}
        }));

        let items = order.items();
        assert_eq!(items[0].quantity(), 1);
        assert_eq!(items[0].price(), 0.0);
        assert_eq!(items[1].quantity(), 1);
        assert_eq!(items[1].price(), 0.0);
        assert_eq!(items[2].quantity(), 2);
        assert_eq!(order.total_price(), 0.0);
    }

    #[test]
    fn when_text_fields_have_other_types_should_use_json_text_or_default() {
        let order = order_from(json!({
            "customerName": null,
            "customerContact": 79001234567u64,
            "items": [{"title": ["nested"]}]
        }));

        assert_eq!(order.customer_name(), NOT_SPECIFIED);
        assert_eq!(order.customer_contact(), "79001234567");
        assert_eq!(order.items()[0].title(), DEFAULT_ITEM_TITLE);
    }

    #[test]
    fn when_items_is_not_an_array_or_contains_non_objects_should_not_fail() {
        let not_array = order_from(json!({"items": "Widget"}));
        assert!(not_array.items().is_empty());

        let mixed = order_from(json!({
            "items": ["Widget", {"title": "Gadget"}, ["Secret", 3, 1000]]
        }));
        assert_eq!(mixed.items().len(), 3);
        assert_eq!(mixed.items()[0].title(), DEFAULT_ITEM_TITLE);
        assert_eq!(mixed.items()[1].title(), "Gadget");
        let positional = &mixed.items()[2];
        assert_eq!(positional.title(), DEFAULT_ITEM_TITLE);
        assert_eq!(positional.quantity(), 1);
        assert_eq!(positional.price(), 0.0);
    }

    #[test]
    fn when_line_total_overflows_should_fall_back_to_zero() {
        let order = order_from(json!({
            "items": [{"title": "X", "quantity": 4000000000u64, "price": 1e300}]
        }));

        let item = &order.items()[0];
        assert_eq!(item.quantity(), 4000000000);
        assert_eq!(item.line_total(), 0.0);
    }

    #[test]
    fn when_body_is_blank_should_be_an_empty_order() {
        let order = Order::from_body(b"  \n").unwrap();

        assert_eq!(order.customer_name(), NOT_SPECIFIED);
        assert!(order.items().is_empty());
    }

    #[test]
    fn when_body_is_not_json_should_fail() {
        let result = Order::from_body(b"customerName=Ann");

        assert!(matches!(result, Err(InvalidOrder::Json(_))));
    }

    #[test]
    fn when_body_is_not_an_object_should_fail() {
        assert!(matches!(
            Order::from_body(b"[1, 2, 3]"),
            Err(InvalidOrder::NotAnObject)
        ));
        assert!(matches!(
            Order::from_body(b"\"Ann\""),
            Err(InvalidOrder::NotAnObject)
        ));
    }

    #[test]
    fn when_body_is_an_object_should_parse() {
        let order = Order::from_body(br#"{"customerName": "Ann"}"#).unwrap();

        assert_eq!(order.customer_name(), "Ann");
        assert_eq!(order.customer_contact(), NOT_SPECIFIED);
    }
}
