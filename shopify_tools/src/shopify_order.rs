use chrono::{DateTime, FixedOffset, Utc};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::ShopifyApiError;

/// An order, as returned by the Admin REST API (`/orders/{id}.json`). Only the fields the order bridge reads or writes
/// are modelled; everything else is ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShopifyOrder {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub note: Option<String>,
    /// Comma-joined free-text tags. The bridge uses these as a key-value ledger.
    #[serde(default)]
    pub tags: String,
    pub created_at: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub total_price: String,
    pub gateway: Option<String>,
    #[serde(default)]
    pub payment_gateway_names: Vec<String>,
    pub cancelled_at: Option<String>,
    pub cancel_reason: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub shipping_lines: Vec<ShippingLine>,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
    pub customer: Option<Customer>,
}

impl ShopifyOrder {
    pub fn created_at(&self) -> Result<DateTime<FixedOffset>, ShopifyApiError> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| ShopifyApiError::JsonError(format!("Invalid created_at value '{}'. {e}", self.created_at)))
    }

    /// All payment gateway names recorded against the order, including the legacy `gateway` field.
    pub fn payment_gateways(&self) -> impl Iterator<Item = &str> {
        self.gateway.iter().map(String::as_str).chain(self.payment_gateway_names.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    pub product_id: Option<i64>,
    pub variant_id: Option<i64>,
    pub sku: Option<String>,
    #[serde(default)]
    pub title: String,
    pub quantity: i64,
    /// Unit price, before discounts
    pub price: String,
    #[serde(default)]
    pub grams: i64,
    #[serde(default)]
    pub total_discount: String,
    #[serde(default)]
    pub discount_allocations: Vec<DiscountAllocation>,
}

impl LineItem {
    pub fn new(product_id: i64, sku: &str, quantity: i64, price: &str) -> Self {
        let mut rng = rand::thread_rng();
        #[allow(clippy::cast_possible_wrap)]
        let id = (rng.next_u64() >> 1) as i64;
        Self {
            id,
            product_id: Some(product_id),
            variant_id: None,
            sku: Some(sku.to_string()),
            title: sku.to_string(),
            quantity,
            price: price.to_string(),
            grams: 0,
            total_discount: "0.00".to_string(),
            discount_allocations: vec![],
        }
    }

    pub fn with_discount(mut self, amount: &str) -> Self {
        self.discount_allocations.push(DiscountAllocation { amount: amount.to_string() });
        self
    }

    pub fn sku(&self) -> &str {
        self.sku.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscountAllocation {
    pub amount: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingLine {
    #[serde(default)]
    pub title: String,
    pub code: Option<String>,
    #[serde(default)]
    pub price: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub province_code: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
}

impl Address {
    /// The company name, if one was given. Blank strings count as absent.
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or_default().trim();
        let last = self.last_name.as_deref().unwrap_or_default().trim();
        format!("{first} {last}").trim().to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Comma-joined free-text tags. Holds the ERP account number and site-use id once known.
    #[serde(default)]
    pub tags: String,
    pub note: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderBuilder {
    id: Option<i64>,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    note: Option<String>,
    tags: Option<String>,
    created_at: Option<String>,
    currency: Option<String>,
    gateway: Option<String>,
    line_items: Vec<LineItem>,
    shipping_lines: Vec<ShippingLine>,
    billing_address: Option<Address>,
    shipping_address: Option<Address>,
    customer: Option<Customer>,
}

impl OrderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&mut self, id: i64) -> &mut Self {
        self.id = Some(id);
        self
    }

    pub fn name(&mut self, name: String) -> &mut Self {
        self.name = Some(name);
        self
    }

    pub fn email(&mut self, email: String) -> &mut Self {
        self.email = Some(email);
        self
    }

    pub fn phone(&mut self, phone: String) -> &mut Self {
        self.phone = Some(phone);
        self
    }

    pub fn note(&mut self, note: String) -> &mut Self {
        self.note = Some(note);
        self
    }

    pub fn tags(&mut self, tags: String) -> &mut Self {
        self.tags = Some(tags);
        self
    }

    pub fn created_at(&mut self, created_at: String) -> &mut Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn currency(&mut self, currency: String) -> &mut Self {
        self.currency = Some(currency);
        self
    }

    pub fn gateway(&mut self, gateway: String) -> &mut Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn line_items(&mut self, items: Vec<LineItem>) -> &mut Self {
        self.line_items = items;
        self
    }

    pub fn shipping_line(&mut self, line: ShippingLine) -> &mut Self {
        self.shipping_lines.push(line);
        self
    }

    pub fn billing_address(&mut self, address: Address) -> &mut Self {
        self.billing_address = Some(address);
        self
    }

    pub fn shipping_address(&mut self, address: Address) -> &mut Self {
        self.shipping_address = Some(address);
        self
    }

    pub fn customer(&mut self, customer: Customer) -> &mut Self {
        self.customer = Some(customer);
        self
    }

    pub fn build(self) -> ShopifyOrder {
        let mut rng = rand::thread_rng();
        #[allow(clippy::cast_possible_wrap)]
        let id = self.id.unwrap_or_else(|| (rng.next_u64() >> 1) as i64);
        let gateway = self.gateway.unwrap_or_else(|| "shopify_payments".to_string());
        ShopifyOrder {
            id,
            name: self.name.unwrap_or_else(|| format!("#{}", rng.gen_range(1000..100_000))),
            email: self.email,
            phone: self.phone,
            note: self.note,
            tags: self.tags.unwrap_or_default(),
            created_at: self.created_at.unwrap_or_else(|| Utc::now().to_rfc3339()),
            currency: self.currency.unwrap_or_else(|| "USD".to_string()),
            total_price: "0.00".to_string(),
            payment_gateway_names: vec![gateway.clone()],
            gateway: Some(gateway),
            cancelled_at: None,
            cancel_reason: None,
            line_items: self.line_items,
            shipping_lines: self.shipping_lines,
            billing_address: self.billing_address,
            shipping_address: self.shipping_address,
            customer: self.customer,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn deserialize_order() {
        let order = include_str!("./test_assets/order.json");
        let order: ShopifyOrder = serde_json::from_str(order).unwrap();
        assert_eq!(order.id, 450789469);
        assert_eq!(order.name, "#1001");
        assert_eq!(order.tags, "priority, wholesale");
        assert_eq!(order.line_items.len(), 2);
        assert_eq!(order.line_items[0].sku(), "PW-1200");
        assert_eq!(order.line_items[0].discount_allocations[0].amount, "13.00");
        assert_eq!(order.line_items[1].total_discount, "");
        assert_eq!(order.billing_address.as_ref().and_then(|a| a.company()), Some("Norman Coatings"));
        assert_eq!(order.shipping_address.as_ref().and_then(|a| a.company()), None);
        let customer = order.customer.as_ref().unwrap();
        assert_eq!(customer.id, 207119551);
        assert_eq!(customer.tags, "AR_12345, SUID_9");
        assert_eq!(order.payment_gateways().collect::<Vec<_>>(), vec!["Invoice", "Invoice"]);
        assert_eq!(order.created_at().unwrap().to_rfc3339(), "2024-03-13T16:09:54-04:00");
    }

    #[test]
    fn builder_defaults() {
        let mut builder = OrderBuilder::new();
        builder.id(42).note("Leave at gate".into()).line_items(vec![LineItem::new(1, "PT-100", 3, "9.99")]);
        let order = builder.build();
        assert_eq!(order.id, 42);
        assert_eq!(order.note.as_deref(), Some("Leave at gate"));
        assert_eq!(order.line_items[0].quantity, 3);
        assert!(order.created_at().is_ok());
        assert_eq!(order.payment_gateways().next(), Some("shopify_payments"));
    }
}
