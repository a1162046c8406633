use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FulfillmentOrder {
    pub id: i64,
    pub order_id: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub request_status: String,
    #[serde(default)]
    pub fulfillment_holds: Vec<FulfillmentHoldRecord>,
}

/// A hold as reported back on a fulfillment order.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FulfillmentHoldRecord {
    pub reason: String,
    pub reason_notes: Option<String>,
}

/// Request body for `POST /fulfillment_orders/{id}/hold.json`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FulfillmentHold {
    /// One of Shopify's hold reason codes, e.g. `high_risk_of_fraud` or `other`.
    pub reason: String,
    pub reason_notes: String,
    pub notify_merchant: bool,
}

impl FulfillmentHold {
    pub fn new(reason: &str, reason_notes: &str) -> Self {
        Self { reason: reason.to_string(), reason_notes: reason_notes.to_string(), notify_merchant: true }
    }
}

/// A GraphQL `orders` search hit.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderNode {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderNodes {
    pub nodes: Vec<OrderNode>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderSearchResult {
    pub orders: OrderNodes,
}
