use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The part of a Shopify order webhook payload the bridge looks at. The full order is always re-read from the Admin
/// API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderWebhookPayload {
    pub id: Option<i64>,
    pub name: Option<String>,
}
