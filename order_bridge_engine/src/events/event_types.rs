use chrono::{DateTime, Utc};

use crate::erp_types::OrderConfirmation;

/// An ERP confirmation (or rejection) waiting to be reconciled against the storefront.
#[derive(Debug, Clone)]
pub struct ConfirmationReceived {
    pub confirmation: OrderConfirmation,
    pub received_at: DateTime<Utc>,
}

impl ConfirmationReceived {
    pub fn new(confirmation: OrderConfirmation) -> Self {
        Self { confirmation, received_at: Utc::now() }
    }
}
