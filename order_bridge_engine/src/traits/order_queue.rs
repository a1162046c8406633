use thiserror::Error;

use crate::erp_types::ErpOrderDocument;

#[derive(Debug, Clone, Error)]
pub enum QueueError {
    #[error("Could not serialize the order document. {0}")]
    Serialization(String),
    #[error("The order document could not be delivered to the queue. {0}")]
    DeliveryFailed(String),
}

/// The outbound queue that the ERP reads new orders from. One message per processed order.
#[allow(async_fn_in_trait)]
pub trait OrderQueue {
    async fn enqueue(&self, document: &ErpOrderDocument) -> Result<(), QueueError>;
}
