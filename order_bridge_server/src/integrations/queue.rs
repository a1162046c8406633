use bytes::Bytes;
use log::*;
use obg_common::Secret;
use order_bridge_engine::{erp_types::ErpOrderDocument, OrderQueue, QueueError};
use reqwest::{header::CONTENT_TYPE, Client};

use crate::config::OrderQueueConfig;

/// Posts each order document as JSON to the queue's HTTP endpoint, one message per order.
#[derive(Clone)]
pub struct HttpQueuePublisher {
    client: Client,
    url: String,
    authorization: Option<Secret<String>>,
}

impl HttpQueuePublisher {
    pub fn new(config: &OrderQueueConfig) -> Self {
        Self { client: Client::new(), url: config.url.clone(), authorization: config.authorization.clone() }
    }
}

impl OrderQueue for HttpQueuePublisher {
    async fn enqueue(&self, document: &ErpOrderDocument) -> Result<(), QueueError> {
        let body = serde_json::to_vec(document).map_err(|e| QueueError::Serialization(e.to_string()))?;
        trace!("📤️ Posting {} bytes to the order queue", body.len());
        let mut req = self.client.post(&self.url).header(CONTENT_TYPE, "application/json").body(Bytes::from(body));
        if let Some(auth) = &self.authorization {
            req = req.header("Authorization", auth.reveal().as_str());
        }
        let response = req.send().await.map_err(|e| QueueError::DeliveryFailed(e.to_string()))?;
        if response.status().is_success() {
            debug!("📤️ Order document {} queued", document.header.order_reference_id);
            Ok(())
        } else {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            Err(QueueError::DeliveryFailed(format!("The queue answered {status}. {message}")))
        }
    }
}
