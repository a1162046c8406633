use log::*;
use order_bridge_engine::{Notifier, NotifyError};
use reqwest::{header::CONTENT_TYPE, Client};

/// Posts plain-text notifications to a webhook (e.g. a logic app that emails the reviewers). Without a URL,
/// notifications are only written to the log.
#[derive(Clone)]
pub struct HttpNotifier {
    client: Client,
    url: Option<String>,
}

impl HttpNotifier {
    pub fn new(url: Option<String>) -> Self {
        Self { client: Client::new(), url }
    }
}

impl Notifier for HttpNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let Some(url) = &self.url else {
            info!("📣️ Notification: {message}");
            return Ok(());
        };
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(message.to_string())
            .send()
            .await
            .map_err(|e| NotifyError::DeliveryFailed(e.to_string()))?;
        if response.status().is_success() {
            debug!("📣️ Notification delivered: {message}");
            Ok(())
        } else {
            Err(NotifyError::DeliveryFailed(format!("The notification endpoint answered {}", response.status())))
        }
    }
}
