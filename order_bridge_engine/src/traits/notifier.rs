use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("The notification could not be delivered. {0}")]
    DeliveryFailed(String),
}

/// A plain-text channel to the people who review ERP outcomes.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}
