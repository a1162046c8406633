//! Adapters for the outbound ERP order queue and the reviewer notification channel.
mod notifications;
mod queue;

pub use notifications::HttpNotifier;
pub use queue::HttpQueuePublisher;
