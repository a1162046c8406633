//! Collaborator traits
//!
//! The engine never talks to the outside world directly. Everything it needs from the storefront, the outbound ERP
//! queue and the human-review channel is expressed by the traits in this module.
mod notifier;
mod order_queue;
mod storefront;

pub use notifier::{Notifier, NotifyError};
pub use order_queue::{OrderQueue, QueueError};
pub use storefront::{StorefrontApi, StorefrontError, SEARCH_RESULT_LIMIT};
