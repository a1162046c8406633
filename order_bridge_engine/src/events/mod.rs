mod channel;
mod event_types;

pub use channel::{EventHandler, EventProducer, Handler, PublishError};
pub use event_types::ConfirmationReceived;
