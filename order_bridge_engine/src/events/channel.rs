//! Single-consumer event queue
//!
//! Producers publish events from any thread; a single handler task consumes them one at a time, in the order they
//! were received. Handlers are allowed to be `!Send`, so the consumer must be driven on a local task (e.g.
//! `actix_web::rt::spawn` or `tokio::task::spawn_local`), or simply awaited.
use futures_util::future::LocalBoxFuture;
use log::*;
use thiserror::Error;
use tokio::sync::mpsc;

pub type Handler<E> = Box<dyn Fn(E) -> LocalBoxFuture<'static, ()>>;

#[derive(Debug, Clone, Error)]
#[error("The event could not be published because the handler has shut down")]
pub struct PublishError;

pub struct EventHandler<E: Send + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs until every producer has been dropped. Each event is handled to completion before the next is taken.
    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // drop the internal sender so that the handler shuts down once the last producer is dropped
        drop(self.sender);
        let mut handled = 0u64;
        while let Some(ev) = self.listener.recv().await {
            trace!("📬️ Handling event");
            (self.handler)(ev).await;
            handled += 1;
            trace!("📬️ Event handled");
        }
        debug!("📬️ Event handler has shut down after {handled} events");
    }
}

pub struct EventProducer<E: Send> {
    sender: mpsc::Sender<E>,
}

impl<E: Send> Clone for EventProducer<E> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<E: Send> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    /// Queues the event. Waits for space if the buffer is full.
    pub async fn publish_event(&self, event: E) -> Result<(), PublishError> {
        self.sender.send(event).await.map_err(|e| {
            error!("📬️ Failed to send event: {e}");
            PublishError
        })
    }
}
