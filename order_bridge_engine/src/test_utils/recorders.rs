use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
    Mutex,
};

use crate::{
    erp_types::ErpOrderDocument,
    traits::{Notifier, NotifyError, OrderQueue, QueueError},
};

/// An [`OrderQueue`] that keeps every document it is given.
#[derive(Clone, Default)]
pub struct RecordingQueue {
    documents: Arc<Mutex<Vec<ErpOrderDocument>>>,
}

impl RecordingQueue {
    pub fn documents(&self) -> Vec<ErpOrderDocument> {
        self.documents.lock().unwrap().clone()
    }
}

impl OrderQueue for RecordingQueue {
    async fn enqueue(&self, document: &ErpOrderDocument) -> Result<(), QueueError> {
        self.documents.lock().unwrap().push(document.clone());
        Ok(())
    }
}

/// A [`Notifier`] that keeps every message, or fails every delivery once [`RecordingNotifier::fail`] is called.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::DeliveryFailed("notification channel is down".into()));
        }
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}
