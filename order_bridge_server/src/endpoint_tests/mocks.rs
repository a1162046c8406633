use mockall::mock;
use order_bridge_engine::{erp_types::ErpOrderDocument, Notifier, NotifyError, OrderQueue, QueueError};

mock! {
    pub OrderQueue {}
    impl OrderQueue for OrderQueue {
        async fn enqueue(&self, document: &ErpOrderDocument) -> Result<(), QueueError>;
    }
}

mock! {
    pub Notifier {}
    impl Notifier for Notifier {
        async fn notify(&self, message: &str) -> Result<(), NotifyError>;
    }
}
