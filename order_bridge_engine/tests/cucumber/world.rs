use cucumber::World;
use order_bridge_engine::{
    test_utils::{MemoryStorefront, RecordingNotifier},
    ReconciliationOutcome,
    Reconciler,
};

#[derive(Default, World)]
pub struct BridgeWorld {
    pub storefront: MemoryStorefront,
    pub notifier: RecordingNotifier,
    pub recent_order_window: Option<u64>,
    pub outcome: Option<ReconciliationOutcome>,
}

impl std::fmt::Debug for BridgeWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeWorld").field("outcome", &self.outcome).finish()
    }
}

impl BridgeWorld {
    pub fn reconciler(&self) -> Reconciler<MemoryStorefront, RecordingNotifier> {
        let reconciler = Reconciler::new(self.storefront.clone(), self.notifier.clone());
        match self.recent_order_window {
            Some(window) => reconciler.with_recent_order_window(window),
            None => reconciler,
        }
    }
}
