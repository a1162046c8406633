//! ERP Order Bridge Engine
//!
//! The engine turns storefront orders into ERP order documents and folds the ERP's asynchronous answers back into the
//! storefront. It holds no state of its own: everything durable lives in the comma-joined tag strings of orders and
//! customers, which the [`tag_ledger`] module reads and writes as a small key-value ledger.
//!
//! The library is divided into the following parts:
//! 1. The order path. The [`translator`] fetches an order, resolves the customer's ERP identity from its tags, screens
//!    the order with the [`hold_policy`] and splits every line item into shippable containers with the
//!    [`container_planner`]. The result is an [`erp_types::ErpOrderDocument`], ready for the outbound queue.
//! 2. The confirmation path. The [`reconciliation`] handler consumes ERP confirmations (or errors), finds the matching
//!    storefront order and records the outcome in its note and tags, placing a fulfillment hold when the ERP refused
//!    the order.
//! 3. The collaborator seams ([`traits`]). The storefront, the outbound queue and the human notification channel are
//!    all accessed through traits so that the engine can be driven by the real Shopify client in production and by
//!    in-memory doubles in tests.
//!
//! Confirmations are delivered to the reconciliation handler through a small single-consumer channel ([`events`]).
pub mod annotations;
pub mod container_planner;
pub mod erp_types;
pub mod events;
pub mod hold_policy;
pub mod reconciliation;
pub mod tag_ledger;
pub mod traits;
pub mod translator;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use reconciliation::{ReconciliationOutcome, Reconciler};
pub use traits::{Notifier, NotifyError, OrderQueue, QueueError, StorefrontApi, StorefrontError};
pub use translator::{OrderTranslator, TranslationError, TranslationOutcome};
