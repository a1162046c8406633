//! Reconciliation handler
//!
//! The ERP answers every order document with a confirmation message, some time later, on a separate queue. The
//! [`Reconciler`] finds the storefront order the message refers to and records the outcome on it:
//!
//! * a confirmation adds the ERP reference and the site-use id to the order tags and writes the site-use id through to
//!   the customer's ledger, so that the next order from the same customer goes out with it;
//! * an error puts the order on hold (see [`crate::hold_policy`]) with the error text as the hold notes.
//!
//! Either way, the people reviewing ERP outcomes are notified with the order number, even when no order matched.
use std::fmt::Display;

use log::*;
use shopify_tools::ShopifyOrder;

use crate::{
    annotations::OrderAnnotation,
    erp_types::OrderConfirmation,
    hold_policy::{place_hold, HoldReason},
    tag_ledger::{LedgerToken, TagLedger},
    traits::{Notifier, StorefrontApi, StorefrontError},
};

pub const DEFAULT_RECENT_ORDER_WINDOW: u64 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    Confirmed { order_id: i64 },
    HeldError { order_id: i64 },
    Unmatched { order_number: String },
}

impl Display for ReconciliationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirmed { order_id } => write!(f, "order #{order_id} confirmed"),
            Self::HeldError { order_id } => write!(f, "order #{order_id} held after an ERP error"),
            Self::Unmatched { order_number } => write!(f, "no order matches '{order_number}'"),
        }
    }
}

pub struct Reconciler<S, N> {
    storefront: S,
    notifier: N,
    recent_order_window: u64,
}

impl<S, N> Reconciler<S, N>
where
    S: StorefrontApi,
    N: Notifier,
{
    pub fn new(storefront: S, notifier: N) -> Self {
        Self { storefront, notifier, recent_order_window: DEFAULT_RECENT_ORDER_WINDOW }
    }

    /// The number of recent orders scanned when neither a direct lookup nor a search finds the order.
    pub fn with_recent_order_window(mut self, window: u64) -> Self {
        self.recent_order_window = window;
        self
    }

    pub async fn handle(&self, confirmation: &OrderConfirmation) -> ReconciliationOutcome {
        info!("🧾️ Reconciling {confirmation}");
        let outcome = match self.find_order(&confirmation.order_number).await {
            Some(order) => match confirmation.error() {
                None => self.confirm(&order, confirmation).await,
                Some(error) => self.reject(&order, error).await,
            },
            None => {
                warn!("🧾️ No storefront order matches ERP order number '{}'", confirmation.order_number);
                ReconciliationOutcome::Unmatched { order_number: confirmation.order_number.clone() }
            },
        };
        self.notify(&confirmation.order_number).await;
        info!("🧾️ Reconciliation complete: {outcome}");
        outcome
    }

    /// Finds the storefront order an ERP order number refers to.
    ///
    /// Numeric references are tried as order ids first, then the storefront search is asked for an order with that
    /// name. As a last resort the most recent orders are scanned for an id, name or tag that matches.
    pub async fn find_order(&self, order_number: &str) -> Option<ShopifyOrder> {
        let reference = order_number.trim();
        if reference.is_empty() {
            return None;
        }
        if let Ok(id) = reference.parse::<i64>() {
            match self.storefront.fetch_order(id).await {
                Ok(order) => return Some(order),
                Err(StorefrontError::NotFound(_)) => debug!("🧾️ '{reference}' is not an order id"),
                Err(e) => warn!("🧾️ Could not fetch order #{id}. {e}"),
            }
        }
        match self.search_by_name(reference).await {
            Ok(Some(order)) => return Some(order),
            Ok(None) => debug!("🧾️ Order search found nothing for '{reference}'"),
            Err(e) => warn!("🧾️ Order search for '{reference}' failed. {e}"),
        }
        match self.storefront.fetch_recent_orders(self.recent_order_window).await {
            Ok(orders) => {
                let found = orders.into_iter().find(|o| matches_reference(o, reference));
                if found.is_none() {
                    debug!("🧾️ None of the {} most recent orders match '{reference}'", self.recent_order_window);
                }
                found
            },
            Err(e) => {
                warn!("🧾️ Could not fetch recent orders. {e}");
                None
            },
        }
    }

    async fn search_by_name(&self, reference: &str) -> Result<Option<ShopifyOrder>, StorefrontError> {
        let ids = self.storefront.search_order_ids(&format!("name:{reference}")).await?;
        match ids.first() {
            Some(id) => self.storefront.fetch_order(*id).await.map(Some),
            None => Ok(None),
        }
    }

    async fn confirm(&self, order: &ShopifyOrder, confirmation: &OrderConfirmation) -> ReconciliationOutcome {
        let site_use_id = confirmation.site_id.to_string();
        let customer = match &order.customer {
            Some(snapshot) => match self.storefront.fetch_customer(snapshot.id).await {
                Ok(customer) => Some(customer),
                Err(e) => {
                    warn!("🧾️ Could not fetch customer {}. Using the copy on the order. {e}", snapshot.id);
                    Some(snapshot.clone())
                },
            },
            None => None,
        };
        let account_number =
            TagLedger::new(customer.as_ref().map(|c| c.tags.as_str()).unwrap_or_default()).account_number();
        let account_note = format!("ERP account: {account_number}");
        let mut annotation = OrderAnnotation::for_order(order);
        annotation
            .tag_if_absent(LedgerToken::ErpReference(confirmation.order_number.trim().to_string()))
            .tag_if_absent(LedgerToken::SiteUseId(site_use_id.clone()));
        if !annotation.note_text().contains(&account_note) {
            annotation.note(&account_note);
        }
        if let Err(e) = annotation.apply(&self.storefront).await {
            error!("🧾️ Could not record the ERP confirmation on order #{}. {e}", order.id);
        }
        match customer {
            Some(customer) => match self.record_site_use_id(customer.id, &site_use_id).await {
                Ok(true) => info!("🧾️ Customer {} now has site use id {site_use_id}", customer.id),
                Ok(false) => debug!("🧾️ Customer {} already has site use id {site_use_id}", customer.id),
                Err(e) => error!("🧾️ Could not record site use id {site_use_id} for customer {}. {e}", customer.id),
            },
            None => debug!("🧾️ Order #{} has no customer. Site use id {site_use_id} is not recorded.", order.id),
        }
        ReconciliationOutcome::Confirmed { order_id: order.id }
    }

    async fn reject(&self, order: &ShopifyOrder, error: &str) -> ReconciliationOutcome {
        warn!("🧾️ The ERP rejected order #{}: {error}", order.id);
        let summary = place_hold(&self.storefront, order, HoldReason::Other, error).await;
        debug!("🧾️ Hold summary for order #{}: {summary:?}", order.id);
        ReconciliationOutcome::HeldError { order_id: order.id }
    }

    /// Adds `SUID_<site_use_id>` to the customer's tags unless it is already there. The customer is re-read first so
    /// that tags written since the order was placed are kept. Returns true if the tags were changed.
    pub async fn record_site_use_id(&self, customer_id: i64, site_use_id: &str) -> Result<bool, StorefrontError> {
        let customer = self.storefront.fetch_customer(customer_id).await?;
        let mut ledger = TagLedger::new(&customer.tags);
        if !ledger.append_if_absent(LedgerToken::SiteUseId(site_use_id.to_string())) {
            return Ok(false);
        }
        self.storefront.update_customer_tags(customer_id, ledger.as_str()).await?;
        Ok(true)
    }

    async fn notify(&self, order_number: &str) {
        match self.notifier.notify(order_number).await {
            Ok(()) => debug!("🧾️ Reviewers notified about order '{order_number}'"),
            Err(e) => error!("🧾️ Could not notify reviewers about order '{order_number}'. {e}"),
        }
    }
}

fn matches_reference(order: &ShopifyOrder, reference: &str) -> bool {
    let bare = reference.trim_start_matches('#');
    order.id.to_string() == reference ||
        order.name == reference ||
        order.name.trim_start_matches('#') == bare ||
        TagLedger::new(&order.tags).contains(LedgerToken::ErpReference(reference.to_string()))
}
