//! Fraud and hold policy
//!
//! Two situations stop an order in the storefront until someone has looked at it:
//! * before sending: a customer without an ERP account of their own asks to pay by invoice
//!   ([`HoldReason::HighRiskOfFraud`]);
//! * after sending: the ERP reported an error for the order ([`HoldReason::Other`]).
//!
//! In both cases the first fulfillment order is put on hold and the order note and tags are annotated. The annotation
//! is written even if the hold could not be placed, so the order always carries a trace of what happened.
use std::fmt::Display;

use log::*;
use shopify_tools::{FulfillmentHold, ShopifyOrder};

use crate::{
    annotations::OrderAnnotation,
    tag_ledger::{LedgerToken, ERP_ERROR_MARKER, FRAUD_HOLD_MARKER, GENERIC_ECOMMERCE_ACCOUNT},
    traits::StorefrontApi,
};

/// The gateway name the storefront records for "pay by invoice" orders.
pub const INVOICE_PAYMENT_GATEWAY: &str = "Invoice";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    HighRiskOfFraud,
    Other,
}

impl HoldReason {
    /// The fulfillment hold reason code understood by the storefront.
    pub fn code(&self) -> &'static str {
        match self {
            Self::HighRiskOfFraud => "high_risk_of_fraud",
            Self::Other => "other",
        }
    }

    pub fn marker(&self) -> LedgerToken {
        match self {
            Self::HighRiskOfFraud => LedgerToken::Marker(FRAUD_HOLD_MARKER),
            Self::Other => LedgerToken::Marker(ERP_ERROR_MARKER),
        }
    }
}

impl Display for HoldReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// What [`place_hold`] managed to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldSummary {
    pub fulfillment_held: bool,
    pub annotated: bool,
}

/// True if the order must not be sent to the ERP: the generic account is paying by invoice.
pub fn requires_fraud_hold(account_number: &str, order: &ShopifyOrder) -> bool {
    account_number == GENERIC_ECOMMERCE_ACCOUNT &&
        order.payment_gateways().any(|g| g.trim().eq_ignore_ascii_case(INVOICE_PAYMENT_GATEWAY))
}

/// Holds the first fulfillment order of `order` and annotates the order with `notes` and the reason's marker token.
pub async fn place_hold<S: StorefrontApi>(
    storefront: &S,
    order: &ShopifyOrder,
    reason: HoldReason,
    notes: &str,
) -> HoldSummary {
    let mut summary = HoldSummary::default();
    match storefront.fetch_fulfillment_orders(order.id).await {
        Ok(fulfillment_orders) => match fulfillment_orders.first() {
            Some(fo) => match storefront.hold_fulfillment_order(fo.id, FulfillmentHold::new(reason.code(), notes)).await
            {
                Ok(_) => {
                    info!("🛑️ Fulfillment order {} of order #{} held ({reason})", fo.id, order.id);
                    summary.fulfillment_held = true;
                },
                Err(e) => error!("🛑️ Could not hold fulfillment order {} of order #{}. {e}", fo.id, order.id),
            },
            None => warn!("🛑️ Order #{} has no fulfillment orders. Nothing to hold.", order.id),
        },
        Err(e) => error!("🛑️ Could not fetch fulfillment orders for order #{}. {e}", order.id),
    }
    let mut annotation = OrderAnnotation::for_order(order);
    annotation.note(notes).tag(reason.marker());
    match annotation.apply(storefront).await {
        Ok(_) => summary.annotated = true,
        Err(e) => error!("🛑️ Could not annotate held order #{}. {e}", order.id),
    }
    summary
}
