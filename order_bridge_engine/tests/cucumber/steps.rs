use cucumber::{then, when};
use order_bridge_engine::{erp_types::OrderConfirmation, ReconciliationOutcome};

use crate::cucumber::BridgeWorld;

#[when(expr = "the ERP confirms order {string} for site {int}")]
async fn erp_confirms(world: &mut BridgeWorld, order_number: String, site_id: i64) {
    let msg = OrderConfirmation::confirmed(&order_number, site_id);
    world.outcome = Some(world.reconciler().handle(&msg).await);
}

#[when(expr = "the ERP rejects order {string} with {string}")]
async fn erp_rejects(world: &mut BridgeWorld, order_number: String, error: String) {
    let msg = OrderConfirmation::rejected(&order_number, &error);
    world.outcome = Some(world.reconciler().handle(&msg).await);
}

#[then(expr = "the outcome is confirmed for order {int}")]
async fn outcome_confirmed(world: &mut BridgeWorld, order_id: i64) {
    assert_eq!(world.outcome, Some(ReconciliationOutcome::Confirmed { order_id }));
}

#[then(expr = "the outcome is a held error for order {int}")]
async fn outcome_held(world: &mut BridgeWorld, order_id: i64) {
    assert_eq!(world.outcome, Some(ReconciliationOutcome::HeldError { order_id }));
}

#[then("the confirmation is unmatched")]
async fn outcome_unmatched(world: &mut BridgeWorld) {
    assert!(matches!(world.outcome, Some(ReconciliationOutcome::Unmatched { .. })), "{:?}", world.outcome);
}

#[then(expr = "order {int} has tags {string}")]
async fn order_tags(world: &mut BridgeWorld, order_id: i64, tags: String) {
    let order = world.storefront.order(order_id).expect("Order does not exist");
    assert_eq!(order.tags, tags);
}

#[then(expr = "the note on order {int} ends with {string}")]
async fn order_note(world: &mut BridgeWorld, order_id: i64, text: String) {
    let order = world.storefront.order(order_id).expect("Order does not exist");
    let note = order.note.unwrap_or_default();
    assert!(note.ends_with(&text), "Note was: {note}");
}

#[then(expr = "customer {int} has tags {string}")]
async fn customer_tags(world: &mut BridgeWorld, customer_id: i64, tags: String) {
    let customer = world.storefront.customer(customer_id).expect("Customer does not exist");
    assert_eq!(customer.tags, tags);
}

#[then(expr = "fulfillment order {int} is held with reason {string}")]
async fn fulfillment_held(world: &mut BridgeWorld, fulfillment_order_id: i64, reason: String) {
    let holds = world.storefront.holds();
    let hold = holds.iter().find(|(id, _)| *id == fulfillment_order_id).expect("No hold was placed");
    assert_eq!(hold.1.reason, reason);
}

#[then("no fulfillment order is held")]
async fn nothing_held(world: &mut BridgeWorld) {
    assert!(world.storefront.holds().is_empty());
}

#[then(expr = "the reviewers were notified about {string}")]
async fn reviewers_notified(world: &mut BridgeWorld, order_number: String) {
    assert!(world.notifier.messages().contains(&order_number), "{:?}", world.notifier.messages());
}
