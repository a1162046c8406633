use cucumber::given;
use order_bridge_engine::test_utils::{fixtures::wholesale_order, prepare_env::prepare_test_env};
use shopify_tools::OrderBuilder;

use crate::cucumber::BridgeWorld;

#[given(expr = "order {int} named {string} for a customer tagged {string}")]
async fn order_for_customer(world: &mut BridgeWorld, order_id: i64, name: String, tags: String) {
    prepare_test_env();
    let mut order = wholesale_order(order_id, &tags);
    order.name = name;
    world.storefront.add_order(order);
    world.storefront.add_fulfillment_order(order_id, order_id * 10);
}

#[given(expr = "order {int} named {string} tagged {string}")]
async fn order_with_tags(world: &mut BridgeWorld, order_id: i64, name: String, tags: String) {
    let mut builder = OrderBuilder::new();
    builder.id(order_id).name(name).tags(tags);
    world.storefront.add_order(builder.build());
}

#[given("the storefront search index is lagging")]
async fn search_lagging(world: &mut BridgeWorld) {
    world.storefront.disable_search();
}

#[given("fulfillment orders are unavailable")]
async fn fulfillment_unavailable(world: &mut BridgeWorld) {
    world.storefront.fail_fulfillment_requests();
}

#[given(expr = "only the {int} most recent orders are scanned")]
async fn recent_window(world: &mut BridgeWorld, window: u64) {
    world.recent_order_window = Some(window);
}
