use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use log::*;
use shopify_tools::{Customer, FulfillmentHold, FulfillmentOrder, ShopifyOrder, ShopifyProduct};

use crate::traits::{StorefrontApi, StorefrontError, SEARCH_RESULT_LIMIT};

#[derive(Default)]
struct StorefrontState {
    // Oldest first
    orders: Vec<ShopifyOrder>,
    customers: HashMap<i64, Customer>,
    products: HashMap<i64, ShopifyProduct>,
    fulfillment_orders: HashMap<i64, Vec<FulfillmentOrder>>,
    holds: Vec<(i64, FulfillmentHold)>,
    fail_fulfillment_requests: bool,
    search_disabled: bool,
    order_updates: usize,
    customer_updates: usize,
}

/// A storefront that lives entirely in memory. Clones share the same state.
///
/// Order search understands `name:<name>` queries only, and matches names with or without the leading `#`.
#[derive(Clone, Default)]
pub struct MemoryStorefront {
    state: Arc<Mutex<StorefrontState>>,
}

impl MemoryStorefront {
    fn state(&self) -> MutexGuard<'_, StorefrontState> {
        self.state.lock().unwrap()
    }

    /// Adds the order as the newest order in the store. The order's customer, if any, is added too unless the store
    /// already knows it.
    pub fn add_order(&self, order: ShopifyOrder) {
        let mut state = self.state();
        if let Some(customer) = &order.customer {
            state.customers.entry(customer.id).or_insert_with(|| customer.clone());
        }
        state.orders.retain(|o| o.id != order.id);
        state.orders.push(order);
    }

    pub fn add_customer(&self, customer: Customer) {
        self.state().customers.insert(customer.id, customer);
    }

    pub fn add_product(&self, product: ShopifyProduct) {
        self.state().products.insert(product.id, product);
    }

    pub fn add_fulfillment_order(&self, order_id: i64, fulfillment_order_id: i64) {
        let fo = FulfillmentOrder {
            id: fulfillment_order_id,
            order_id,
            status: "open".into(),
            request_status: "unsubmitted".into(),
            fulfillment_holds: vec![],
        };
        self.state().fulfillment_orders.entry(order_id).or_default().push(fo);
    }

    /// Makes every fulfillment order request fail from now on.
    pub fn fail_fulfillment_requests(&self) {
        self.state().fail_fulfillment_requests = true;
    }

    /// Makes order search return no results, as it does while the storefront's search index lags behind.
    pub fn disable_search(&self) {
        self.state().search_disabled = true;
    }

    pub fn order(&self, order_id: i64) -> Option<ShopifyOrder> {
        self.state().orders.iter().find(|o| o.id == order_id).cloned()
    }

    pub fn customer(&self, customer_id: i64) -> Option<Customer> {
        self.state().customers.get(&customer_id).cloned()
    }

    /// Every hold placed so far, as (fulfillment order id, hold) pairs.
    pub fn holds(&self) -> Vec<(i64, FulfillmentHold)> {
        self.state().holds.clone()
    }

    pub fn order_update_count(&self) -> usize {
        self.state().order_updates
    }

    pub fn customer_update_count(&self) -> usize {
        self.state().customer_updates
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().trim_start_matches('#') == b.trim().trim_start_matches('#')
}

impl StorefrontApi for MemoryStorefront {
    async fn fetch_order(&self, order_id: i64) -> Result<ShopifyOrder, StorefrontError> {
        self.order(order_id).ok_or_else(|| StorefrontError::NotFound(format!("Order {order_id}")))
    }

    async fn fetch_recent_orders(&self, limit: u64) -> Result<Vec<ShopifyOrder>, StorefrontError> {
        let state = self.state();
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(state.orders.iter().rev().take(limit).cloned().collect())
    }

    async fn search_order_ids(&self, query: &str) -> Result<Vec<i64>, StorefrontError> {
        let state = self.state();
        if state.search_disabled {
            trace!("🛍️ Search is disabled. Returning no results for '{query}'");
            return Ok(vec![]);
        }
        let name = query
            .strip_prefix("name:")
            .ok_or_else(|| StorefrontError::RequestFailed(format!("Unsupported search query: {query}")))?;
        let limit = usize::try_from(SEARCH_RESULT_LIMIT).unwrap_or(usize::MAX);
        Ok(state.orders.iter().rev().filter(|o| same_name(&o.name, name)).take(limit).map(|o| o.id).collect())
    }

    async fn fetch_customer(&self, customer_id: i64) -> Result<Customer, StorefrontError> {
        self.customer(customer_id).ok_or_else(|| StorefrontError::NotFound(format!("Customer {customer_id}")))
    }

    async fn fetch_product(&self, product_id: i64) -> Result<ShopifyProduct, StorefrontError> {
        self.state()
            .products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| StorefrontError::NotFound(format!("Product {product_id}")))
    }

    async fn update_order_annotations(
        &self,
        order_id: i64,
        note: &str,
        tags: &str,
    ) -> Result<ShopifyOrder, StorefrontError> {
        let mut state = self.state();
        state.order_updates += 1;
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| StorefrontError::NotFound(format!("Order {order_id}")))?;
        order.note = Some(note.to_string());
        order.tags = tags.to_string();
        Ok(order.clone())
    }

    async fn update_customer_tags(&self, customer_id: i64, tags: &str) -> Result<Customer, StorefrontError> {
        let mut state = self.state();
        state.customer_updates += 1;
        let customer = state
            .customers
            .get_mut(&customer_id)
            .ok_or_else(|| StorefrontError::NotFound(format!("Customer {customer_id}")))?;
        customer.tags = tags.to_string();
        Ok(customer.clone())
    }

    async fn fetch_fulfillment_orders(&self, order_id: i64) -> Result<Vec<FulfillmentOrder>, StorefrontError> {
        let state = self.state();
        if state.fail_fulfillment_requests {
            return Err(StorefrontError::RequestFailed("fulfillment orders are unavailable".into()));
        }
        Ok(state.fulfillment_orders.get(&order_id).cloned().unwrap_or_default())
    }

    async fn hold_fulfillment_order(
        &self,
        fulfillment_order_id: i64,
        hold: FulfillmentHold,
    ) -> Result<FulfillmentOrder, StorefrontError> {
        let mut state = self.state();
        if state.fail_fulfillment_requests {
            return Err(StorefrontError::RequestFailed("fulfillment orders are unavailable".into()));
        }
        let fo = state
            .fulfillment_orders
            .values_mut()
            .flatten()
            .find(|fo| fo.id == fulfillment_order_id)
            .ok_or_else(|| StorefrontError::NotFound(format!("Fulfillment order {fulfillment_order_id}")))?;
        fo.status = "on_hold".into();
        let held = fo.clone();
        state.holds.push((fulfillment_order_id, hold));
        Ok(held)
    }
}
