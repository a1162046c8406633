use log::*;
use shopify_tools::{
    Customer,
    FulfillmentHold,
    FulfillmentOrder,
    ShopifyApi,
    ShopifyApiError,
    ShopifyOrder,
    ShopifyProduct,
};
use thiserror::Error;

/// The maximum number of order ids a storefront search returns.
pub const SEARCH_RESULT_LIMIT: u64 = 10;

#[derive(Debug, Clone, Error)]
pub enum StorefrontError {
    #[error("{0} was not found in the storefront")]
    NotFound(String),
    #[error("Storefront request failed. {0}")]
    RequestFailed(String),
}

impl From<ShopifyApiError> for StorefrontError {
    fn from(e: ShopifyApiError) -> Self {
        match e {
            ShopifyApiError::QueryError { status: 404, message } => Self::NotFound(message),
            e => Self::RequestFailed(e.to_string()),
        }
    }
}

/// Everything the engine reads from, or writes to, the storefront.
///
/// Calls are plain request/response and are always awaited one after the other; implementations need not be
/// re-entrant.
#[allow(async_fn_in_trait)]
pub trait StorefrontApi {
    async fn fetch_order(&self, order_id: i64) -> Result<ShopifyOrder, StorefrontError>;
    /// Newest first.
    async fn fetch_recent_orders(&self, limit: u64) -> Result<Vec<ShopifyOrder>, StorefrontError>;
    /// Runs a storefront search (e.g. `name:#1001`) and returns the ids of the matching orders, newest first.
    async fn search_order_ids(&self, query: &str) -> Result<Vec<i64>, StorefrontError>;
    async fn fetch_customer(&self, customer_id: i64) -> Result<Customer, StorefrontError>;
    async fn fetch_product(&self, product_id: i64) -> Result<ShopifyProduct, StorefrontError>;
    /// Replaces the note and tags of the order with the given values.
    async fn update_order_annotations(
        &self,
        order_id: i64,
        note: &str,
        tags: &str,
    ) -> Result<ShopifyOrder, StorefrontError>;
    /// Replaces the tags of the customer with the given value.
    async fn update_customer_tags(&self, customer_id: i64, tags: &str) -> Result<Customer, StorefrontError>;
    async fn fetch_fulfillment_orders(&self, order_id: i64) -> Result<Vec<FulfillmentOrder>, StorefrontError>;
    async fn hold_fulfillment_order(
        &self,
        fulfillment_order_id: i64,
        hold: FulfillmentHold,
    ) -> Result<FulfillmentOrder, StorefrontError>;
}

impl StorefrontApi for ShopifyApi {
    async fn fetch_order(&self, order_id: i64) -> Result<ShopifyOrder, StorefrontError> {
        Ok(self.get_order(order_id).await?)
    }

    async fn fetch_recent_orders(&self, limit: u64) -> Result<Vec<ShopifyOrder>, StorefrontError> {
        Ok(ShopifyApi::fetch_recent_orders(self, limit).await?)
    }

    async fn search_order_ids(&self, query: &str) -> Result<Vec<i64>, StorefrontError> {
        Ok(ShopifyApi::search_order_ids(self, query, SEARCH_RESULT_LIMIT).await?)
    }

    async fn fetch_customer(&self, customer_id: i64) -> Result<Customer, StorefrontError> {
        Ok(self.get_customer(customer_id).await?)
    }

    async fn fetch_product(&self, product_id: i64) -> Result<ShopifyProduct, StorefrontError> {
        Ok(self.get_product(product_id).await?)
    }

    async fn update_order_annotations(
        &self,
        order_id: i64,
        note: &str,
        tags: &str,
    ) -> Result<ShopifyOrder, StorefrontError> {
        trace!("🛍️ Writing annotations to order #{order_id} on {}", self.shop());
        Ok(ShopifyApi::update_order_annotations(self, order_id, note, tags).await?)
    }

    async fn update_customer_tags(&self, customer_id: i64, tags: &str) -> Result<Customer, StorefrontError> {
        Ok(ShopifyApi::update_customer_tags(self, customer_id, tags).await?)
    }

    async fn fetch_fulfillment_orders(&self, order_id: i64) -> Result<Vec<FulfillmentOrder>, StorefrontError> {
        Ok(ShopifyApi::fetch_fulfillment_orders(self, order_id).await?)
    }

    async fn hold_fulfillment_order(
        &self,
        fulfillment_order_id: i64,
        hold: FulfillmentHold,
    ) -> Result<FulfillmentOrder, StorefrontError> {
        Ok(ShopifyApi::hold_fulfillment_order(self, fulfillment_order_id, hold).await?)
    }
}
