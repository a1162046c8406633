//! Shopify Admin API client
//!
//! A small REST + GraphQL client for the handful of Admin API calls the order bridge needs: reading orders, customers
//! and products, writing notes and tags back onto orders and customers, and placing fulfillment holds.
mod api;
mod config;
mod error;
mod shopify_order;
mod shopify_product;

pub mod data_objects;
pub mod helpers;

pub use api::ShopifyApi;
pub use config::ShopifyConfig;
pub use data_objects::{FulfillmentHold, FulfillmentOrder};
pub use error::ShopifyApiError;
pub use shopify_order::{Address, Customer, DiscountAllocation, LineItem, OrderBuilder, ShippingLine, ShopifyOrder};
pub use shopify_product::{ShopifyProduct, Variant};
