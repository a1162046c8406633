//! # ERP order bridge server
//! This crate hosts the HTTP front end of the order bridge. It is responsible for:
//! * Listening for new-order webhook calls from Shopify, translating the order into an ERP order document and posting
//!   it to the outbound order queue.
//! * Accepting ERP confirmations (and rejections) and handing them to the reconciliation task, which processes them one
//!   at a time.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/shopify/webhook/order_created`: The webhook route for new orders. Protected by Shopify's HMAC signature.
//! * `/erp/confirmation`: Confirmation messages from the ERP.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
