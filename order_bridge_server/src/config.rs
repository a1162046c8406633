//! Server configuration
//!
//! Everything is read from environment variables prefixed with `OBG_`. Missing or invalid values fall back to
//! defaults, with a warning in the log, so that a misconfigured server still starts and reports what is wrong.
use std::env;

use log::*;
use obg_common::{helpers::parse_boolean_flag, Secret};
use order_bridge_engine::reconciliation::DEFAULT_RECENT_ORDER_WINDOW;
use shopify_tools::ShopifyConfig;

const DEFAULT_OBG_HOST: &str = "127.0.0.1";
const DEFAULT_OBG_PORT: u16 = 8460;
const DEFAULT_CONFIRMATION_BUFFER: usize = 25;
pub const INTAKE_SHOPIFY_PREFIX: &str = "OBG_INTAKE_SHOPIFY";
pub const CONFIRM_SHOPIFY_PREFIX: &str = "OBG_CONFIRM_SHOPIFY";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Credentials used to read new orders and to hold or annotate them during translation.
    pub intake_shopify: ShopifyConfig,
    /// Credentials used to record ERP confirmations on orders and customers.
    pub confirm_shopify: ShopifyConfig,
    /// If false, webhook calls are accepted without checking their HMAC signature. **DANGER**
    pub hmac_checks: bool,
    pub order_queue: OrderQueueConfig,
    /// Where reviewer notifications are posted. Notifications are only logged if this is not set.
    pub notify_url: Option<String>,
    pub operating_unit: String,
    pub recent_order_window: u64,
    pub confirmation_buffer: usize,
}

#[derive(Clone, Debug, Default)]
pub struct OrderQueueConfig {
    pub url: String,
    pub authorization: Option<Secret<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OBG_HOST.to_string(),
            port: DEFAULT_OBG_PORT,
            intake_shopify: ShopifyConfig::default(),
            confirm_shopify: ShopifyConfig::default(),
            hmac_checks: true,
            order_queue: OrderQueueConfig::default(),
            notify_url: None,
            operating_unit: String::default(),
            recent_order_window: DEFAULT_RECENT_ORDER_WINDOW,
            confirmation_buffer: DEFAULT_CONFIRMATION_BUFFER,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("OBG_HOST").ok().unwrap_or_else(|| DEFAULT_OBG_HOST.into());
        let port = env::var("OBG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for OBG_PORT. {e} Using the default, {DEFAULT_OBG_PORT}, instead."
                    );
                    DEFAULT_OBG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_OBG_PORT);
        let intake_shopify = ShopifyConfig::from_env_with_prefix(INTAKE_SHOPIFY_PREFIX);
        let confirm_shopify = ShopifyConfig::from_env_with_prefix(CONFIRM_SHOPIFY_PREFIX);
        let hmac_checks = parse_boolean_flag(env::var("OBG_SHOPIFY_HMAC_CHECKS").ok(), true);
        if !hmac_checks {
            warn!("🪛️ HMAC checks are disabled. Anyone can post orders to the webhook endpoint.");
        }
        let url = env::var("OBG_ORDER_QUEUE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ OBG_ORDER_QUEUE_URL is not set. Order documents cannot be delivered.");
            String::default()
        });
        let authorization = env::var("OBG_ORDER_QUEUE_AUTH").ok().map(Secret::new);
        let notify_url = env::var("OBG_NOTIFY_URL").ok().filter(|s| !s.trim().is_empty());
        if notify_url.is_none() {
            warn!("🪛️ OBG_NOTIFY_URL is not set. Reviewer notifications will only be logged.");
        }
        let operating_unit = env::var("OBG_OPERATING_UNIT").ok().unwrap_or_else(|| {
            warn!("🪛️ OBG_OPERATING_UNIT is not set. Order documents will have a blank operating unit.");
            String::default()
        });
        let recent_order_window = parse_number("OBG_RECENT_ORDER_WINDOW", DEFAULT_RECENT_ORDER_WINDOW);
        let confirmation_buffer = parse_number("OBG_CONFIRMATION_BUFFER", DEFAULT_CONFIRMATION_BUFFER);
        Self {
            host,
            port,
            intake_shopify,
            confirm_shopify,
            hmac_checks,
            order_queue: OrderQueueConfig { url, authorization },
            notify_url,
            operating_unit,
            recent_order_window,
            confirmation_buffer,
        }
    }
}

fn parse_number<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            warn!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => {
            debug!("🪛️ {name} is not set. Using the default, {default}.");
            default
        },
    }
}
