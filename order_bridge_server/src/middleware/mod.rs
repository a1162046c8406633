mod hmac;

pub use hmac::{HmacMiddlewareFactory, HmacMiddlewareService, SHOPIFY_HMAC_HEADER};
