use log::*;
use obg_common::Secret;

pub const DEFAULT_API_VERSION: &str = "2024-04";

/// Connection details for one Shopify Admin API credential set.
///
/// Order intake and confirmation processing run under different credentials, so the same shop is usually configured
/// twice with different environment prefixes. See [`ShopifyConfig::from_env_with_prefix`].
#[derive(Debug, Clone, Default)]
pub struct ShopifyConfig {
    pub shop: String,
    pub admin_access_token: Secret<String>,
    pub api_version: String,
    pub shared_secret: Secret<String>,
}

impl ShopifyConfig {
    /// Reads `{prefix}_SHOP`, `{prefix}_API_VERSION`, `{prefix}_ADMIN_ACCESS_TOKEN` and `{prefix}_API_SECRET`.
    pub fn from_env_with_prefix(prefix: &str) -> Self {
        let shop = std::env::var(format!("{prefix}_SHOP")).unwrap_or_else(|_| {
            warn!("{prefix}_SHOP not set, using (probably useless) default");
            "example.myshopify.com".to_string()
        });
        let api_version = std::env::var(format!("{prefix}_API_VERSION")).unwrap_or_else(|_| {
            warn!("{prefix}_API_VERSION not set, using {DEFAULT_API_VERSION} as default");
            DEFAULT_API_VERSION.to_string()
        });
        let admin_access_token =
            Secret::new(std::env::var(format!("{prefix}_ADMIN_ACCESS_TOKEN")).unwrap_or_else(|_| {
                warn!("{prefix}_ADMIN_ACCESS_TOKEN not set, using (probably useless) default");
                "shpat_00000000000000".to_string()
            }));
        let shared_secret = Secret::new(std::env::var(format!("{prefix}_API_SECRET")).unwrap_or_else(|_| {
            warn!("{prefix}_API_SECRET not set, using (probably useless) default");
            "00000000000000".to_string()
        }));
        Self { shop, admin_access_token, api_version, shared_secret }
    }
}
