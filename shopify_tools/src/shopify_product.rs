use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopifyProduct {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub product_type: String,
    pub vendor: Option<String>,
    pub status: Option<String>,
    /// Comma-joined free-text tags. Container-extension codes (`BX...`) are declared here.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl ShopifyProduct {
    pub fn new(id: i64, tags: &str, variant_skus: &[&str]) -> Self {
        let variants = variant_skus
            .iter()
            .enumerate()
            .map(|(i, sku)| {
                #[allow(clippy::cast_possible_wrap)]
                let variant_id = id * 100 + i as i64;
                Variant {
                    id: variant_id,
                    product_id: id,
                    title: (*sku).to_string(),
                    sku: Some((*sku).to_string()),
                    price: "0.00".to_string(),
                }
            })
            .collect();
        Self { id, title: format!("Product {id}"), tags: tags.to_string(), variants, ..Default::default() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Variant {
    pub id: i64,
    #[serde(default)]
    pub product_id: i64,
    #[serde(default)]
    pub title: String,
    pub sku: Option<String>,
    #[serde(default)]
    pub price: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn deserialize_product() {
        #[derive(Deserialize)]
        struct ProductResponse {
            product: ShopifyProduct,
        }
        let json = include_str!("./test_assets/product.json");
        let product = serde_json::from_str::<ProductResponse>(json).unwrap().product;
        assert_eq!(product.id, 632910392);
        assert_eq!(product.tags, "BX50, BX25, bx5, featured");
        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.variants[0].sku.as_deref(), Some("PW-1200"));
        assert!(product.variants[1].sku.is_none());
    }
}
