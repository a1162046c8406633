//! Container-division planner
//!
//! Powders and liquids are sold by weight but shipped in discrete containers. A product declares the containers it can
//! ship in with `BX...` tags (or inherits them from its SKU category), and the planner splits each storefront line item
//! into one ERP line per container size, largest first, so that the quantities add up to exactly what was ordered.
use std::{fmt::Display, str::FromStr};

use log::*;
use shopify_tools::{helpers::parse_shopify_price, LineItem, ShopifyProduct};
use thiserror::Error;

/// The most containers of one size that a single ERP line may carry.
pub const MAX_CONTAINERS_PER_LINE: i64 = 20;
/// Shipping weight of one unit of quantity.
pub const UNIT_WEIGHT_GRAMS: i64 = 454;
/// Line items above this quantity are passed through undivided.
pub const MAX_DIVISIBLE_QUANTITY: i64 = 1_000_000;
const EXTENSION_SEPARATOR: char = '/';
const DRUM_MARKER: &str = "DRUM";

/// The container-extension codes the ERP knows about. The declaration order is the order in which codes are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContainerExtension {
    Bxa,
    Bxc,
    Bxe,
    Bxz,
    Bx50,
    Bx25,
    Bx5,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown container extension: {0}")]
pub struct UnknownExtension(pub String);

impl ContainerExtension {
    pub const ALL: [ContainerExtension; 7] =
        [Self::Bxa, Self::Bxc, Self::Bxe, Self::Bxz, Self::Bx50, Self::Bx25, Self::Bx5];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Bxa => "BXA",
            Self::Bxc => "BXC",
            Self::Bxe => "BXE",
            Self::Bxz => "BXZ",
            Self::Bx50 => "BX50",
            Self::Bx25 => "BX25",
            Self::Bx5 => "BX5",
        }
    }

    /// The quantity one container holds, for tiered containers. Single-unit containers hold whatever was ordered.
    pub fn container_weight(&self) -> Option<i64> {
        match self {
            Self::Bx50 => Some(50),
            Self::Bx25 => Some(25),
            Self::Bx5 => Some(5),
            _ => None,
        }
    }

    pub fn is_single_unit(&self) -> bool {
        self.container_weight().is_none()
    }
}

impl FromStr for ContainerExtension {
    type Err = UnknownExtension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Self::ALL.into_iter().find(|ext| ext.code() == code).ok_or(UnknownExtension(code))
    }
}

impl Display for ContainerExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Containers implied by the category code at the start of a SKU, for products that declare none. First match wins.
const CATEGORY_DEFAULTS: [(&str, &[ContainerExtension]); 4] = [
    ("PT", &[ContainerExtension::Bxe, ContainerExtension::Bxc, ContainerExtension::Bxz]),
    ("CT", &[ContainerExtension::Bxa]),
    ("PW", &[ContainerExtension::Bx50, ContainerExtension::Bx25, ContainerExtension::Bx5]),
    ("AD", &[ContainerExtension::Bx25, ContainerExtension::Bx5]),
];

/// The container extensions a product supports, sorted into application order.
pub fn supported_extensions(product: &ShopifyProduct, sku: &str) -> Vec<ContainerExtension> {
    let mut extensions = product
        .tags
        .split(',')
        .map(str::trim)
        .filter(|t| t.to_uppercase().starts_with("BX"))
        .filter_map(|t| match t.parse::<ContainerExtension>() {
            Ok(ext) => Some(ext),
            Err(e) => {
                debug!("📦️ Product {} has tag '{t}'. {e}", product.id);
                None
            },
        })
        .collect::<Vec<_>>();
    if extensions.is_empty() {
        let root = base_sku(sku).to_uppercase();
        if let Some((category, defaults)) = CATEGORY_DEFAULTS.iter().find(|(prefix, _)| root.starts_with(prefix)) {
            trace!("📦️ Product {} has no container tags. Using the {category} defaults", product.id);
            extensions.extend_from_slice(defaults);
        }
    }
    extensions.sort();
    extensions.dedup();
    extensions
}

/// True if any variant of the product ships in a fixed drum.
pub fn is_drum(product: &ShopifyProduct) -> bool {
    product.variants.iter().filter_map(|v| v.sku.as_deref()).any(|sku| sku.to_uppercase().contains(DRUM_MARKER))
}

/// The SKU without any container-extension suffix.
pub fn base_sku(sku: &str) -> &str {
    match sku.rsplit_once(EXTENSION_SEPARATOR) {
        Some((base, suffix)) if suffix.parse::<ContainerExtension>().is_ok() => base,
        _ => sku,
    }
}

/// One ERP line produced from a storefront line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine {
    pub sku: String,
    pub quantity: i64,
    pub weight_grams: i64,
    /// Price per unit after the per-unit discount, in cents. May be negative.
    pub unit_price_cents: i64,
    pub unit_discount_cents: i64,
    pub extension: Option<ContainerExtension>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinePricing {
    pub unit_price_cents: i64,
    pub unit_discount_cents: i64,
}

/// Works out the discounted unit price of a line. Values that cannot be parsed are logged and treated as zero.
pub fn line_pricing(item: &LineItem) -> LinePricing {
    let price = parse_shopify_price(&item.price).unwrap_or_else(|e| {
        error!("📦️ Line item {} ({}) has an unusable price. Using zero. {e}", item.id, item.sku());
        0
    });
    let total_discount = if item.discount_allocations.is_empty() {
        parse_amount_or_zero(item, &item.total_discount)
    } else {
        item.discount_allocations.iter().map(|d| parse_amount_or_zero(item, &d.amount)).sum()
    };
    let unit_discount = if item.quantity > 0 { divide_rounded(total_discount, item.quantity) } else { 0 };
    LinePricing { unit_price_cents: price - unit_discount, unit_discount_cents: unit_discount }
}

fn parse_amount_or_zero(item: &LineItem, amount: &str) -> i64 {
    if amount.trim().is_empty() {
        return 0;
    }
    parse_shopify_price(amount).unwrap_or_else(|e| {
        error!("📦️ Line item {} ({}) has an unusable discount. Ignoring it. {e}", item.id, item.sku());
        0
    })
}

// Rounds half away from zero. `divisor` is positive.
fn divide_rounded(value: i64, divisor: i64) -> i64 {
    let half = divisor / 2;
    if value >= 0 {
        (value + half) / divisor
    } else {
        (value - half) / divisor
    }
}

/// Splits a line item into container-sized lines.
///
/// `product` is the catalogue entry for the line, if it could be fetched. Without it the line is passed through as a
/// single line.
pub fn plan_line_item(item: &LineItem, product: Option<&ShopifyProduct>) -> Vec<PlannedLine> {
    if item.quantity <= 0 {
        debug!("📦️ Line item {} ({}) has quantity {}. Nothing to plan.", item.id, item.sku(), item.quantity);
        return Vec::new();
    }
    let pricing = line_pricing(item);
    let single = |sku: &str| vec![planned_line(sku.to_string(), item.quantity, pricing, None)];
    let Some(product) = product else {
        return single(item.sku());
    };
    if item.quantity > MAX_DIVISIBLE_QUANTITY {
        error!(
            "📦️ Line item {} ({}) has quantity {}, more than {MAX_DIVISIBLE_QUANTITY}. It is sent undivided.",
            item.id,
            item.sku(),
            item.quantity
        );
        return single(item.sku());
    }
    if is_drum(product) {
        debug!("📦️ Product {} ships in a drum. Line item {} is not divided.", product.id, item.id);
        return single(item.sku());
    }
    let extensions = supported_extensions(product, item.sku());
    if extensions.is_empty() {
        return single(item.sku());
    }
    let base = base_sku(item.sku());
    let lines = divide_quantity(item.quantity, &extensions)
        .into_iter()
        .map(|(ext, qty)| planned_line(format!("{base}{EXTENSION_SEPARATOR}{ext}"), qty, pricing, Some(ext)))
        .collect::<Vec<_>>();
    debug!(
        "📦️ Line item {} ({} x {}) planned as [{}]",
        item.id,
        item.quantity,
        item.sku(),
        lines.iter().map(|l| format!("{} x {}", l.quantity, l.sku)).collect::<Vec<_>>().join(", ")
    );
    lines
}

fn planned_line(
    sku: String,
    quantity: i64,
    pricing: LinePricing,
    extension: Option<ContainerExtension>,
) -> PlannedLine {
    PlannedLine {
        sku,
        quantity,
        weight_grams: quantity.saturating_mul(UNIT_WEIGHT_GRAMS),
        unit_price_cents: pricing.unit_price_cents,
        unit_discount_cents: pricing.unit_discount_cents,
        extension,
    }
}

/// Greedy split of `quantity` over the given extensions, which must be in application order. The returned quantities
/// always sum to `quantity`.
pub fn divide_quantity(quantity: i64, extensions: &[ContainerExtension]) -> Vec<(ContainerExtension, i64)> {
    let mut result = Vec::new();
    let mut remaining = quantity;
    if let Some(ext) = extensions.iter().find(|e| e.is_single_unit()) {
        result.push((*ext, remaining));
        return result;
    }
    let mut smallest = None;
    for ext in extensions {
        let Some(weight) = ext.container_weight() else { continue };
        smallest = Some(*ext);
        while remaining >= weight {
            let containers = (remaining / weight).min(MAX_CONTAINERS_PER_LINE);
            let qty = containers * weight;
            result.push((*ext, qty));
            remaining -= qty;
        }
    }
    if remaining > 0 {
        if let Some(ext) = smallest {
            trace!("📦️ {remaining} left over after division. Shipping it in a part-filled {ext}.");
            result.push((ext, remaining));
        }
    }
    result
}

#[cfg(test)]
mod test {
    use shopify_tools::LineItem;

    use super::*;
    use ContainerExtension::*;

    fn quantities(lines: &[PlannedLine]) -> Vec<i64> {
        lines.iter().map(|l| l.quantity).collect()
    }

    #[test]
    fn parse_extensions() {
        assert_eq!("bx50".parse::<ContainerExtension>(), Ok(Bx50));
        assert_eq!(" BXA ".parse::<ContainerExtension>(), Ok(Bxa));
        assert!("BX10".parse::<ContainerExtension>().is_err());
        assert!(Bxz.is_single_unit());
        assert_eq!(Bx25.container_weight(), Some(25));
    }

    #[test]
    fn tiered_division_sums_to_quantity() {
        let tiers = [Bx50, Bx25, Bx5];
        for q in 1..=2500 {
            let total: i64 = divide_quantity(q, &tiers).iter().map(|(_, qty)| qty).sum();
            assert_eq!(total, q, "quantity {q}");
        }
        for q in 1..=300 {
            let total: i64 = divide_quantity(q, &[Bx25]).iter().map(|(_, qty)| qty).sum();
            assert_eq!(total, q, "quantity {q}");
        }
    }

    #[test]
    fn largest_containers_first() {
        let item = LineItem::new(632910392, "PW-1200", 130, "4.10");
        let product = ShopifyProduct::new(632910392, "BX50, BX25, BX5", &["PW-1200"]);
        let lines = plan_line_item(&item, Some(&product));
        assert_eq!(quantities(&lines), vec![100, 25, 5]);
        assert_eq!(lines[0].sku, "PW-1200/BX50");
        assert_eq!(lines[1].sku, "PW-1200/BX25");
        assert_eq!(lines[2].sku, "PW-1200/BX5");
        assert_eq!(lines[0].weight_grams, 100 * UNIT_WEIGHT_GRAMS);
    }

    #[test]
    fn container_cap_per_line() {
        assert_eq!(divide_quantity(2000, &[Bx50, Bx25, Bx5]), vec![(Bx50, 1000), (Bx50, 1000)]);
        assert_eq!(divide_quantity(7, &[Bx5]), vec![(Bx5, 5), (Bx5, 2)]);
        assert_eq!(divide_quantity(3, &[Bx50, Bx25]), vec![(Bx25, 3)]);
    }

    #[test]
    fn drum_products_are_not_divided() {
        let item = LineItem::new(1, "PW-1200", 130, "4.10");
        let product = ShopifyProduct::new(1, "BX50, BX25, BX5", &["PW-1200", "PW-1200-DRUM"]);
        let lines = plan_line_item(&item, Some(&product));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].sku, "PW-1200");
        assert_eq!(lines[0].quantity, 130);
        assert!(lines[0].extension.is_none());
    }

    #[test]
    fn single_unit_codes_take_everything() {
        let item = LineItem::new(1, "XX-9", 12, "1.00");
        let product = ShopifyProduct::new(1, "BXZ, BXC, BX5", &["XX-9"]);
        let lines = plan_line_item(&item, Some(&product));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].sku, "XX-9/BXC");
        assert_eq!(lines[0].quantity, 12);
    }

    #[test]
    fn category_defaults() {
        let product = ShopifyProduct::new(1, "featured", &["PT-100"]);
        assert_eq!(supported_extensions(&product, "PT-100"), vec![Bxc, Bxe, Bxz]);
        assert_eq!(supported_extensions(&product, "CT-1"), vec![Bxa]);
        assert_eq!(supported_extensions(&product, "AD-7/BX5"), vec![Bx25, Bx5]);
        assert!(supported_extensions(&product, "ZZ-1").is_empty());
        // Explicit tags replace the defaults
        let product = ShopifyProduct::new(1, "BX5, BX99", &["PW-1"]);
        assert_eq!(supported_extensions(&product, "PW-1"), vec![Bx5]);
    }

    #[test]
    fn unrecognised_products_pass_through() {
        let item = LineItem::new(1, "ZZ-1", 9, "2.50");
        let product = ShopifyProduct::new(1, "featured", &["ZZ-1"]);
        let lines = plan_line_item(&item, Some(&product));
        assert_eq!(quantities(&lines), vec![9]);
        assert_eq!(lines[0].sku, "ZZ-1");
        let lines = plan_line_item(&item, None);
        assert_eq!(quantities(&lines), vec![9]);
    }

    #[test]
    fn existing_suffix_is_replaced() {
        assert_eq!(base_sku("PW-1200/BX5"), "PW-1200");
        assert_eq!(base_sku("PW-1200/RED"), "PW-1200/RED");
        let item = LineItem::new(1, "PW-1200/BX5", 60, "1.00");
        let product = ShopifyProduct::new(1, "BX50, BX5", &["PW-1200"]);
        let lines = plan_line_item(&item, Some(&product));
        assert_eq!(lines[0].sku, "PW-1200/BX50");
        assert_eq!(lines[1].sku, "PW-1200/BX5");
    }

    #[test]
    fn zero_quantity() {
        let item = LineItem::new(1, "PW-1200", 0, "1.00");
        assert!(plan_line_item(&item, None).is_empty());
    }

    #[test]
    fn discounted_unit_price() {
        let item = LineItem::new(1, "PW-1200", 130, "4.10").with_discount("13.00");
        let pricing = line_pricing(&item);
        assert_eq!(pricing, LinePricing { unit_price_cents: 400, unit_discount_cents: 10 });
        let product = ShopifyProduct::new(1, "BX50, BX25, BX5", &["PW-1200"]);
        assert!(plan_line_item(&item, Some(&product)).iter().all(|l| l.unit_price_cents == 400));
    }

    #[test]
    fn negative_prices_pass_through() {
        let item = LineItem::new(1, "PW-1200", 2, "1.00").with_discount("5.00");
        assert_eq!(line_pricing(&item).unit_price_cents, -150);
    }

    #[test]
    fn bad_prices_degrade_to_zero() {
        let _ = env_logger::try_init();
        let item = LineItem::new(1, "PW-1200", 5, "n/a");
        let lines = plan_line_item(&item, None);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].unit_price_cents, 0);
        let item = LineItem::new(1, "PW-1200", 5, "2.00").with_discount("abc");
        assert_eq!(line_pricing(&item).unit_price_cents, 200);
    }

    #[test]
    fn oversized_quantities_are_not_divided() {
        let _ = env_logger::try_init();
        let product = ShopifyProduct::new(1, "BX50, BX25, BX5", &["PW-1200"]);
        let item = LineItem::new(1, "PW-1200", i64::MAX / 100, "1.00");
        let lines = plan_line_item(&item, Some(&product));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].sku, "PW-1200");
        assert_eq!(lines[0].quantity, i64::MAX / 100);
        assert_eq!(lines[0].weight_grams, i64::MAX);
        let item = LineItem::new(1, "PW-1200", MAX_DIVISIBLE_QUANTITY, "1.00");
        let lines = plan_line_item(&item, Some(&product));
        assert_eq!(lines.iter().map(|l| l.quantity).sum::<i64>(), MAX_DIVISIBLE_QUANTITY);
        assert!(lines.iter().all(|l| l.extension == Some(Bx50)));
    }

    #[test]
    fn unknown_extensions() {
        let err = "BX99".parse::<ContainerExtension>().unwrap_err();
        assert_eq!(err, UnknownExtension("BX99".into()));
        assert_eq!(err.to_string(), "Unknown container extension: BX99");
    }
}
