use crate::ShopifyApiError;

/// Shopify expresses money as decimal strings, e.g. "12.50". Returns the value in cents. A third decimal place, when
/// present, is rounded half away from zero.
pub fn parse_shopify_price(price: &str) -> Result<i64, ShopifyApiError> {
    let invalid =
        |reason: String| ShopifyApiError::InvalidCurrencyAmount(format!("Invalid price value: {price}. {reason}."));
    let trimmed = price.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let mut parts = unsigned.split('.');
    let whole_units = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid("Missing whole units".to_string()))?
        .parse::<i64>()
        .map_err(|e| invalid(e.to_string()))?;
    let fraction = parts.next().unwrap_or("");
    if parts.next().is_some() {
        return Err(invalid("More than one decimal point".to_string()));
    }
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("Fractional part is not numeric".to_string()));
    }
    let digits = fraction.as_bytes();
    let digit = |i: usize| digits.get(i).map(|d| i64::from(d - b'0')).unwrap_or(0);
    let mut cents = digit(0) * 10 + digit(1);
    if digit(2) >= 5 {
        cents += 1;
    }
    let value = 100 * whole_units + cents;
    Ok(if negative { -value } else { value })
}

/// Formats a value in cents as a two-decimal string, e.g. `-1250` -> "-12.50".
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Extracts the numeric id from a GraphQL global id such as `gid://shopify/Order/450789469`.
pub fn parse_gid(gid: &str) -> Result<i64, ShopifyApiError> {
    gid.rsplit('/')
        .next()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| ShopifyApiError::InvalidGlobalId(gid.to_string()))
}
