//! Tag ledger codec
//!
//! Shopify orders and customers carry a free-text, comma-joined tag string. The bridge, and the ERP side that also
//! reads these tags, use it as an ordered key-value ledger:
//!
//! * `AR_<account>`: an explicit accounts-receivable account number,
//! * `SUID_<id>`: the ERP site-use id, written back after the first confirmed order,
//! * any token containing `INC` or `REF`: an account-type marker that doubles as the account number,
//! * `ERP_<reference>` and a handful of bare markers (`PANEL_ORDER`, `FRAUD_HOLD`, `ERP_ERROR`).
//!
//! The text of the ledger is never normalised: appending a token leaves the existing tags exactly as they were. Shopify
//! itself joins tags with ", ", so tokens are trimmed when read.
use std::fmt::{Display, Formatter};

/// The account used for orders from customers without an ERP account of their own.
pub const GENERIC_ECOMMERCE_ACCOUNT: &str = "ECOM-GENERIC";
pub const ACCOUNT_PREFIX: &str = "AR_";
pub const SITE_USE_LABEL: &str = "SUID";
pub const SITE_USE_PREFIX: &str = "SUID_";
pub const ERP_REFERENCE_PREFIX: &str = "ERP_";
pub const PANEL_ORDER_MARKER: &str = "PANEL_ORDER";
pub const FRAUD_HOLD_MARKER: &str = "FRAUD_HOLD";
pub const ERP_ERROR_MARKER: &str = "ERP_ERROR";
const ACCOUNT_TYPE_MARKERS: [&str; 2] = ["INC", "REF"];
const SEPARATOR: char = ',';

/// A single fact that can be written to a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerToken {
    AccountNumber(String),
    SiteUseId(String),
    ErpReference(String),
    Marker(&'static str),
}

impl Display for LedgerToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccountNumber(acct) => write!(f, "{ACCOUNT_PREFIX}{acct}"),
            Self::SiteUseId(id) => write!(f, "{SITE_USE_PREFIX}{id}"),
            Self::ErpReference(reference) => write!(f, "{ERP_REFERENCE_PREFIX}{reference}"),
            Self::Marker(marker) => f.write_str(marker),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagLedger {
    raw: String,
}

impl TagLedger {
    pub fn new(tags: &str) -> Self {
        Self { raw: tags.to_string() }
    }

    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens().next().is_none()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.raw.split(SEPARATOR).map(str::trim).filter(|t| !t.is_empty())
    }

    /// The account number that governs orders for this ledger. An `AR_` token always wins, then the first token
    /// carrying an account-type marker, and finally the generic ecommerce account.
    pub fn account_number(&self) -> String {
        if let Some(acct) = self.tokens().find_map(|t| t.strip_prefix(ACCOUNT_PREFIX)) {
            return acct.to_string();
        }
        self.tokens()
            .find(|t| ACCOUNT_TYPE_MARKERS.iter().any(|m| t.contains(m)))
            .unwrap_or(GENERIC_ECOMMERCE_ACCOUNT)
            .to_string()
    }

    /// The ERP site-use id, or an empty string if the customer has never been confirmed by the ERP.
    pub fn site_use_id(&self) -> String {
        self.tokens()
            .find_map(|t| t.find(SITE_USE_LABEL).map(|i| &t[i + SITE_USE_LABEL.len()..]))
            .map(|rest| rest.chars().skip(1).collect())
            .unwrap_or_default()
    }

    pub fn contains<T: Display>(&self, token: T) -> bool {
        let token = token.to_string();
        let token = token.trim();
        self.tokens().any(|t| t == token)
    }

    /// Appends the token, whether or not it is already present.
    pub fn append<T: Display>(&mut self, token: T) {
        self.raw = append_token(&self.raw, &token.to_string());
    }

    /// Appends the token only if it is not already in the ledger. Returns true if the ledger changed.
    pub fn append_if_absent<T: Display>(&mut self, token: T) -> bool {
        let token = token.to_string();
        if self.contains(&token) {
            return false;
        }
        self.append(token);
        true
    }
}

impl Display for TagLedger {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for TagLedger {
    fn from(tags: &str) -> Self {
        Self::new(tags)
    }
}

pub fn parse_account_number(tags: &str) -> String {
    TagLedger::new(tags).account_number()
}

pub fn parse_site_use_id(tags: &str) -> String {
    TagLedger::new(tags).site_use_id()
}

/// Appends a token to a tag string. This does not deduplicate; callers check [`contains_token`] first for tokens that
/// must only appear once.
pub fn append_token(tags: &str, token: &str) -> String {
    if tags.trim().is_empty() {
        token.to_string()
    } else {
        format!("{tags}{SEPARATOR}{token}")
    }
}

pub fn contains_token(tags: &str, token: &str) -> bool {
    TagLedger::new(tags).contains(token)
}
