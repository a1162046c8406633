//! Wire types exchanged with the ERP.
//!
//! Field names are dictated by the receiving system and must not be "fixed". In particular `Frieght_Charges_Code` on
//! [`ErpLine`] is misspelt and capitalised on purpose.
use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErpOrderDocument {
    #[serde(rename = "custom_rec")]
    pub customer_record: CustomerRecord,
    pub header: Header,
    pub lines_list: LinesList,
    /// Operating unit
    #[serde(rename = "p_ou")]
    pub operating_unit: String,
}

impl ErpOrderDocument {
    pub fn lines(&self) -> &[ErpLine] {
        &self.lines_list.line
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "cust_acct_num")]
    pub account_number: String,
    pub site_use_id: String,
    pub address1: String,
    pub address2: String,
    pub address3: String,
    pub address4: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    pub location_id: String,
    pub location: String,
    pub contact_id: String,
    pub contact_first_name: String,
    pub contact_middle_name: String,
    pub contact_last_name: String,
    pub contact_email: String,
    pub phone_country_code: String,
    pub phone_area_code: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub ordered_date: String,
    /// The storefront order id. The ERP echoes it back as the confirmation's `order_number`.
    #[serde(rename = "orig_sys_document_reference")]
    pub order_reference_id: i64,
    #[serde(rename = "cust_po_number")]
    pub customer_po_number: String,
    #[serde(rename = "hdr_payment_terms_code")]
    pub payment_terms_code: String,
    #[serde(rename = "hdr_payment_type_code")]
    pub payment_type_code: String,
    #[serde(rename = "hdr_freight_charges_code")]
    pub freight_charges_code: String,
    #[serde(rename = "hdr_fob_point_code")]
    pub fob_point_code: String,
    #[serde(rename = "hdr_freight_carrier_code")]
    pub freight_carrier_code: String,
    #[serde(rename = "hdr_freight_terms_code")]
    pub freight_terms_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinesList {
    pub line: Vec<ErpLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErpLine {
    pub unit_price: String,
    pub calculate_price_flag: String,
    /// The SKU, including its container-extension suffix
    #[serde(rename = "ppg_item_number")]
    pub item_number: String,
    pub customer_part_number: Option<String>,
    pub ordered_quantity: i64,
    #[serde(rename = "ordered_quantity_uom")]
    pub ordered_quantity_unit: String,
    pub promise_date: String,
    pub earliest_acceptable_date: String,
    pub request_date: String,
    pub scheduled_ship_date: String,
    pub delivery_lead_time: i64,
    pub expedited_ship_flag: String,
    pub freight_carrier_code: String,
    pub freight_terms_code: String,
    pub ship_method_code: Option<String>,
    pub order_discount: String,
    #[serde(rename = "Frieght_Charges_Code")]
    pub freight_charges_code: String,
    pub fob_point_code: String,
}

/// An order outcome reported by the ERP on the confirmation queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub site_id: i64,
    pub contact_id: i64,
    pub location_id: i64,
    #[serde(deserialize_with = "string_or_number")]
    pub order_number: String,
    #[serde(default)]
    pub error_msg: Option<String>,
}

impl OrderConfirmation {
    pub fn confirmed(order_number: &str, site_id: i64) -> Self {
        Self { site_id, order_number: order_number.to_string(), ..Default::default() }
    }

    pub fn rejected(order_number: &str, error: &str) -> Self {
        Self { order_number: order_number.to_string(), error_msg: Some(error.to_string()), ..Default::default() }
    }

    /// The reported error, if any. Blank error strings count as no error.
    pub fn error(&self) -> Option<&str> {
        self.error_msg.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }
}

impl Display for OrderConfirmation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.error() {
            Some(e) => write!(f, "order {} rejected: {e}", self.order_number),
            None => write!(f, "order {} confirmed for site {}", self.order_number, self.site_id),
        }
    }
}

// Some ERP releases send the order number as a JSON number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => Ok(s),
        StringOrNumber::Number(n) => Ok(n.to_string()),
    }
}
