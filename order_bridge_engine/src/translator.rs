//! Order translator
//!
//! Turns one storefront order into one ERP order document. The translator holds no state between orders; everything it
//! learns about the order being translated (the customer's ERP identity, the order date, the products already fetched)
//! lives in a [`TranslationContext`] that is dropped once the document is built.
//!
//! Translation never fails because of bad data in the order. Unparseable dates, prices and missing products are
//! logged and replaced by defaults. Only a storefront that cannot produce the order at all is an error.
use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use log::*;
use obg_common::helpers::truncate_chars;
use shopify_tools::{helpers::format_cents, Address, Customer, ShopifyOrder, ShopifyProduct};
use thiserror::Error;

use crate::{
    annotations::OrderAnnotation,
    container_planner::{plan_line_item, PlannedLine},
    erp_types::{CustomerRecord, ErpLine, ErpOrderDocument, Header, LinesList},
    hold_policy::{place_hold, requires_fraud_hold, HoldReason},
    tag_ledger::{LedgerToken, TagLedger, PANEL_ORDER_MARKER},
    traits::{OrderQueue, QueueError, StorefrontApi, StorefrontError},
};

pub const ORDERED_DATE_FORMAT: &str = "%Y-%m-%d %I:%M:%S";
pub const PO_NUMBER_MAX_CHARS: usize = 20;
pub const UNIT_OF_MEASURE: &str = "EA";
pub const CALCULATE_PRICE_FLAG: &str = "N";
pub const DELIVERY_LEAD_TIME_DAYS: i64 = 3;
pub const PANEL_ORDER_NOTE: &str = "Panel order: route to third-party fulfilment";
pub const FRAUD_HOLD_NOTE: &str = "Invoice payment requested by a customer without an ERP account";
const EXPEDITE_KEYWORDS: [&str; 4] = ["express", "expedite", "overnight", "priority"];

#[derive(Debug, Clone, Error)]
pub enum TranslationError {
    #[error("The storefront has no orders")]
    NoOrders,
    #[error("Could not fetch the order. {0}")]
    Storefront(#[from] StorefrontError),
    #[error("Could not send the order document. {0}")]
    Queue(#[from] QueueError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    Document(Box<ErpOrderDocument>),
    /// Every line of the order was excluded (e.g. a panel-only order).
    NothingToSend { order_id: i64 },
    /// The order was put on hold before anything was sent.
    Held { order_id: i64 },
}

impl TranslationOutcome {
    pub fn document(&self) -> Option<&ErpOrderDocument> {
        match self {
            Self::Document(doc) => Some(doc.as_ref()),
            _ => None,
        }
    }
}

/// Dates derived from the order creation date, already formatted for the ERP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDates {
    pub earliest_acceptable: String,
    pub request: String,
    pub promise: String,
    pub scheduled_ship: String,
}

impl LineDates {
    pub fn from_order_date(created_at: DateTime<FixedOffset>) -> Self {
        let plus = |days: i64| format_erp_date(created_at + Duration::days(days));
        Self { earliest_acceptable: plus(2), request: plus(2), promise: plus(5), scheduled_ship: plus(5) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneParts {
    pub country_code: String,
    pub area_code: String,
    pub number: String,
}

/// Splits a North American phone number into its parts. Anything that is not 10 or 11 digits long yields empty parts.
pub fn split_phone(phone: &str) -> PhoneParts {
    let digits = phone.chars().filter(char::is_ascii_digit).collect::<String>();
    match digits.len() {
        10 => PhoneParts { country_code: String::new(), area_code: digits[..3].into(), number: digits[3..].into() },
        11 => PhoneParts { country_code: digits[..1].into(), area_code: digits[1..4].into(), number: digits[4..].into() },
        _ => PhoneParts::default(),
    }
}

pub fn format_erp_date(date: DateTime<FixedOffset>) -> String {
    date.format(ORDERED_DATE_FORMAT).to_string()
}

/// The four ERP address lines. Company orders are addressed to the company, for the attention of the recipient.
pub fn address_lines(billing: Option<&Address>, shipping: Option<&Address>) -> [String; 4] {
    let street = |line: Option<&String>| line.map(|s| s.trim().to_string()).unwrap_or_default();
    let line1 = street(shipping.and_then(|a| a.address1.as_ref()));
    let line2 = street(shipping.and_then(|a| a.address2.as_ref()));
    let recipient = shipping.map(Address::full_name).unwrap_or_default().to_uppercase();
    match billing.and_then(Address::company) {
        Some(company) => [format!("*{}*", company.to_uppercase()), line1, line2, format!("ATTN: {recipient}")],
        None => [format!("*{recipient}*"), line1, line2, String::new()],
    }
}

pub fn po_number(order: &ShopifyOrder) -> String {
    let po = match order.note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(note) => format!("{} {note}", order.name),
        None => order.name.clone(),
    };
    truncate_chars(&po, PO_NUMBER_MAX_CHARS)
}

/// Colour panels and samples are fulfilled by a third party and never sent to the ERP.
pub fn is_panel_sku(sku: &str) -> bool {
    let sku = sku.trim().to_uppercase();
    sku.contains("PANEL") || sku.starts_with("SAMPLE")
}

pub fn is_expedited(order: &ShopifyOrder) -> bool {
    order.shipping_lines.iter().any(|line| {
        let text = format!("{} {}", line.title, line.code.as_deref().unwrap_or_default()).to_lowercase();
        EXPEDITE_KEYWORDS.iter().any(|k| text.contains(k))
    })
}

/// Everything known about the order being translated.
pub struct TranslationContext {
    pub order: ShopifyOrder,
    pub customer: Option<Customer>,
    pub account_number: String,
    pub site_use_id: String,
    pub created_at: DateTime<FixedOffset>,
    pub expedited: bool,
    products: HashMap<i64, Option<ShopifyProduct>>,
}

impl TranslationContext {
    pub fn new(order: ShopifyOrder, customer: Option<Customer>) -> Self {
        let ledger = TagLedger::new(customer.as_ref().map(|c| c.tags.as_str()).unwrap_or_default());
        let created_at = order.created_at().unwrap_or_else(|e| {
            warn!("🔄️ Order #{} has no usable creation date. Using the current time. {e}", order.id);
            Utc::now().fixed_offset()
        });
        let expedited = is_expedited(&order);
        Self {
            account_number: ledger.account_number(),
            site_use_id: ledger.site_use_id(),
            customer,
            created_at,
            expedited,
            order,
            products: HashMap::new(),
        }
    }
}

pub struct OrderTranslator<S> {
    storefront: S,
    operating_unit: String,
}

impl<S: StorefrontApi> OrderTranslator<S> {
    pub fn new(storefront: S, operating_unit: &str) -> Self {
        Self { storefront, operating_unit: operating_unit.to_string() }
    }

    /// Translates the order with the given id, or the most recent order if no id is given, and hands the resulting
    /// document to the queue.
    pub async fn dispatch<Q: OrderQueue>(
        &self,
        order_id: Option<i64>,
        queue: &Q,
    ) -> Result<TranslationOutcome, TranslationError> {
        let outcome = match order_id {
            Some(id) => self.translate_order(id).await?,
            None => self.translate_latest().await?,
        };
        if let TranslationOutcome::Document(doc) = &outcome {
            queue.enqueue(doc).await?;
            info!("🔄️ Order #{} sent to the ERP queue with {} lines", doc.header.order_reference_id, doc.lines().len());
        }
        Ok(outcome)
    }

    pub async fn translate_latest(&self) -> Result<TranslationOutcome, TranslationError> {
        let order = self.storefront.fetch_recent_orders(1).await?.into_iter().next().ok_or(TranslationError::NoOrders)?;
        self.translate(order).await
    }

    pub async fn translate_order(&self, order_id: i64) -> Result<TranslationOutcome, TranslationError> {
        let order = self.storefront.fetch_order(order_id).await?;
        self.translate(order).await
    }

    pub async fn translate(&self, order: ShopifyOrder) -> Result<TranslationOutcome, TranslationError> {
        info!("🔄️ Translating order #{} ({})", order.id, order.name);
        let customer = self.resolve_customer(&order).await;
        let mut ctx = TranslationContext::new(order, customer);
        debug!(
            "🔄️ Order #{} belongs to account '{}', site use id '{}'",
            ctx.order.id, ctx.account_number, ctx.site_use_id
        );
        if requires_fraud_hold(&ctx.account_number, &ctx.order) {
            warn!("🔄️ Order #{} asks for invoice payment on the generic account. Holding it.", ctx.order.id);
            place_hold(&self.storefront, &ctx.order, HoldReason::HighRiskOfFraud, FRAUD_HOLD_NOTE).await;
            return Ok(TranslationOutcome::Held { order_id: ctx.order.id });
        }
        let customer_record = customer_record(&ctx);
        let header = header(&ctx);
        let lines = self.build_lines(&mut ctx).await;
        if lines.is_empty() {
            info!("🔄️ Order #{} has no lines for the ERP. Nothing to send.", ctx.order.id);
            return Ok(TranslationOutcome::NothingToSend { order_id: ctx.order.id });
        }
        let document = ErpOrderDocument {
            customer_record,
            header,
            lines_list: LinesList { line: lines },
            operating_unit: self.operating_unit.clone(),
        };
        Ok(TranslationOutcome::Document(Box::new(document)))
    }

    // The order carries a snapshot of the customer. The ledger in the customer record itself may be newer.
    async fn resolve_customer(&self, order: &ShopifyOrder) -> Option<Customer> {
        let snapshot = order.customer.as_ref()?;
        match self.storefront.fetch_customer(snapshot.id).await {
            Ok(customer) => Some(customer),
            Err(e) => {
                warn!("🔄️ Could not fetch customer {}. Using the copy on the order. {e}", snapshot.id);
                Some(snapshot.clone())
            },
        }
    }

    async fn build_lines(&self, ctx: &mut TranslationContext) -> Vec<ErpLine> {
        let dates = LineDates::from_order_date(ctx.created_at);
        let mut lines = Vec::new();
        let mut has_panels = false;
        let items = ctx.order.line_items.clone();
        for item in &items {
            if is_panel_sku(item.sku()) {
                debug!("🔄️ Line item {} ({}) is a panel. Excluded from the ERP order.", item.id, item.sku());
                has_panels = true;
                continue;
            }
            let product = match item.product_id {
                Some(id) => self.product(ctx, id).await,
                None => None,
            };
            let planned = plan_line_item(item, product.as_ref());
            lines.extend(planned.iter().map(|p| erp_line(p, &dates, ctx.expedited)));
        }
        if has_panels {
            self.mark_panel_order(&ctx.order).await;
        }
        lines
    }

    async fn product(&self, ctx: &mut TranslationContext, product_id: i64) -> Option<ShopifyProduct> {
        if let Some(cached) = ctx.products.get(&product_id) {
            return cached.clone();
        }
        let product = match self.storefront.fetch_product(product_id).await {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("🔄️ Could not fetch product {product_id}. Its lines will not be divided. {e}");
                None
            },
        };
        ctx.products.insert(product_id, product.clone());
        product
    }

    async fn mark_panel_order(&self, order: &ShopifyOrder) {
        let mut annotation = OrderAnnotation::for_order(order);
        let marker = LedgerToken::Marker(PANEL_ORDER_MARKER);
        if annotation.tags().contains(&marker) {
            trace!("🔄️ Order #{} is already marked as a panel order", order.id);
            return;
        }
        annotation.note(PANEL_ORDER_NOTE).tag(marker);
        if let Err(e) = annotation.apply(&self.storefront).await {
            error!("🔄️ Could not mark order #{} as a panel order. {e}", order.id);
        }
    }
}

fn customer_record(ctx: &TranslationContext) -> CustomerRecord {
    let order = &ctx.order;
    let shipping = order.shipping_address.as_ref().or(order.billing_address.as_ref());
    let [address1, address2, address3, address4] = address_lines(order.billing_address.as_ref(), shipping);
    let customer = ctx.customer.as_ref();
    let first_name = shipping
        .and_then(|a| a.first_name.clone())
        .or_else(|| customer.and_then(|c| c.first_name.clone()))
        .unwrap_or_default();
    let last_name = shipping
        .and_then(|a| a.last_name.clone())
        .or_else(|| customer.and_then(|c| c.last_name.clone()))
        .unwrap_or_default();
    let email = order.email.clone().or_else(|| customer.and_then(|c| c.email.clone())).unwrap_or_default();
    let phone = shipping
        .and_then(|a| a.phone.clone())
        .or_else(|| order.phone.clone())
        .or_else(|| customer.and_then(|c| c.phone.clone()))
        .unwrap_or_default();
    let phone = split_phone(&phone);
    let state = shipping.and_then(|a| a.province_code.clone().or_else(|| a.province.clone())).unwrap_or_default();
    let country = shipping.and_then(|a| a.country_code.clone().or_else(|| a.country.clone())).unwrap_or_default();
    CustomerRecord {
        account_number: ctx.account_number.clone(),
        site_use_id: ctx.site_use_id.clone(),
        address1,
        address2,
        address3,
        address4,
        city: shipping.and_then(|a| a.city.clone()).unwrap_or_default(),
        state,
        country,
        postal_code: shipping.and_then(|a| a.zip.clone()).unwrap_or_default(),
        contact_first_name: first_name,
        contact_last_name: last_name,
        contact_email: email,
        phone_country_code: phone.country_code,
        phone_area_code: phone.area_code,
        phone_number: phone.number,
        ..Default::default()
    }
}

fn header(ctx: &TranslationContext) -> Header {
    Header {
        ordered_date: format_erp_date(ctx.created_at),
        order_reference_id: ctx.order.id,
        customer_po_number: po_number(&ctx.order),
        ..Default::default()
    }
}

fn erp_line(planned: &PlannedLine, dates: &LineDates, expedited: bool) -> ErpLine {
    ErpLine {
        unit_price: format_cents(planned.unit_price_cents),
        calculate_price_flag: CALCULATE_PRICE_FLAG.to_string(),
        item_number: planned.sku.clone(),
        customer_part_number: None,
        ordered_quantity: planned.quantity,
        ordered_quantity_unit: UNIT_OF_MEASURE.to_string(),
        promise_date: dates.promise.clone(),
        earliest_acceptable_date: dates.earliest_acceptable.clone(),
        request_date: dates.request.clone(),
        scheduled_ship_date: dates.scheduled_ship.clone(),
        delivery_lead_time: DELIVERY_LEAD_TIME_DAYS,
        expedited_ship_flag: if expedited { "Y" } else { "N" }.to_string(),
        ship_method_code: None,
        order_discount: format_cents(planned.unit_discount_cents),
        ..Default::default()
    }
}
