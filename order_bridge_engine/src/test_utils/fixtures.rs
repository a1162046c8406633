use shopify_tools::{Address, Customer, LineItem, OrderBuilder, ShippingLine, ShopifyOrder, ShopifyProduct};

pub const POWDER_PRODUCT_ID: i64 = 632910392;
pub const PANEL_PRODUCT_ID: i64 = 921728736;

pub fn customer(id: i64, tags: &str) -> Customer {
    Customer {
        id,
        email: Some("bob.norman@mail.example.com".into()),
        phone: Some("+15551234567".into()),
        first_name: Some("Bob".into()),
        last_name: Some("Norman".into()),
        tags: tags.to_string(),
        note: None,
        state: Some("enabled".into()),
    }
}

pub fn shipping_address() -> Address {
    Address {
        first_name: Some("Bob".into()),
        last_name: Some("Norman".into()),
        company: None,
        address1: Some("Chestnut Street 92".into()),
        address2: Some("Unit 7".into()),
        city: Some("Louisville".into()),
        province: Some("Kentucky".into()),
        province_code: Some("KY".into()),
        country: Some("United States".into()),
        country_code: Some("US".into()),
        zip: Some("40202".into()),
        phone: Some("(555) 123-4567".into()),
    }
}

pub fn billing_address(company: Option<&str>) -> Address {
    Address { company: company.map(String::from), ..shipping_address() }
}

pub fn powder_product() -> ShopifyProduct {
    ShopifyProduct::new(POWDER_PRODUCT_ID, "BX50, BX25, BX5", &["PW-1200"])
}

/// Order #1001: 130 lbs of powder for a customer with an ERP account, shipped by express freight.
pub fn wholesale_order(id: i64, customer_tags: &str) -> ShopifyOrder {
    let mut builder = OrderBuilder::new();
    builder
        .id(id)
        .name("#1001".into())
        .email("bob.norman@mail.example.com".into())
        .note("Deliver to loading dock".into())
        .tags("wholesale".into())
        .created_at("2024-03-13T16:09:54-04:00".into())
        .gateway("Invoice".into())
        .line_items(vec![LineItem::new(POWDER_PRODUCT_ID, "PW-1200", 130, "4.10").with_discount("13.00")])
        .shipping_line(ShippingLine { title: "Express Freight".into(), code: Some("EXPRESS".into()), price: "25.00".into() })
        .billing_address(billing_address(Some("Norman Coatings")))
        .shipping_address(shipping_address())
        .customer(customer(207119551, customer_tags));
    builder.build()
}
