use actix_web::{http::StatusCode, web, web::ServiceConfig};
use obg_common::Secret;
use order_bridge_engine::{
    test_utils::{fixtures::*, MemoryStorefront},
    OrderTranslator,
    QueueError,
};
use serde_json::Value;

use super::{helpers::post_request, mocks::MockOrderQueue};
use crate::{helpers::calculate_hmac, middleware::HmacMiddlewareFactory, routes::OrderCreatedRoute};

const WEBHOOK_PATH: &str = "/shopify/webhook/order_created";
const SECRET: &str = "hush";
const PAYLOAD: &str = r#"{"id":450789469}"#;

#[actix_web::test]
async fn signed_webhook_sends_the_order() {
    let _ = env_logger::try_init().ok();
    let signature = calculate_hmac(SECRET, PAYLOAD.as_bytes());
    let (status, body) = post_request(WEBHOOK_PATH, &[("X-Shopify-Hmac-Sha256", &signature)], PAYLOAD, |cfg| {
        configure(cfg, "AR_12345, SUID_9", 1)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_str(&body).expect("an order document");
    assert_eq!(doc["header"]["orig_sys_document_reference"], 450789469);
    assert_eq!(doc["custom_rec"]["cust_acct_num"], "12345");
    assert_eq!(doc["p_ou"], "OU-US");
    assert_eq!(doc["lines_list"]["line"].as_array().map(Vec::len), Some(3));
    assert_eq!(doc["lines_list"]["line"][0]["ppg_item_number"], "PW-1200/BX50");
}

#[actix_web::test]
async fn held_orders_are_acknowledged_without_a_document() {
    let _ = env_logger::try_init().ok();
    let signature = calculate_hmac(SECRET, PAYLOAD.as_bytes());
    let (status, body) =
        post_request(WEBHOOK_PATH, &[("X-Shopify-Hmac-Sha256", &signature)], PAYLOAD, |cfg| configure(cfg, "vip", 0))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn unknown_orders_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let payload = r#"{"id":1}"#;
    let signature = calculate_hmac(SECRET, payload.as_bytes());
    let (status, body) = post_request(WEBHOOK_PATH, &[("X-Shopify-Hmac-Sha256", &signature)], payload, |cfg| {
        configure(cfg, "AR_12345", 0)
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn queue_failures_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let signature = calculate_hmac(SECRET, PAYLOAD.as_bytes());
    let mut queue = MockOrderQueue::new();
    queue
        .expect_enqueue()
        .times(1)
        .returning(|_| Err(QueueError::DeliveryFailed("The queue answered 500 Internal Server Error".into())));
    let (status, body) =
        post_request(WEBHOOK_PATH, &[("X-Shopify-Hmac-Sha256", &signature)], PAYLOAD, |cfg| {
            register(cfg, "AR_12345, SUID_9", queue)
        })
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn unsigned_webhook_is_rejected() {
    let _ = env_logger::try_init().ok();
    let err = post_request(WEBHOOK_PATH, &[], PAYLOAD, |cfg| configure(cfg, "AR_12345", 0))
        .await
        .expect_err("Expected error");
    assert_eq!(err, "No HMAC signature found.");
}

#[actix_web::test]
async fn tampered_webhook_is_rejected() {
    let _ = env_logger::try_init().ok();
    let signature = calculate_hmac(SECRET, br#"{"id":1}"#);
    let err = post_request(WEBHOOK_PATH, &[("X-Shopify-Hmac-Sha256", &signature)], PAYLOAD, |cfg| {
        configure(cfg, "AR_12345", 0)
    })
    .await
    .expect_err("Expected error");
    assert_eq!(err, "Invalid HMAC signature.");
}

fn configure(cfg: &mut ServiceConfig, customer_tags: &str, expected_documents: usize) {
    let mut queue = MockOrderQueue::new();
    queue.expect_enqueue().times(expected_documents).returning(|_| Ok(()));
    register(cfg, customer_tags, queue);
}

fn register(cfg: &mut ServiceConfig, customer_tags: &str, queue: MockOrderQueue) {
    let storefront = MemoryStorefront::default();
    storefront.add_product(powder_product());
    storefront.add_order(wholesale_order(450789469, customer_tags));
    storefront.add_fulfillment_order(450789469, 1_100_001);
    let translator = OrderTranslator::new(storefront, "OU-US");
    cfg.app_data(web::Data::new(translator)).app_data(web::Data::new(queue)).service(
        web::scope("/shopify")
            .wrap(HmacMiddlewareFactory::shopify(Secret::new(SECRET.to_string()), true))
            .service(OrderCreatedRoute::<MemoryStorefront, MockOrderQueue>::new()),
    );
}
