use actix_web::{http::StatusCode, web, web::ServiceConfig};
use order_bridge_engine::{
    erp_types::OrderConfirmation,
    events::{ConfirmationReceived, EventProducer},
    test_utils::{fixtures::*, MemoryStorefront},
    Reconciler,
};
use tokio::sync::mpsc;

use super::{helpers::post_request, mocks::MockNotifier};
use crate::{
    routes::{erp_confirmation, erp_json_config},
    server::create_confirmation_handler,
};

const CONFIRMATION_PATH: &str = "/erp/confirmation";

#[actix_web::test]
async fn confirmations_are_queued() {
    let _ = env_logger::try_init().ok();
    let (sender, mut receiver) = mpsc::channel(4);
    let producer = EventProducer::new(sender);
    let body = r#"{"site_id": 77, "contact_id": 0, "location_id": 0, "order_number": 450789469, "error_msg": null}"#;
    let (status, body) =
        post_request(CONFIRMATION_PATH, &[], body, |cfg| configure(cfg, producer)).await.expect("Request failed");
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, r#"{"success":true,"message":"Confirmation for 450789469 accepted."}"#);
    let event: ConfirmationReceived = receiver.try_recv().expect("a queued confirmation");
    assert_eq!(event.confirmation, OrderConfirmation::confirmed("450789469", 77));
}

#[actix_web::test]
async fn invalid_confirmations_are_refused() {
    let _ = env_logger::try_init().ok();
    let (sender, mut receiver) = mpsc::channel(4);
    let producer = EventProducer::new(sender);
    let (status, body) =
        post_request(CONFIRMATION_PATH, &[], "{not json", |cfg| configure(cfg, producer)).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"success":false,"message":"Payload deserialization error."#));
    assert!(receiver.try_recv().is_err());
}

#[actix_web::test]
async fn confirmations_need_a_running_reconciler() {
    let _ = env_logger::try_init().ok();
    let (sender, receiver) = mpsc::channel(4);
    drop(receiver);
    let producer = EventProducer::new(sender);
    let body = r#"{"site_id": 77, "contact_id": 0, "location_id": 0, "order_number": "450789469"}"#;
    let (status, body) =
        post_request(CONFIRMATION_PATH, &[], body, |cfg| configure(cfg, producer)).await.expect("Request failed");
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.starts_with(r#"{"success":false,"message":"The confirmation could not be queued"#));
}

#[actix_web::test]
async fn queued_confirmations_are_reconciled() {
    let _ = env_logger::try_init().ok();
    let storefront = MemoryStorefront::default();
    storefront.add_order(wholesale_order(450789469, "AR_12345"));
    let mut notifier = MockNotifier::new();
    notifier.expect_notify().withf(|message| message == "450789469").times(1).returning(|_| Ok(()));
    let reconciler = Reconciler::new(storefront.clone(), notifier);
    let handler = create_confirmation_handler(reconciler, 4);
    let producer = handler.subscribe();
    producer.publish_event(ConfirmationReceived::new(OrderConfirmation::confirmed("450789469", 77))).await.unwrap();
    drop(producer);
    handler.start_handler().await;
    let order = storefront.order(450789469).unwrap();
    assert!(order.tags.contains("ERP_450789469"));
    assert!(order.tags.contains("SUID_77"));
    assert!(order.note.unwrap_or_default().contains("ERP account: 12345"));
    assert!(storefront.customer(207119551).unwrap().tags.contains("SUID_77"));
}

fn configure(cfg: &mut ServiceConfig, producer: EventProducer<ConfirmationReceived>) {
    cfg.app_data(web::Data::new(producer)).app_data(erp_json_config()).service(erp_confirmation);
}
