use std::{rc::Rc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use futures::FutureExt;
use log::*;
use order_bridge_engine::{
    events::{ConfirmationReceived, EventHandler, EventProducer, Handler},
    Notifier,
    OrderTranslator,
    Reconciler,
    StorefrontApi,
};
use shopify_tools::ShopifyApi;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{HttpNotifier, HttpQueuePublisher},
    middleware::HmacMiddlewareFactory,
    routes::{erp_confirmation, erp_json_config, health, OrderCreatedRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let intake = ShopifyApi::new(config.intake_shopify.clone())?;
    let confirm = ShopifyApi::new(config.confirm_shopify.clone())?;
    let notifier = HttpNotifier::new(config.notify_url.clone());
    let reconciler = Reconciler::new(confirm, notifier).with_recent_order_window(config.recent_order_window);
    let confirmations = create_confirmation_handler(reconciler, config.confirmation_buffer);
    let producer = confirmations.subscribe();
    let srv = create_server_instance(config, intake, producer)?;
    let consumer = actix_web::rt::spawn(confirmations.start_handler());
    srv.await?;
    if !consumer.is_finished() {
        warn!("🚀️ Server has stopped while confirmations were still being reconciled.");
    }
    info!("🚀️ Server has stopped.");
    Ok(())
}

/// Builds the single consumer that reconciles ERP confirmations, one at a time.
pub fn create_confirmation_handler<S, N>(
    reconciler: Reconciler<S, N>,
    buffer_size: usize,
) -> EventHandler<ConfirmationReceived>
where
    S: StorefrontApi + 'static,
    N: Notifier + 'static,
{
    let reconciler = Rc::new(reconciler);
    let handler: Handler<ConfirmationReceived> = Box::new(move |ev: ConfirmationReceived| {
        let reconciler = Rc::clone(&reconciler);
        async move {
            debug!("🧾️ Confirmation for {} received at {}", ev.confirmation.order_number, ev.received_at);
            reconciler.handle(&ev.confirmation).await;
        }
        .boxed_local()
    });
    EventHandler::new(buffer_size, handler)
}

pub fn create_server_instance(
    config: ServerConfig,
    storefront: ShopifyApi,
    confirmations: EventProducer<ConfirmationReceived>,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let translator = OrderTranslator::new(storefront.clone(), &config.operating_unit);
        let queue = HttpQueuePublisher::new(&config.order_queue);
        let hmac = HmacMiddlewareFactory::shopify(config.intake_shopify.shared_secret.clone(), config.hmac_checks);
        let shopify_scope =
            web::scope("/shopify").wrap(hmac).service(OrderCreatedRoute::<ShopifyApi, HttpQueuePublisher>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("obg::access_log"))
            .app_data(web::Data::new(translator))
            .app_data(web::Data::new(queue))
            .app_data(web::Data::new(confirmations.clone()))
            .app_data(erp_json_config())
            .service(health)
            .service(erp_confirmation)
            .service(shopify_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
