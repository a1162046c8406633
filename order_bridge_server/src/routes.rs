//! Request handler definitions
//!
//! Define each route and its handler here. Handlers stay thin: order translation and reconciliation live in
//! `order_bridge_engine`.
//!
//! A note about performance:
//! Each worker thread processes its requests sequentially, so handlers must never block the thread. Every storefront
//! and queue call is async and awaited:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, http::header::ContentType, post, web, HttpRequest, HttpResponse, Responder};
use log::*;
use order_bridge_engine::{
    erp_types::OrderConfirmation,
    events::{ConfirmationReceived, EventProducer},
    OrderQueue,
    OrderTranslator,
    StorefrontApi,
    TranslationOutcome,
};

use crate::{
    data_objects::{JsonResponse, OrderWebhookPayload},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Shopify  ----------------------------------------------------
route!(order_created => Post "/webhook/order_created" impl StorefrontApi, OrderQueue);
/// Route handler for Shopify's `orders/create` webhook.
///
/// The payload is only used for the order id; the order itself is re-read from the storefront. Without an id, the most
/// recent order is translated. The ERP order document is sent to the order queue and echoed in the response body.
///
/// Webhook responses must always be in the 200 range, otherwise Shopify keeps retrying. Failures are logged and answered
/// with an empty body.
pub async fn order_created<S, Q>(
    req: HttpRequest,
    body: web::Bytes,
    translator: web::Data<OrderTranslator<S>>,
    queue: web::Data<Q>,
) -> HttpResponse
where
    S: StorefrontApi,
    Q: OrderQueue,
{
    trace!("🛍️️ Received webhook request: {}", req.uri());
    let order_id = webhook_order_id(&body);
    match translator.dispatch(order_id, queue.as_ref()).await {
        Ok(TranslationOutcome::Document(doc)) => match serde_json::to_string(&doc) {
            Ok(json) => HttpResponse::Ok().insert_header(ContentType::json()).body(json),
            Err(e) => {
                error!("🛍️️ Order #{} was sent, but could not be echoed. {e}", doc.header.order_reference_id);
                HttpResponse::Ok().finish()
            },
        },
        Ok(TranslationOutcome::NothingToSend { order_id }) => {
            info!("🛍️️ Order #{order_id} has nothing to send to the ERP.");
            HttpResponse::Ok().finish()
        },
        Ok(TranslationOutcome::Held { order_id }) => {
            info!("🛍️️ Order #{order_id} is on hold and was not sent to the ERP.");
            HttpResponse::Ok().finish()
        },
        Err(e) => {
            let e = ServerError::from(e);
            error!("🛍️️ Could not process order {order_id:?}. {e}");
            HttpResponse::Ok().finish()
        },
    }
}

fn webhook_order_id(body: &[u8]) -> Option<i64> {
    if body.iter().all(u8::is_ascii_whitespace) {
        debug!("🛍️️ Webhook call has no body. Using the most recent order.");
        return None;
    }
    match serde_json::from_slice::<OrderWebhookPayload>(body) {
        Ok(payload) => {
            debug!("🛍️️ Webhook call for order {:?} ({:?})", payload.id, payload.name);
            payload.id
        },
        Err(e) => {
            warn!("🛍️️ Could not read the webhook payload. Using the most recent order. {e}");
            None
        },
    }
}

//----------------------------------------------   ERP  ----------------------------------------------------
/// JSON extractor settings for ERP messages. Malformed bodies are answered with a JSON error body, like every other
/// failure.
pub fn erp_json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        warn!("💻️ Rejected a malformed message on {}. {err}", req.path());
        ServerError::CouldNotDeserializePayload(err.to_string()).into()
    })
}

/// Route handler for ERP confirmations.
///
/// The confirmation is queued for the reconciliation task and acknowledged with 202 Accepted. Confirmations are
/// reconciled one at a time, in the order they arrive.
#[post("/erp/confirmation")]
pub async fn erp_confirmation(
    body: web::Json<OrderConfirmation>,
    confirmations: web::Data<EventProducer<ConfirmationReceived>>,
) -> Result<HttpResponse, ServerError> {
    let confirmation = body.into_inner();
    info!("💻️ Received ERP confirmation: {confirmation}");
    let order_number = confirmation.order_number.clone();
    confirmations.publish_event(ConfirmationReceived::new(confirmation)).await?;
    Ok(HttpResponse::Accepted().json(JsonResponse::success(format!("Confirmation for {order_number} accepted."))))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn webhook_payloads() {
        assert_eq!(webhook_order_id(b""), None);
        assert_eq!(webhook_order_id(b"  \n"), None);
        assert_eq!(webhook_order_id(br##"{"id": 450789469, "name": "#1001", "tags": ""}"##), Some(450789469));
        assert_eq!(webhook_order_id(br##"{"name": "#1001"}"##), None);
        assert_eq!(webhook_order_id(b"not json"), None);
    }
}
