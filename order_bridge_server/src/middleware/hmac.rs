//! Webhook signature checks for Actix Web.
//!
//! Shopify signs every webhook call with the app's API secret (`OBG_INTAKE_SHOPIFY_API_SECRET`). The signature is the
//! base64-encoded HMAC-SHA256 of the raw request body and arrives in the `X-Shopify-Hmac-Sha256` header.
//!
//! Wrap the `/shopify` scope with [`HmacMiddlewareFactory`] to reject any call whose signature does not match. The body
//! is buffered to compute the signature and then handed on to the route unchanged.
use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorBadRequest, ErrorForbidden},
    http::header::HeaderMap,
    web::Bytes,
    Error,
};
use futures::future::LocalBoxFuture;
use log::*;
use obg_common::Secret;

use crate::helpers::calculate_hmac;

pub const SHOPIFY_HMAC_HEADER: &str = "X-Shopify-Hmac-Sha256";

/// The header to read the signature from and the secret to check it against.
#[derive(Clone)]
struct SignatureCheck {
    header: String,
    secret: Secret<String>,
    // If false, every call is let through unchecked
    enabled: bool,
}

impl SignatureCheck {
    fn verify(&self, path: &str, headers: &HeaderMap, body: &[u8]) -> Result<(), Error> {
        let signature = headers.get(self.header.as_str()).and_then(|v| v.to_str().ok()).map(str::trim).ok_or_else(|| {
            warn!("🔐️ {path} was called without a {} header. Denying access.", self.header);
            ErrorForbidden("No HMAC signature found.")
        })?;
        if signature != calculate_hmac(self.secret.reveal(), body) {
            warn!("🔐️ {path} was called with an invalid HMAC signature. Denying access.");
            return Err(ErrorForbidden("Invalid HMAC signature."));
        }
        trace!("🔐️ HMAC signature for {path} is valid ✅️");
        Ok(())
    }
}

pub struct HmacMiddlewareFactory {
    check: SignatureCheck,
}

impl HmacMiddlewareFactory {
    pub fn new(header: &str, secret: Secret<String>, enabled: bool) -> Self {
        Self { check: SignatureCheck { header: header.to_string(), secret, enabled } }
    }

    pub fn shopify(secret: Secret<String>, enabled: bool) -> Self {
        Self::new(SHOPIFY_HMAC_HEADER, secret, enabled)
    }
}

impl<S, B> Transform<S, ServiceRequest> for HmacMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = HmacMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HmacMiddlewareService { check: Rc::new(self.check.clone()), inner: Rc::new(service) }))
    }
}

pub struct HmacMiddlewareService<S> {
    check: Rc<SignatureCheck>,
    inner: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for HmacMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(inner);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let inner = Rc::clone(&self.inner);
        let check = Rc::clone(&self.check);
        Box::pin(async move {
            if !check.enabled {
                trace!("🔐️ HMAC checks are disabled. Letting {} through.", req.path());
                return inner.call(req).await;
            }
            let body = req.extract::<Bytes>().await.map_err(|e| {
                warn!("🔐️ Could not read the body of {}. {e}", req.path());
                ErrorBadRequest("Could not read the request body.")
            })?;
            check.verify(req.path(), req.headers(), &body)?;
            // The extractor drained the payload, so put the body back for the route handler
            req.set_payload(replay(body));
            inner.call(req).await
        })
    }
}

fn replay(body: Bytes) -> Payload {
    let (_, mut payload) = h1::Payload::create(true);
    payload.unread_data(body);
    Payload::from(payload)
}
