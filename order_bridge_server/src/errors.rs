use actix_web::{
    error::ResponseError,
    http::StatusCode,
    HttpResponse,
};
use order_bridge_engine::{events::PublishError, TranslationError};
use shopify_tools::ShopifyApiError;
use thiserror::Error;

use crate::data_objects::JsonResponse;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Payload deserialization error. {0}")]
    CouldNotDeserializePayload(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Could not initialize the Shopify client. {0}")]
    ShopifyClientError(#[from] ShopifyApiError),
    #[error("Order translation failed. {0}")]
    TranslationError(#[from] TranslationError),
    #[error("The confirmation could not be queued for reconciliation. {0}")]
    ReconciliationUnavailable(#[from] PublishError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload(_) => StatusCode::BAD_REQUEST,
            Self::ReconciliationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::IOError(_) |
            Self::ShopifyClientError(_) |
            Self::TranslationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(JsonResponse::failure(self))
    }
}
