//! Endpoints of HTTP server.
//!
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartError, rejection::BytesRejection, DefaultBodyLimit, Multipart,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use common::protocol::{ErrorResponse, PredictResponse};

use crate::{meter::METER, nn::InferModel};

/// Model shared by all request handlers.
pub type SharedModel = Arc<dyn InferModel>;

/// Default maximum size of an uploaded image.
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Multipart field holding the image in `/predict_form` requests.
pub const IMAGE_FIELD: &str = "image";

/// Failed request, rendered as `ErrorResponse` JSON.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<crate::Error> for ApiError {
    fn from(err: crate::Error) -> Self {
        let status = match err.is_bad_input() {
            true => StatusCode::UNPROCESSABLE_ENTITY,
            false => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.report(),
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

/// Build the router serving all endpoints.
pub fn router(model: SharedModel, body_limit: usize) -> Router {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/predict", post(predict))
        .route("/predict_form", post(predict_form))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(model))
}

/// Health check endpoint.
pub async fn healthcheck() -> &'static str {
    "healthy"
}

/// Classify the JPEG sent as raw request body.
pub async fn predict(
    Extension(model): Extension<SharedModel>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let body = body?;
    if body.is_empty() {
        return Err(ApiError::bad_request("empty request body"));
    }

    classify(model, body).await
}

/// Classify the JPEG uploaded as `multipart/form-data`.
///
/// The image is taken from the `image` field, or from the first field carrying a file name.
pub async fn predict_form(
    Extension(model): Extension<SharedModel>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) && field.file_name().is_none() {
            log::debug!("Skipping form field {:?}", field.name());
            continue;
        }

        let data = field.bytes().await?;
        if data.is_empty() {
            return Err(ApiError::bad_request("empty image upload"));
        }

        return classify(model, data).await;
    }

    Err(ApiError::bad_request(format!(
        "missing `{IMAGE_FIELD}` field"
    )))
}

async fn classify(model: SharedModel, data: Bytes) -> Result<Json<PredictResponse>, ApiError> {
    log::debug!("Classifying {} bytes", data.len());

    // Inference is CPU bound, keep it off the async workers
    let result = tokio::task::spawn_blocking(move || model.predict_bytes(&data))
        .await
        .map_err(|err| ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("inference task failed: {err}"),
        })?;

    match result {
        Ok(prediction) => {
            METER.tick_classified();
            log::debug!("Prediction: {prediction}");
            Ok(Json(prediction.into()))
        }
        Err(err) => {
            METER.tick_failed();
            let err = ApiError::from(err);
            log::warn!("Classification failed: {}", &err.message);
            Err(err)
        }
    }
}
