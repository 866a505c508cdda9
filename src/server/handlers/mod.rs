pub mod health;
pub mod maps;
pub mod pins;

use axum::{http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::services::ServiceError;

pub(crate) type ApiError = (StatusCode, Json<Value>);

pub(crate) fn map_service_error(err: ServiceError) -> ApiError {
    match err {
        ServiceError::Validation(validation) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": validation.errors })),
        ),
        ServiceError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("{entity} {id} not found") })),
        ),
        other => {
            tracing::error!(error = %other, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal server error" })),
            )
        }
    }
}
