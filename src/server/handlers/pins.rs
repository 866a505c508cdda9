use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Json},
};

use super::{map_service_error, ApiError};
use crate::common::get_handlebars;
use crate::database::entities::pins;
use crate::server::app::AppState;
use crate::services::{PinInput, PinService, ServiceError};

fn service(state: &AppState) -> PinService {
    PinService::new(state.db.clone(), state.geocoder.clone())
}

pub async fn list_pins(
    State(state): State<AppState>,
    Path(map_id): Path<i32>,
) -> Result<Json<Vec<pins::Model>>, ApiError> {
    let pins = service(&state)
        .list_pins(map_id)
        .await
        .map_err(map_service_error)?;
    Ok(Json(pins))
}

pub async fn create_pin(
    State(state): State<AppState>,
    Path(map_id): Path<i32>,
    Json(payload): Json<PinInput>,
) -> Result<Json<pins::Model>, ApiError> {
    let pin = service(&state)
        .create_pin(map_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(Json(pin))
}

pub async fn get_pin(
    State(state): State<AppState>,
    Path(pin_id): Path<i32>,
) -> Result<Json<pins::Model>, ApiError> {
    let pin = service(&state)
        .get_pin(pin_id)
        .await
        .map_err(map_service_error)?;
    Ok(Json(pin))
}

pub async fn update_pin(
    State(state): State<AppState>,
    Path(pin_id): Path<i32>,
    Json(payload): Json<PinInput>,
) -> Result<Json<pins::Model>, ApiError> {
    let pin = service(&state)
        .update_pin(pin_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(Json(pin))
}

pub async fn delete_pin(
    State(state): State<AppState>,
    Path(pin_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    service(&state)
        .delete_pin(pin_id)
        .await
        .map_err(map_service_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn infowindow(
    State(state): State<AppState>,
    Path(pin_id): Path<i32>,
) -> Result<Html<String>, ApiError> {
    let pin = service(&state)
        .get_pin(pin_id)
        .await
        .map_err(map_service_error)?;

    let handlebars = get_handlebars();
    let html = pin
        .infowindow(&handlebars)
        .map_err(|err| map_service_error(ServiceError::Render(err)))?;

    Ok(Html(html))
}
