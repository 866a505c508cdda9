use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Json},
};

use super::{map_service_error, ApiError};
use crate::database::entities::maps;
use crate::plugin::{ContentPlugin, MapPlugin};
use crate::server::app::AppState;
use crate::services::{MapInput, MapService};

fn service(state: &AppState) -> MapService {
    MapService::new(state.db.clone(), state.geocoder.clone())
}

fn plugin(state: &AppState) -> MapPlugin {
    MapPlugin::new(state.db.clone(), state.geocoder.clone())
}

pub async fn list_maps(
    State(state): State<AppState>,
) -> Result<Json<Vec<maps::Model>>, ApiError> {
    let maps = service(&state).list_maps().await.map_err(map_service_error)?;
    Ok(Json(maps))
}

pub async fn create_map(
    State(state): State<AppState>,
    Json(payload): Json<MapInput>,
) -> Result<Json<maps::Model>, ApiError> {
    let map = service(&state)
        .create_map(payload)
        .await
        .map_err(map_service_error)?;
    Ok(Json(map))
}

pub async fn get_map(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<maps::Model>, ApiError> {
    let map = service(&state).get_map(id).await.map_err(map_service_error)?;
    Ok(Json(map))
}

pub async fn update_map(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<MapInput>,
) -> Result<Json<maps::Model>, ApiError> {
    let map = service(&state)
        .update_map(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(Json(map))
}

pub async fn delete_map(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    service(&state)
        .delete_map(id)
        .await
        .map_err(map_service_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Duplicate a map with all of its pins, as the hosting system does when a
/// plugin instance is copied to another page.
pub async fn copy_map(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<maps::Model>, ApiError> {
    let copy = service(&state)
        .copy_map(id)
        .await
        .map_err(map_service_error)?;
    Ok(Json(copy))
}

pub async fn render_map(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, ApiError> {
    let fragment = plugin(&state)
        .render(id)
        .await
        .map_err(map_service_error)?;
    Ok(Html(fragment))
}
