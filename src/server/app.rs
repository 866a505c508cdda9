use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use super::handlers::{health, maps, pins};
use crate::geocoding::Geocoder;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub geocoder: Arc<dyn Geocoder>,
}

pub async fn create_app(
    db: DatabaseConnection,
    geocoder: Arc<dyn Geocoder>,
    cors_origin: Option<&str>,
) -> Result<Router> {
    let state = AppState { db, geocoder };

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<axum::http::HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        // Health check endpoint
        .route("/health", get(health::health_check))
        // API v1 routes
        .nest("/api/v1", api_v1_routes())
        // Add middleware
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Map routes
        .route("/maps", get(maps::list_maps))
        .route("/maps", post(maps::create_map))
        .route("/maps/:id", get(maps::get_map))
        .route("/maps/:id", put(maps::update_map))
        .route("/maps/:id", delete(maps::delete_map))
        .route("/maps/:id/copy", post(maps::copy_map))
        .route("/maps/:id/render", get(maps::render_map))
        // Pin routes
        .route("/maps/:id/pins", get(pins::list_pins))
        .route("/maps/:id/pins", post(pins::create_pin))
        .route("/pins/:pin_id", get(pins::get_pin))
        .route("/pins/:pin_id", put(pins::update_pin))
        .route("/pins/:pin_id", delete(pins::delete_pin))
        .route("/pins/:pin_id/infowindow", get(pins::infowindow))
}
