//! API integration tests
//!
//! Tests for the REST endpoints, backed by a stub geocoder instead of the
//! HERE API.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use multipinmap::database::setup_database;
use multipinmap::geocoding::{Coordinates, GeocodeError, Geocoder};
use multipinmap::server::app::create_app;
use rust_decimal::Decimal;
use sea_orm::Database;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

/// Resolves every address to fixed Berlin coordinates.
struct StaticGeocoder;

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(
        &self,
        _street: &str,
        _postal_code: &str,
        _city: &str,
    ) -> Result<Option<Coordinates>, GeocodeError> {
        Ok(Some(Coordinates {
            lat: Decimal::new(52_520_008, 6),
            lng: Decimal::new(13_404_954, 6),
        }))
    }
}

/// Fails every request, as a provider outage or bad API key would.
struct FailingGeocoder;

#[async_trait]
impl Geocoder for FailingGeocoder {
    async fn geocode(
        &self,
        _street: &str,
        _postal_code: &str,
        _city: &str,
    ) -> Result<Option<Coordinates>, GeocodeError> {
        Err(GeocodeError::Malformed("stub provider failure".to_string()))
    }
}

/// Create a test server with a file-backed database and the given geocoder
async fn setup_test_server(geocoder: Arc<dyn Geocoder>) -> Result<(TestServer, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    let app = create_app(db, geocoder, Some("*")).await?;
    let server = TestServer::new(app)?;

    Ok((server, temp_file))
}

fn map_payload() -> Value {
    json!({
        "street": "Main St 1",
        "postal_code": "10115",
        "city": "Berlin"
    })
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let (server, _temp_file) = setup_test_server(Arc::new(StaticGeocoder)).await?;

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["service"], "multipinmap-server");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_maps_crud_api() -> Result<()> {
    let (server, _temp_file) = setup_test_server(Arc::new(StaticGeocoder)).await?;

    // Create
    let response = server.post("/api/v1/maps").json(&map_payload()).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let map: Value = response.json();
    let map_id = map["id"].as_i64().unwrap();
    assert_eq!(map["style"], "leaflet");
    assert_eq!(map["zoom"], 8);
    assert_eq!(map["height"], 400);
    assert_eq!(map["lat"], "52.520008");
    assert_eq!(map["lng"], "13.404954");

    // List
    let response = server.get("/api/v1/maps").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let maps: Vec<Value> = response.json();
    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0]["id"], map_id);

    // Get single
    let response = server.get(&format!("/api/v1/maps/{}", map_id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let fetched: Value = response.json();
    assert_eq!(fetched["city"], "Berlin");

    // Update
    let update_payload = json!({
        "style": "google",
        "zoom": 12,
        "street": "Main St 1",
        "postal_code": "20095",
        "city": "Hamburg"
    });
    let response = server
        .put(&format!("/api/v1/maps/{}", map_id))
        .json(&update_payload)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["style"], "google");
    assert_eq!(updated["zoom"], 12);
    assert_eq!(updated["city"], "Hamburg");

    // Delete
    let response = server.delete(&format!("/api/v1/maps/{}", map_id)).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = server.get(&format!("/api/v1/maps/{}", map_id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_mapbox_style_validation() -> Result<()> {
    let (server, _temp_file) = setup_test_server(Arc::new(StaticGeocoder)).await?;

    let payload = json!({
        "style": "mapbox",
        "postal_code": "10115",
        "city": "Berlin"
    });

    let response = server.post("/api/v1/maps").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"mapbox_access_token"));
    assert!(fields.contains(&"mapbox_map_id"));

    Ok(())
}

#[tokio::test]
async fn test_provider_failure_rejects_save() -> Result<()> {
    let (server, _temp_file) = setup_test_server(Arc::new(FailingGeocoder)).await?;

    let response = server.post("/api/v1/maps").json(&map_payload()).await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["street", "postal_code", "city"]);
    for error in body["errors"].as_array().unwrap() {
        assert_eq!(error["message"], "not a valid address");
    }

    Ok(())
}

#[tokio::test]
async fn test_pins_api_and_infowindow() -> Result<()> {
    let (server, _temp_file) = setup_test_server(Arc::new(StaticGeocoder)).await?;

    let response = server.post("/api/v1/maps").json(&map_payload()).await;
    let map: Value = response.json();
    let map_id = map["id"].as_i64().unwrap();

    // Create a pin under the map
    let pin_payload = json!({
        "name": "Office",
        "street": "Main St 1",
        "postal_code": "10115",
        "city": "Berlin",
        "link": "https://example.com",
        "link_title": "Visit",
        "description": "HQ",
        "pin_color": "blue"
    });
    let response = server
        .post(&format!("/api/v1/maps/{}/pins", map_id))
        .json(&pin_payload)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let pin: Value = response.json();
    let pin_id = pin["id"].as_i64().unwrap();
    assert_eq!(pin["map_id"], map_id);
    assert_eq!(pin["pin_color"], "blue");
    assert_eq!(pin["lat"], "52.520008");

    // List pins
    let response = server.get(&format!("/api/v1/maps/{}/pins", map_id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let pins: Vec<Value> = response.json();
    assert_eq!(pins.len(), 1);

    // Pins of an unknown map are a 404, not an empty list
    let response = server.get("/api/v1/maps/4242/pins").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // Info window fragment
    let response = server
        .get(&format!("/api/v1/pins/{}/infowindow", pin_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains("Office"));
    assert!(html.contains("Main St 1"));
    assert!(html.contains("10115"));
    assert!(html.contains("Berlin"));
    assert!(html.contains(r#"<a href="https://example.com">Visit</a>"#));
    assert!(html.contains("HQ"));
    assert!(!html.contains('\n'));

    // Deleting the map cascades to its pins
    let response = server.delete(&format!("/api/v1/maps/{}", map_id)).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = server.get(&format!("/api/v1/pins/{}", pin_id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_copy_and_render_api() -> Result<()> {
    let (server, _temp_file) = setup_test_server(Arc::new(StaticGeocoder)).await?;

    let response = server.post("/api/v1/maps").json(&map_payload()).await;
    let map: Value = response.json();
    let map_id = map["id"].as_i64().unwrap();

    for name in ["Office", "Warehouse"] {
        let response = server
            .post(&format!("/api/v1/maps/{}/pins", map_id))
            .json(&json!({
                "name": name,
                "postal_code": "10115",
                "city": "Berlin"
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    // Copy the map; the copy owns its own pin set
    let response = server.post(&format!("/api/v1/maps/{}/copy", map_id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let copy: Value = response.json();
    let copy_id = copy["id"].as_i64().unwrap();
    assert_ne!(copy_id, map_id);

    let response = server.get(&format!("/api/v1/maps/{}/pins", copy_id)).await;
    let copied_pins: Vec<Value> = response.json();
    assert_eq!(copied_pins.len(), 2);

    let response = server.get(&format!("/api/v1/maps/{}/pins", map_id)).await;
    let source_pins: Vec<Value> = response.json();
    assert_eq!(source_pins.len(), 2);

    // Render the embeddable fragment
    let response = server.get(&format!("/api/v1/maps/{}/render", map_id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains(r#"data-style="leaflet""#));
    assert!(html.contains("multipinmap-pins"));
    assert!(html.contains("Office"));
    assert!(html.contains("Warehouse"));

    Ok(())
}
