use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::entities::{maps, maps::MapStyle, pins};
use crate::geocoding::Geocoder;
use crate::services::{resolve_address, ServiceError, ValidationErrors, FIELD_REQUIRED};

/// Editor-supplied fields of a map instance. Coordinates are derived, never
/// accepted from the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapInput {
    pub style: Option<String>,
    pub leaflet_tile_url: Option<String>,
    pub height: Option<i32>,
    pub zoom: Option<i32>,
    pub mapbox_access_token: Option<String>,
    pub mapbox_map_id: Option<String>,
    pub street: Option<String>,
    pub postal_code: String,
    pub city: String,
}

struct ValidatedMap {
    style: MapStyle,
    leaflet_tile_url: String,
    height: i32,
    zoom: i32,
    mapbox_access_token: Option<String>,
    mapbox_map_id: Option<String>,
    street: Option<String>,
    postal_code: String,
    city: String,
    lat: Option<Decimal>,
    lng: Option<Decimal>,
}

#[derive(Clone)]
pub struct MapService {
    db: DatabaseConnection,
    geocoder: Arc<dyn Geocoder>,
}

impl MapService {
    pub fn new(db: DatabaseConnection, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { db, geocoder }
    }

    pub async fn list_maps(&self) -> Result<Vec<maps::Model>, ServiceError> {
        Ok(maps::Entity::find().all(&self.db).await?)
    }

    pub async fn get_map(&self, id: i32) -> Result<maps::Model, ServiceError> {
        maps::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound { entity: "map", id })
    }

    pub async fn create_map(&self, input: MapInput) -> Result<maps::Model, ServiceError> {
        let validated = self.validate(input).await?;
        let now = Utc::now();

        let map = maps::ActiveModel {
            style: Set(validated.style.to_string()),
            leaflet_tile_url: Set(validated.leaflet_tile_url),
            height: Set(validated.height),
            zoom: Set(validated.zoom),
            mapbox_access_token: Set(validated.mapbox_access_token),
            mapbox_map_id: Set(validated.mapbox_map_id),
            street: Set(validated.street),
            postal_code: Set(validated.postal_code),
            city: Set(validated.city),
            lat: Set(validated.lat),
            lng: Set(validated.lng),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(map.insert(&self.db).await?)
    }

    pub async fn update_map(&self, id: i32, input: MapInput) -> Result<maps::Model, ServiceError> {
        let existing = self.get_map(id).await?;
        let validated = self.validate(input).await?;

        let mut map: maps::ActiveModel = existing.into();
        map.style = Set(validated.style.to_string());
        map.leaflet_tile_url = Set(validated.leaflet_tile_url);
        map.height = Set(validated.height);
        map.zoom = Set(validated.zoom);
        map.mapbox_access_token = Set(validated.mapbox_access_token);
        map.mapbox_map_id = Set(validated.mapbox_map_id);
        map.street = Set(validated.street);
        map.postal_code = Set(validated.postal_code);
        map.city = Set(validated.city);
        map.lat = Set(validated.lat);
        map.lng = Set(validated.lng);
        map.updated_at = Set(Utc::now());

        Ok(map.update(&self.db).await?)
    }

    /// Deletes the map; its pins go with it through the cascading foreign key.
    pub async fn delete_map(&self, id: i32) -> Result<(), ServiceError> {
        let map = self.get_map(id).await?;
        maps::Entity::delete_by_id(map.id).exec(&self.db).await?;
        Ok(())
    }

    /// Duplicate a map instance together with all of its pins.
    ///
    /// Runs in a single transaction: either the copy owns the full pin set or
    /// nothing is persisted. The source map and its pins are never modified.
    pub async fn copy_map(&self, source_id: i32) -> Result<maps::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let source = maps::Entity::find_by_id(source_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "map",
                id: source_id,
            })?;

        let now = Utc::now();
        let copy = maps::ActiveModel {
            style: Set(source.style.clone()),
            leaflet_tile_url: Set(source.leaflet_tile_url.clone()),
            height: Set(source.height),
            zoom: Set(source.zoom),
            mapbox_access_token: Set(source.mapbox_access_token.clone()),
            mapbox_map_id: Set(source.mapbox_map_id.clone()),
            street: Set(source.street.clone()),
            postal_code: Set(source.postal_code.clone()),
            city: Set(source.city.clone()),
            lat: Set(source.lat),
            lng: Set(source.lng),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let copy = copy.insert(&txn).await?;

        let source_pins = pins::Entity::find()
            .filter(pins::Column::MapId.eq(source_id))
            .all(&txn)
            .await?;
        let pin_count = source_pins.len();

        for pin in source_pins {
            let pin_copy = pins::ActiveModel {
                map_id: Set(copy.id),
                name: Set(pin.name),
                street: Set(pin.street),
                postal_code: Set(pin.postal_code),
                city: Set(pin.city),
                link: Set(pin.link),
                link_title: Set(pin.link_title),
                description: Set(pin.description),
                pin_color: Set(pin.pin_color),
                lat: Set(pin.lat),
                lng: Set(pin.lng),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            pin_copy.insert(&txn).await?;
        }

        txn.commit().await?;

        info!(source_id, copy_id = copy.id, pin_count, "copied map with pins");

        Ok(copy)
    }

    async fn validate(&self, input: MapInput) -> Result<ValidatedMap, ServiceError> {
        let mut errors = ValidationErrors::default();

        let style_value = input.style.unwrap_or_else(|| MapStyle::Leaflet.to_string());
        let style = match MapStyle::from_str(&style_value) {
            Ok(style) => style,
            Err(()) => {
                errors.push("style", format!("unknown style: {style_value}"));
                MapStyle::Leaflet
            }
        };

        if style == MapStyle::Mapbox {
            if input.mapbox_access_token.as_deref().unwrap_or("").is_empty() {
                errors.push("mapbox_access_token", "mapbox access token is required");
            }
            if input.mapbox_map_id.as_deref().unwrap_or("").is_empty() {
                errors.push("mapbox_map_id", "mapbox map id is required");
            }
        }

        let zoom = input.zoom.unwrap_or(maps::DEFAULT_ZOOM);
        if !(0..=maps::MAX_ZOOM).contains(&zoom) {
            errors.push(
                "zoom",
                format!("zoom must be between 0 and {}", maps::MAX_ZOOM),
            );
        }

        if input.postal_code.is_empty() {
            errors.push("postal_code", FIELD_REQUIRED);
        }
        if input.city.is_empty() {
            errors.push("city", FIELD_REQUIRED);
        }

        let (lat, lng) = resolve_address(
            self.geocoder.as_ref(),
            input.street.as_deref(),
            &input.postal_code,
            &input.city,
            &mut errors,
        )
        .await;

        errors.into_result()?;

        Ok(ValidatedMap {
            style,
            leaflet_tile_url: input
                .leaflet_tile_url
                .unwrap_or_else(|| maps::DEFAULT_TILE_URL.to_string()),
            height: input.height.unwrap_or(maps::DEFAULT_HEIGHT),
            zoom,
            mapbox_access_token: input.mapbox_access_token,
            mapbox_map_id: input.mapbox_map_id,
            street: input.street,
            postal_code: input.postal_code,
            city: input.city,
            lat,
            lng,
        })
    }
}
