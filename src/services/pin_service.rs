use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};

use crate::database::entities::{maps, pins, pins::PinColor};
use crate::geocoding::Geocoder;
use crate::services::{resolve_address, ServiceError, ValidationErrors, FIELD_REQUIRED};

/// Editor-supplied fields of a pin. Coordinates are derived on validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PinInput {
    pub name: String,
    pub street: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub link: Option<String>,
    pub link_title: Option<String>,
    pub description: Option<String>,
    pub pin_color: Option<String>,
}

struct ValidatedPin {
    name: String,
    street: Option<String>,
    postal_code: String,
    city: String,
    link: Option<String>,
    link_title: Option<String>,
    description: Option<String>,
    pin_color: PinColor,
    lat: Option<Decimal>,
    lng: Option<Decimal>,
}

#[derive(Clone)]
pub struct PinService {
    db: DatabaseConnection,
    geocoder: Arc<dyn Geocoder>,
}

impl PinService {
    pub fn new(db: DatabaseConnection, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { db, geocoder }
    }

    pub async fn list_pins(&self, map_id: i32) -> Result<Vec<pins::Model>, ServiceError> {
        self.ensure_map_exists(map_id).await?;

        Ok(pins::Entity::find()
            .filter(pins::Column::MapId.eq(map_id))
            .all(&self.db)
            .await?)
    }

    pub async fn get_pin(&self, id: i32) -> Result<pins::Model, ServiceError> {
        pins::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound { entity: "pin", id })
    }

    /// A pin only exists within a map; creating one against an unknown map is
    /// a not-found error, not a validation error.
    pub async fn create_pin(
        &self,
        map_id: i32,
        input: PinInput,
    ) -> Result<pins::Model, ServiceError> {
        self.ensure_map_exists(map_id).await?;
        let validated = self.validate(input).await?;
        let now = Utc::now();

        let pin = pins::ActiveModel {
            map_id: Set(map_id),
            name: Set(validated.name),
            street: Set(validated.street),
            postal_code: Set(validated.postal_code),
            city: Set(validated.city),
            link: Set(validated.link),
            link_title: Set(validated.link_title),
            description: Set(validated.description),
            pin_color: Set(validated.pin_color.to_string()),
            lat: Set(validated.lat),
            lng: Set(validated.lng),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(pin.insert(&self.db).await?)
    }

    /// Re-validates and overwrites every editor-supplied field; the owning
    /// map never changes.
    pub async fn update_pin(&self, id: i32, input: PinInput) -> Result<pins::Model, ServiceError> {
        let existing = self.get_pin(id).await?;
        let validated = self.validate(input).await?;

        let mut pin: pins::ActiveModel = existing.into();
        pin.name = Set(validated.name);
        pin.street = Set(validated.street);
        pin.postal_code = Set(validated.postal_code);
        pin.city = Set(validated.city);
        pin.link = Set(validated.link);
        pin.link_title = Set(validated.link_title);
        pin.description = Set(validated.description);
        pin.pin_color = Set(validated.pin_color.to_string());
        pin.lat = Set(validated.lat);
        pin.lng = Set(validated.lng);
        pin.updated_at = Set(Utc::now());

        Ok(pin.update(&self.db).await?)
    }

    pub async fn delete_pin(&self, id: i32) -> Result<(), ServiceError> {
        let pin = self.get_pin(id).await?;
        pins::Entity::delete_by_id(pin.id).exec(&self.db).await?;
        Ok(())
    }

    async fn ensure_map_exists(&self, map_id: i32) -> Result<(), ServiceError> {
        maps::Entity::find_by_id(map_id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "map",
                id: map_id,
            })?;
        Ok(())
    }

    async fn validate(&self, input: PinInput) -> Result<ValidatedPin, ServiceError> {
        let mut errors = ValidationErrors::default();

        if input.name.trim().is_empty() {
            errors.push("name", FIELD_REQUIRED);
        }
        if input.postal_code.is_empty() {
            errors.push("postal_code", FIELD_REQUIRED);
        }
        if input.city.is_empty() {
            errors.push("city", FIELD_REQUIRED);
        }

        let color_value = input.pin_color.unwrap_or_else(|| PinColor::Red.to_string());
        let pin_color = match PinColor::from_str(&color_value) {
            Ok(color) => color,
            Err(()) => {
                errors.push("pin_color", format!("unknown pin color: {color_value}"));
                PinColor::Red
            }
        };

        let (lat, lng) = resolve_address(
            self.geocoder.as_ref(),
            input.street.as_deref(),
            &input.postal_code,
            &input.city,
            &mut errors,
        )
        .await;

        errors.into_result()?;

        Ok(ValidatedPin {
            name: input.name,
            street: input.street,
            postal_code: input.postal_code,
            city: input.city,
            link: input.link,
            link_title: input.link_title,
            description: input.description,
            pin_color,
            lat,
            lng,
        })
    }
}
