pub mod map_service;
pub mod pin_service;

pub use map_service::*;
pub use pin_service::*;

use rust_decimal::Decimal;
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::geocoding::Geocoder;

pub const NOT_A_VALID_ADDRESS: &str = "not a valid address";
pub const FIELD_REQUIRED: &str = "this field is required";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Field-scoped validation errors surfaced to the editor at save time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Provider failure: one "not a valid address" error per address field.
    pub fn invalid_address(&mut self) {
        for field in ["street", "postal_code", "city"] {
            self.push(field, NOT_A_VALID_ADDRESS);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn into_result(self) -> Result<(), ServiceError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(self))
        }
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },
    #[error("validation failed")]
    Validation(ValidationErrors),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Geocode an address and map the outcome onto lat/lng columns.
///
/// A provider failure is collapsed into the user-facing address error while
/// the distinguished cause is logged; a no-match answer is stored as nulls.
pub(crate) async fn resolve_address(
    geocoder: &dyn Geocoder,
    street: Option<&str>,
    postal_code: &str,
    city: &str,
    errors: &mut ValidationErrors,
) -> (Option<Decimal>, Option<Decimal>) {
    match geocoder
        .geocode(street.unwrap_or(""), postal_code, city)
        .await
    {
        Ok(Some(coordinates)) => (Some(coordinates.lat), Some(coordinates.lng)),
        Ok(None) => {
            debug!(postal_code, city, "address did not resolve to coordinates");
            (None, None)
        }
        Err(err) => {
            warn!(error = %err, postal_code, city, "geocoding failed");
            errors.invalid_address();
            (None, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_address_covers_all_address_fields() {
        let mut errors = ValidationErrors::default();
        errors.invalid_address();

        assert_eq!(errors.errors.len(), 3);
        for field in ["street", "postal_code", "city"] {
            assert_eq!(errors.field(field).unwrap().message, NOT_A_VALID_ADDRESS);
        }
    }

    #[test]
    fn empty_errors_convert_to_ok() {
        assert!(ValidationErrors::default().into_result().is_ok());

        let mut errors = ValidationErrors::default();
        errors.push("zoom", "zoom must be between 0 and 21");
        assert!(matches!(
            errors.into_result(),
            Err(ServiceError::Validation(_))
        ));
    }
}
