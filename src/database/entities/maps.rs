use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_HEIGHT: i32 = 400;
pub const DEFAULT_ZOOM: i32 = 8;
pub const MAX_ZOOM: i32 = 21;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub style: String,
    pub leaflet_tile_url: String,
    pub height: i32,
    pub zoom: i32,
    pub mapbox_access_token: Option<String>,
    pub mapbox_map_id: Option<String>,
    /// Center address; lat/lng are derived from it on validation.
    pub street: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub lat: Option<Decimal>,
    pub lng: Option<Decimal>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pins::Entity")]
    Pins,
}

impl Related<super::pins::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pins.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Rendering style of a map instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapStyle {
    Google,
    Leaflet,
    Mapbox,
}

impl MapStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapStyle::Google => "google",
            MapStyle::Leaflet => "leaflet",
            MapStyle::Mapbox => "mapbox",
        }
    }
}

impl FromStr for MapStyle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(MapStyle::Google),
            "leaflet" => Ok(MapStyle::Leaflet),
            "mapbox" => Ok(MapStyle::Mapbox),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_round_trips_through_strings() {
        for style in [MapStyle::Google, MapStyle::Leaflet, MapStyle::Mapbox] {
            assert_eq!(style.as_str().parse::<MapStyle>(), Ok(style));
        }
        assert!("openlayers".parse::<MapStyle>().is_err());
    }
}
