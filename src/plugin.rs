use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::common::get_handlebars;
use crate::geocoding::Geocoder;
use crate::services::{MapService, PinService, ServiceError};

/// Embeddable fragment for one map instance. Pin data rides along as a JSON
/// payload the frontend script reads to place markers and info windows.
const MAP_TEMPLATE: &str = r#"<div class="multipinmap multipinmap-{{style}}" data-style="{{style}}" data-tile-url="{{leaflet_tile_url}}" data-zoom="{{zoom}}"{{#if (exists lat)}} data-lat="{{lat}}" data-lng="{{lng}}"{{/if}} style="height: {{height}}px">
<script type="application/json" class="multipinmap-pins">{{{pins_json}}}</script>
</div>"#;

/// Capabilities the hosting system invokes on any content-plugin variant.
#[async_trait]
pub trait ContentPlugin: Send + Sync {
    /// Identifier the plugin is registered under.
    fn kind(&self) -> &'static str;

    /// Render an instance to an embeddable HTML fragment.
    async fn render(&self, instance_id: i32) -> Result<String, ServiceError>;

    /// Duplicate an instance together with its child records, returning the
    /// id of the copy.
    async fn copy_relations(&self, source_id: i32) -> Result<i32, ServiceError>;
}

pub struct MapPlugin {
    maps: MapService,
    pins: PinService,
}

impl MapPlugin {
    pub fn new(db: DatabaseConnection, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            maps: MapService::new(db.clone(), geocoder.clone()),
            pins: PinService::new(db, geocoder),
        }
    }
}

#[async_trait]
impl ContentPlugin for MapPlugin {
    fn kind(&self) -> &'static str {
        "multipinmap"
    }

    async fn render(&self, instance_id: i32) -> Result<String, ServiceError> {
        let map = self.maps.get_map(instance_id).await?;
        let map_pins = self.pins.list_pins(instance_id).await?;

        let handlebars = get_handlebars();

        let mut payload = Vec::with_capacity(map_pins.len());
        for pin in &map_pins {
            payload.push(json!({
                "name": pin.name,
                "lat": pin.lat,
                "lng": pin.lng,
                "color": pin.pin_color,
                "infowindow": pin.infowindow(&handlebars)?,
            }));
        }

        let context = json!({
            "style": map.style,
            "leaflet_tile_url": map.leaflet_tile_url,
            "zoom": map.zoom,
            "height": map.height,
            "lat": map.lat,
            "lng": map.lng,
            "pins_json": serde_json::to_string(&payload)?,
        });

        Ok(handlebars.render_template(MAP_TEMPLATE, &context)?)
    }

    async fn copy_relations(&self, source_id: i32) -> Result<i32, ServiceError> {
        let copy = self.maps.copy_map(source_id).await?;
        Ok(copy.id)
    }
}
