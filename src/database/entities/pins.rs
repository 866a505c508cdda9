use handlebars::Handlebars;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{fmt, str::FromStr};

/// Template behind the info window shown when a pin is clicked. The rendered
/// fragment is embedded in a JS string literal, so newlines are stripped.
const INFOWINDOW_TEMPLATE: &str = r#"<div class="infowindow">
<strong>{{name}}</strong><br/>
{{#if street}}{{street}}<br/>{{/if}}
{{postal_code}} {{city}}
{{#if link}}<br/><a href="{{link}}">{{#if link_title}}{{link_title}}{{else}}{{link}}{{/if}}</a>{{/if}}
{{#if description}}<p>{{description}}</p>{{/if}}
</div>"#;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub map_id: i32,
    pub name: String,
    pub street: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub link: Option<String>,
    pub link_title: Option<String>,
    pub description: Option<String>,
    pub pin_color: String,
    pub lat: Option<Decimal>,
    pub lng: Option<Decimal>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::maps::Entity",
        from = "Column::MapId",
        to = "super::maps::Column::Id"
    )]
    Maps,
}

impl Related<super::maps::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Maps.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Render the pin's info window to a single-line HTML fragment.
    pub fn infowindow(&self, handlebars: &Handlebars) -> Result<String, handlebars::RenderError> {
        let context = json!({
            "name": self.name,
            "street": self.street,
            "postal_code": self.postal_code,
            "city": self.city,
            "link": self.link,
            "link_title": self.link_title,
            "description": self.description,
        });

        let html = handlebars.render_template(INFOWINDOW_TEMPLATE, &context)?;
        Ok(html.replace('\n', ""))
    }
}

/// Marker color of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl PinColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            PinColor::Red => "red",
            PinColor::Blue => "blue",
            PinColor::Green => "green",
            PinColor::Yellow => "yellow",
        }
    }
}

impl FromStr for PinColor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red" => Ok(PinColor::Red),
            "blue" => Ok(PinColor::Blue),
            "green" => Ok(PinColor::Green),
            "yellow" => Ok(PinColor::Yellow),
            _ => Err(()),
        }
    }
}

impl fmt::Display for PinColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::get_handlebars;
    use chrono::Utc;

    fn pin() -> Model {
        let now = Utc::now();
        Model {
            id: 1,
            map_id: 1,
            name: "Office".to_string(),
            street: Some("Main St 1".to_string()),
            postal_code: "10115".to_string(),
            city: "Berlin".to_string(),
            link: Some("https://example.com".to_string()),
            link_title: Some("Visit".to_string()),
            description: Some("HQ".to_string()),
            pin_color: "red".to_string(),
            lat: None,
            lng: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn infowindow_contains_all_fields_without_newlines() {
        let handlebars = get_handlebars();
        let html = pin().infowindow(&handlebars).expect("template renders");

        assert!(html.contains("Office"));
        assert!(html.contains("Main St 1"));
        assert!(html.contains("10115"));
        assert!(html.contains("Berlin"));
        assert!(html.contains(r#"<a href="https://example.com">Visit</a>"#));
        assert!(html.contains("<p>HQ</p>"));
        assert!(!html.contains('\n'));
    }

    #[test]
    fn infowindow_skips_absent_optional_fields() {
        let mut sparse = pin();
        sparse.street = None;
        sparse.link = None;
        sparse.link_title = None;
        sparse.description = None;

        let handlebars = get_handlebars();
        let html = sparse.infowindow(&handlebars).expect("template renders");

        assert!(html.contains("Office"));
        assert!(!html.contains("<a href"));
        assert!(!html.contains("<p>"));
    }

    #[test]
    fn infowindow_falls_back_to_link_as_label() {
        let mut untitled = pin();
        untitled.link_title = None;

        let handlebars = get_handlebars();
        let html = untitled.infowindow(&handlebars).expect("template renders");

        assert!(html.contains(r#"<a href="https://example.com">https://example.com</a>"#));
    }

    #[test]
    fn color_round_trips_through_strings() {
        for color in [PinColor::Red, PinColor::Blue, PinColor::Green, PinColor::Yellow] {
            assert_eq!(color.as_str().parse::<PinColor>(), Ok(color));
        }
        assert!("purple".parse::<PinColor>().is_err());
    }
}
