use serde::{Deserialize, Serialize};

fn default_port() -> u16 {
    3000
}

fn default_database() -> String {
    "multipinmap.db".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            database: default_database(),
            cors_origin: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// HERE API key; the HERE_API_KEY environment variable takes precedence.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Alternative endpoint, e.g. a local stub during development.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl AppConfig {
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = AppConfig::from_yaml("{}").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.database, "multipinmap.db");
        assert!(config.server.cors_origin.is_none());
        assert!(config.geocoder.api_key.is_none());
    }

    #[test]
    fn full_config_deserializes() {
        let yaml = r#"
server:
  port: 8080
  database: maps.db
  cors_origin: "https://cms.example.com"
geocoder:
  api_key: "test-key"
  endpoint: "http://localhost:9000/geocode"
"#;

        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.database, "maps.db");
        assert_eq!(
            config.server.cors_origin.as_deref(),
            Some("https://cms.example.com")
        );
        assert_eq!(config.geocoder.api_key.as_deref(), Some("test-key"));
        assert_eq!(
            config.geocoder.endpoint.as_deref(),
            Some("http://localhost:9000/geocode")
        );
    }
}
