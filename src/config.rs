//! Configuration file (TOML).
//!
//! ```toml
//! [endpoints]
//! overpass = "https://overpass-api.de/api/interpreter"
//! nominatim = "https://nominatim.openstreetmap.org/lookup"
//!
//! [http]
//! timeout_ms = 180000
//!
//! [search]
//! max_box_width = 1.0
//! max_box_height = 1.0
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::Error;
use crate::transport::HttpSettings;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EndpointsConfig {
    /// Overpass interpreter URL
    pub overpass: String,
    /// Nominatim lookup URL
    pub nominatim: String,
    /// Boundary file answering relation queries offline instead of Overpass
    #[serde(default)]
    pub boundaries: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Largest tile width in degrees of longitude
    pub max_box_width: f64,
    /// Largest tile height in degrees of latitude
    pub max_box_height: f64,
    /// Preferred language for names ("accept-language")
    pub language: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_box_width: 1.0,
            max_box_height: 1.0,
            language: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        for (name, endpoint) in [
            ("overpass", &self.endpoints.overpass),
            ("nominatim", &self.endpoints.nominatim),
        ] {
            Url::parse(endpoint)
                .map_err(|e| Error::Config(format!("invalid {} endpoint '{}': {}", name, endpoint, e)))?;
        }

        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.search.max_box_width) || !positive(self.search.max_box_height) {
            return Err(Error::Config(
                "max_box_width and max_box_height must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_minimal_config_uses_defaults() {
        let file = write_config(
            r#"
            [endpoints]
            overpass = "https://overpass-api.de/api/interpreter"
            nominatim = "https://nominatim.openstreetmap.org/lookup"
            "#,
        );

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.http.timeout_ms, 180_000);
        assert!(!config.http.verify_tls);
        assert_eq!(config.search.max_box_width, 1.0);
        assert_eq!(config.search.language, None);
        assert_eq!(config.server.listen, "0.0.0.0:3000");
        assert!(config.endpoints.boundaries.is_none());
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
            [endpoints]
            overpass = "http://localhost:12345/api/interpreter"
            nominatim = "http://localhost:8080/lookup"
            boundaries = "/var/lib/locus/boundaries.json"

            [http]
            timeout_ms = 5000
            verify_tls = true

            [search]
            max_box_width = 0.5
            max_box_height = 0.25
            language = "de"

            [server]
            listen = "127.0.0.1:8000"
            "#,
        );

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.http.timeout_ms, 5000);
        assert!(config.http.verify_tls);
        assert_eq!(config.search.max_box_height, 0.25);
        assert_eq!(config.search.language.as_deref(), Some("de"));
        assert_eq!(config.server.listen, "127.0.0.1:8000");
        assert_eq!(
            config.endpoints.boundaries,
            Some(PathBuf::from("/var/lib/locus/boundaries.json"))
        );
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let file = write_config(
            r#"
            [endpoints]
            overpass = "not a url"
            nominatim = "https://nominatim.openstreetmap.org/lookup"
            "#,
        );

        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(
            matches!(err.downcast_ref::<Error>(), Some(Error::Config(msg)) if msg.contains("overpass")),
            "{}",
            err
        );
    }

    #[test]
    fn test_rejects_non_positive_box() {
        let file = write_config(
            r#"
            [endpoints]
            overpass = "https://overpass-api.de/api/interpreter"
            nominatim = "https://nominatim.openstreetmap.org/lookup"

            [search]
            max_box_width = 0.0
            "#,
        );

        assert!(Config::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_endpoints_fails() {
        let file = write_config("[search]\nmax_box_width = 2.0\n");
        assert!(Config::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(Config::load_from_file("/nonexistent/locus.toml").is_err());
    }
}
