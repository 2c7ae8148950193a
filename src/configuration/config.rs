use super::types::*;
use crate::clock::DayBoundary;
use crate::error_handling::types::ConfigError;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

/// Application configuration structure that defines all runtime parameters.
///
/// Loaded from a TOML file where every section and field is optional, then
/// adjusted by command-line flags through [`Overrides`].
///
/// ```toml
/// [storage]
/// backend = "database"
/// db_path = "/var/lib/sm-store/store.sqlite3"
///
/// [web]
/// port = 9000
///
/// [moderation]
/// extra_banned_words = ["spam"]
///
/// [clock]
/// day_boundary = "utc"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub web: WebConfig,
    pub moderation: ModerationConfig,
    pub clock: ClockConfig,
}

/// Values given on the command line. `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend: Option<BackendKind>,
    pub data_dir: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub day_boundary: Option<DayBoundary>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise defaults, then applies `overrides`.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Config::default(),
        };
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(backend) = overrides.backend {
            self.storage.backend = backend;
        }
        if let Some(dir) = &overrides.data_dir {
            self.storage.data_dir = dir.clone();
        }
        if let Some(db) = &overrides.db_path {
            self.storage.db_path = db.clone();
        }
        if let Some(port) = overrides.port {
            self.web.port = port;
        }
        if let Some(boundary) = overrides.day_boundary {
            self.clock.day_boundary = boundary;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == BackendKind::File && self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::DirectoryDoesNotExist(String::from(
                "storage.data_dir must not be empty",
            )));
        }
        if self.storage.backend == BackendKind::Database && self.storage.db_path.as_os_str().is_empty() {
            return Err(ConfigError::DirectoryDoesNotExist(String::from(
                "storage.db_path must not be empty",
            )));
        }
        self.web
            .bind_address
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidBindAddress(format!("{}: {}", self.web.bind_address, e)))?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = self
            .web
            .bind_address
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidBindAddress(format!("{}: {}", self.web.bind_address, e)))?;
        Ok(SocketAddr::new(ip, self.web.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage.backend, BackendKind::File);
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.clock.day_boundary, DayBoundary::Local);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
            [storage]
            backend = "database"
            db_path = "/tmp/x.sqlite3"

            [moderation]
            extra_banned_words = ["spam"]

            [clock]
            day_boundary = "utc"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.backend, BackendKind::Database);
        assert_eq!(config.storage.db_path, PathBuf::from("/tmp/x.sqlite3"));
        assert_eq!(config.storage.data_dir, PathBuf::from("./data"));
        assert_eq!(config.moderation.extra_banned_words, vec!["spam"]);
        assert_eq!(config.clock.day_boundary, DayBoundary::Utc);
        assert_eq!(config.web.bind_address, "127.0.0.1");
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(matches!(
            Config::from_toml("[storage]\nbackend = \"cloud\""),
            Err(ConfigError::TomlError(_))
        ));
        assert!(matches!(
            Config::from_toml("[web]\nbind_address = \"localhost:80\""),
            Err(ConfigError::InvalidBindAddress(_))
        ));
    }

    #[test]
    fn test_load_file_then_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sm-store.toml");
        fs::write(&path, "[web]\nport = 9000\n[storage]\nbackend = \"memory\"\n").unwrap();

        let overrides = Overrides {
            backend: Some(BackendKind::File),
            data_dir: Some(dir.path().join("data")),
            ..Default::default()
        };
        let config = Config::load(Some(&path), &overrides).unwrap();
        assert_eq!(config.web.port, 9000);
        assert_eq!(config.storage.backend, BackendKind::File);
        assert_eq!(config.storage.data_dir, dir.path().join("data"));
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml")), &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
