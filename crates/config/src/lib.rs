//! Configuration loading and validation.
//!
//! Values are layered with [`figment`], later layers overriding earlier ones:
//!
//! 1. built-in defaults ([`Config::default`]),
//! 2. a configuration file, TOML, YAML or JSON chosen by extension; either the
//!    path passed in, or `shelf.toml` in the platform config directory when it
//!    exists,
//! 3. environment variables prefixed with `SHELF_`, using `__` to separate
//!    nested keys (`SHELF_CATALOG__REPORT_SAMPLE=5`).
//!
//! ```toml
//! [catalog]
//! report_sample = 10
//!
//! [circulation]
//! phone_min_digits = 8
//! phone_max_digits = 15
//!
//! [log]
//! level = "info"
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;

const ENV_PREFIX: &str = "SHELF_";
const FILE_NAME: &str = "shelf.toml";
const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub circulation: CirculationConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// How many category buckets the statistics report lists.
    pub report_sample: usize,
}
impl Default for CatalogConfig {
    fn default() -> Self {
        Self { report_sample: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CirculationConfig {
    pub phone_min_digits: usize,
    pub phone_max_digits: usize,
}
impl Default for CirculationConfig {
    fn default() -> Self {
        Self {
            phone_min_digits: 8,
            phone_max_digits: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    pub level: String,
}
impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Config {
    /// Where the configuration file is looked for when no path is given.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "shelf").map(|dirs| dirs.config_dir().join(FILE_NAME))
    }

    /// Load and validate configuration from all layers.
    ///
    /// An explicit `path` must exist ([`ErrorKind::NotFound`]); the default
    /// path is silently skipped when absent.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|path| path.is_file()),
        };
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = &file {
            tracing::debug!(path = %file.display(), "Reading configuration file");
            figment = Self::merge_file(figment, file)?;
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(figment)
    }

    /// Extract and validate a [`Config`] from an already layered [`Figment`].
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().map_err(|e| exn::Exn::from(ErrorKind::Load(e.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
        let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
        Ok(match extension.as_deref() {
            Some("toml") => figment.merge(Toml::file_exact(path)),
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
            Some("json") => figment.merge(Json::file_exact(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        })
    }

    /// Reject values that would make the application misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.catalog.report_sample == 0 {
            exn::bail!(ErrorKind::Invalid("catalog.report_sample must be at least 1".to_string()));
        }
        let CirculationConfig {
            phone_min_digits: min,
            phone_max_digits: max,
        } = self.circulation;
        if min == 0 || min > max {
            exn::bail!(ErrorKind::Invalid(format!("circulation phone digits range {min}..={max} is empty")));
        }
        if !LOG_LEVELS.contains(&self.log.level.to_ascii_lowercase().as_str()) {
            exn::bail!(ErrorKind::Invalid(format!("unknown log level: {}", self.log.level)));
        }
        Ok(())
    }
}
