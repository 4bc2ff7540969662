//! Application configuration.
//!
//! # Responsibility
//! - Decode the JSON configuration file into typed settings.
//! - Resolve relative paths against the configuration file directory.
//! - Validate settings before any catalog is loaded.
//!
//! # Invariants
//! - Optional settings always have a usable default after `load_config`.
//! - A validated config never carries blank paths.

use crate::extract::CandidateRouting;
use log::info;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration load and validation failures.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
    /// A required path setting is blank.
    EmptyPath(&'static str),
    /// Subprocess extractor configured without a program.
    MissingExtractorProgram,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "invalid config json: {err}"),
            Self::EmptyPath(field) => write!(f, "config field `{field}` must not be empty"),
            Self::MissingExtractorProgram => {
                write!(f, "subprocess extractor requires a non-empty `program`")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::EmptyPath(_) => None,
            Self::MissingExtractorProgram => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Which extractor backs text extraction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractorConfig {
    /// Spawn an external program speaking the JSON stdin/stdout protocol.
    Subprocess {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        working_dir: Option<PathBuf>,
    },
    /// Built-in deterministic label matcher.
    LabelMatch {
        #[serde(default = "default_true")]
        keyword: bool,
        #[serde(default)]
        inclusion: bool,
        #[serde(default)]
        exclusion: bool,
    },
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        let routing = CandidateRouting::default();
        Self::LabelMatch {
            keyword: routing.keyword,
            inclusion: routing.inclusion,
            exclusion: routing.exclusion,
        }
    }
}

/// Where committed annotations are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Rewrite the dataset catalog file in place.
    #[default]
    Json,
    /// Keep committed sets in a SQLite store overlaid on the catalog.
    Sqlite { path: PathBuf },
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    pub taxonomy_path: PathBuf,
    pub datasets_path: PathBuf,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Builds a config from catalog paths with every other setting defaulted.
    pub fn with_paths(taxonomy_path: impl Into<PathBuf>, datasets_path: impl Into<PathBuf>) -> Self {
        Self {
            taxonomy_path: taxonomy_path.into(),
            datasets_path: datasets_path.into(),
            extractor: ExtractorConfig::default(),
            store: StoreConfig::default(),
            log_level: None,
            log_dir: None,
        }
    }

    /// Validates settings that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.taxonomy_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("taxonomy_path"));
        }
        if self.datasets_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("datasets_path"));
        }
        if let ExtractorConfig::Subprocess { program, .. } = &self.extractor {
            if program.trim().is_empty() {
                return Err(ConfigError::MissingExtractorProgram);
            }
        }
        if let StoreConfig::Sqlite { path } = &self.store {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyPath("store.path"));
            }
        }
        Ok(())
    }

    /// Effective log level (configured or build-mode default).
    pub fn effective_log_level(&self) -> &str {
        match self.log_level.as_deref() {
            Some(level) => level,
            None => crate::logging::default_log_level(),
        }
    }

    /// Rewrites relative paths to be relative to `base`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        resolve(&mut self.taxonomy_path, base);
        resolve(&mut self.datasets_path, base);
        if let ExtractorConfig::Subprocess {
            working_dir: Some(dir),
            ..
        } = &mut self.extractor
        {
            resolve(dir, base);
        }
        if let StoreConfig::Sqlite { path } = &mut self.store {
            resolve(path, base);
        }
        if let Some(dir) = &mut self.log_dir {
            resolve(dir, base);
        }
    }
}

/// Parses and validates a config document; paths are left as written.
pub fn parse_config(raw: &str) -> ConfigResult<AppConfig> {
    let config: AppConfig = serde_json::from_str(raw)?;
    config.validate()?;
    Ok(config)
}

/// Loads a config file and resolves its relative paths.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<AppConfig> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse_config(&raw)?;
    if let Some(base) = path.parent() {
        config.resolve_relative_to(base);
    }
    info!(
        "event=config_load module=config status=ok store={} extractor={}",
        match config.store {
            StoreConfig::Json => "json",
            StoreConfig::Sqlite { .. } => "sqlite",
        },
        match config.extractor {
            ExtractorConfig::Subprocess { .. } => "subprocess",
            ExtractorConfig::LabelMatch { .. } => "label_match",
        }
    );
    Ok(config)
}

fn resolve(path: &mut PathBuf, base: &Path) {
    if path.is_relative() && !path.as_os_str().is_empty() {
        *path = base.join(&*path);
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::{parse_config, AppConfig, ConfigError, ExtractorConfig, StoreConfig};
    use std::path::{Path, PathBuf};

    #[test]
    fn minimal_config_takes_defaults() {
        let config =
            parse_config(r#"{ "taxonomy_path": "tax.json", "datasets_path": "ds.json" }"#).unwrap();
        assert_eq!(config.store, StoreConfig::Json);
        assert_eq!(
            config.extractor,
            ExtractorConfig::LabelMatch {
                keyword: true,
                inclusion: false,
                exclusion: false
            }
        );
        assert!(config.log_level.is_none());
    }

    #[test]
    fn subprocess_extractor_requires_program() {
        let err = parse_config(
            r#"{
                "taxonomy_path": "tax.json",
                "datasets_path": "ds.json",
                "extractor": { "kind": "subprocess", "program": " " }
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingExtractorProgram));
    }

    #[test]
    fn blank_catalog_path_is_rejected() {
        let err = parse_config(r#"{ "taxonomy_path": "", "datasets_path": "ds.json" }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPath("taxonomy_path")));
    }

    #[test]
    fn effective_log_level_prefers_configured_level() {
        let mut config = AppConfig::with_paths("tax.json", "ds.json");
        assert_eq!(
            config.effective_log_level(),
            crate::logging::default_log_level()
        );

        config.log_level = Some("warn".to_string());
        assert_eq!(config.effective_log_level(), "warn");
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let mut config = AppConfig::with_paths("tax.json", "/abs/ds.json");
        config.store = StoreConfig::Sqlite {
            path: PathBuf::from("store.sqlite3"),
        };
        config.resolve_relative_to(Path::new("/etc/datatag"));
        assert_eq!(config.taxonomy_path, PathBuf::from("/etc/datatag/tax.json"));
        assert_eq!(config.datasets_path, PathBuf::from("/abs/ds.json"));
        assert_eq!(
            config.store,
            StoreConfig::Sqlite {
                path: PathBuf::from("/etc/datatag/store.sqlite3")
            }
        );
    }
}
