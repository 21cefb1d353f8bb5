//! Precedence resolution for configuration.
//!
//! ## Data File Precedence (highest to lowest)
//!
//! 1. `--file` CLI flag
//! 2. `CAREPATH_FILE` environment variable
//! 3. Local carepath.kdl (`./carepath.kdl`, or `--config <path>`)
//! 4. System config.kdl (`~/.config/carepath/config.kdl`)
//! 5. Built-in default (`dashacompanhamento_formatado.xlsx`)
//!
//! Every other setting follows the same chain without the environment step.

use std::path::{Path, PathBuf};

use crate::config::{CarepathConfig, OutputFormat};
use crate::models::Locale;
use crate::report::DEFAULT_EXPORT_FILENAME;
use crate::storage::DEFAULT_DATA_FILE;
use crate::{Error, Result};

/// Environment variable naming the tracking sheet.
pub const DATA_FILE_ENV: &str = "CAREPATH_FILE";

/// Environment variable overriding the system config directory.
pub const CONFIG_DIR_ENV: &str = "CAREPATH_CONFIG_DIR";

/// File name of the local config, looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "carepath.kdl";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3030;

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from the local carepath.kdl
    Local,
    /// Value from the system config.kdl
    System,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::Local => write!(f, "local"),
            ValueSource::System => write!(f, "system"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub data_file: Resolved<PathBuf>,
    pub locale: Resolved<Locale>,
    pub export_filename: Resolved<String>,
    pub output_format: Resolved<OutputFormat>,
    pub host: Resolved<String>,
    pub port: Resolved<u16>,
}

impl ResolvedConfig {
    /// Get the tracking sheet path.
    pub fn data_file(&self) -> &Path {
        &self.data_file.value
    }

    /// Effective values as a config document (sources dropped).
    pub fn to_config(&self) -> CarepathConfig {
        CarepathConfig {
            data_file: Some(self.data_file.value.display().to_string()),
            locale: Some(self.locale.value),
            export_filename: Some(self.export_filename.value.clone()),
            output_format: Some(self.output_format.value.clone()),
            host: Some(self.host.value.clone()),
            port: Some(self.port.value),
        }
    }
}

/// CLI overrides for configuration values.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_file: Option<PathBuf>,
    pub locale: Option<Locale>,
    pub output_format: Option<OutputFormat>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = Some(path.into());
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }
}

/// Everything resolution reads besides CLI flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub local: CarepathConfig,
    pub system: CarepathConfig,
    /// Value of `CAREPATH_FILE`, if set and non-empty
    pub env_data_file: Option<String>,
}

impl ConfigSources {
    /// Read the local config at `local_path`, the system config, and the environment.
    pub fn load(local_path: &Path) -> Result<Self> {
        let system = match system_config_path() {
            Some(path) => read_config_file(&path)?,
            None => CarepathConfig::default(),
        };
        Ok(Self {
            local: read_config_file(local_path)?,
            system,
            env_data_file: std::env::var(DATA_FILE_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty()),
        })
    }
}

/// Path of the system config file.
///
/// `$CAREPATH_CONFIG_DIR/config.kdl` when set, else `~/.config/carepath/config.kdl`.
pub fn system_config_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir).join("config.kdl"));
    }
    dirs::config_dir().map(|d| d.join("carepath").join("config.kdl"))
}

/// Read and validate a config file. A missing file is an empty config.
pub fn read_config_file(path: &Path) -> Result<CarepathConfig> {
    if !path.exists() {
        return Ok(CarepathConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    let doc: kdl::KdlDocument = content
        .parse()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    let config = CarepathConfig::from_kdl(&doc);
    config
        .validate()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(config)
}

fn layered<T: Clone>(
    cli: &Option<T>,
    local: &Option<T>,
    system: &Option<T>,
    default: T,
) -> Resolved<T> {
    if let Some(value) = cli {
        Resolved::new(value.clone(), ValueSource::CliFlag)
    } else if let Some(value) = local {
        Resolved::new(value.clone(), ValueSource::Local)
    } else if let Some(value) = system {
        Resolved::new(value.clone(), ValueSource::System)
    } else {
        Resolved::new(default, ValueSource::Default)
    }
}

/// Resolve configuration with full precedence chain.
pub fn resolve_config(sources: &ConfigSources, overrides: &ConfigOverrides) -> ResolvedConfig {
    let data_file = if let Some(ref path) = overrides.data_file {
        Resolved::new(path.clone(), ValueSource::CliFlag)
    } else if let Some(ref path) = sources.env_data_file {
        Resolved::new(
            PathBuf::from(path),
            ValueSource::EnvVar(DATA_FILE_ENV.to_string()),
        )
    } else {
        let file = |c: &CarepathConfig| c.data_file.as_ref().map(PathBuf::from);
        layered(
            &None,
            &file(&sources.local),
            &file(&sources.system),
            PathBuf::from(DEFAULT_DATA_FILE),
        )
    };

    ResolvedConfig {
        data_file,
        locale: layered(
            &overrides.locale,
            &sources.local.locale,
            &sources.system.locale,
            Locale::default(),
        ),
        export_filename: layered(
            &None,
            &sources.local.export_filename,
            &sources.system.export_filename,
            DEFAULT_EXPORT_FILENAME.to_string(),
        ),
        output_format: layered(
            &overrides.output_format,
            &sources.local.output_format,
            &sources.system.output_format,
            OutputFormat::default(),
        ),
        host: layered(
            &overrides.host,
            &sources.local.host,
            &sources.system.host,
            DEFAULT_HOST.to_string(),
        ),
        port: layered(
            &overrides.port,
            &sources.local.port,
            &sources.system.port,
            DEFAULT_PORT,
        ),
    }
}
