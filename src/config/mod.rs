//! Configuration for Carepath.
//!
//! Settings live in KDL files:
//!
//! - Local: `./carepath.kdl` (or the file named by `--config` / `CAREPATH_CONFIG`)
//! - System: `~/.config/carepath/config.kdl` (`$CAREPATH_CONFIG_DIR/config.kdl` when set)
//!
//! Contains:
//! - `data-file` - Path of the tracking sheet
//! - `locale` - "en" or "pt" headers for newly created sheets
//! - `export-filename` - Name offered for the CSV download
//! - `output-format` - "json" or "human"
//! - `host` / `port` - Web page address
//!
//! ## Precedence
//!
//! CLI flag > environment (data file only) > local config > system config > defaults
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_DIR_ENV, ConfigOverrides, ConfigSources, DATA_FILE_ENV, DEFAULT_HOST, DEFAULT_PORT,
    LOCAL_CONFIG_FILE, Resolved, ResolvedConfig, ValueSource, read_config_file, resolve_config,
    system_config_path,
};
pub use schema::{CarepathConfig, OutputFormat};
