//! Configuration loading and management for the Payroll Import Engine.
//!
//! This module provides the declarative header label table and the settings
//! that control header detection, salary scale detection and previews. The
//! built-in defaults can be extended from a YAML file.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/payroll").unwrap().into_config();
//! println!("Header threshold: {}", config.header.threshold());
//! ```

mod loader;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader};
pub use types::{
    DEFAULT_MAX_SCAN_ROWS, DEFAULT_PREVIEW_LIMIT, HeaderSettings, ImportConfig, ImportConfigFile,
    LabelTable, SalaryScaleSettings,
};
