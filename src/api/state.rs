//! Application state for the Payroll Import Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::import::PayrollImporter;

/// Shared application state.
///
/// Holds the importer built from the loaded configuration. Imports run on
/// blocking threads, so the importer is shared behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    importer: Arc<PayrollImporter>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            importer: Arc::new(PayrollImporter::new(config.into_config())),
        }
    }

    /// Returns a shared handle to the importer.
    pub fn importer(&self) -> Arc<PayrollImporter> {
        Arc::clone(&self.importer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_state_uses_loaded_config() {
        let state = AppState::new(ConfigLoader::load("./config/payroll").unwrap());
        assert!(
            state
                .importer()
                .config()
                .total_markers
                .iter()
                .any(|m| m == "toplam")
        );
    }
}
