//! Storage abstraction for plugin state.
//!
//! The plugin persists two documents:
//! - the options document, owned by the host options store
//! - the trim table, a complete JSON snapshot in the plugin data directory
//!
//! Implementations live next to the runtime (file based on Linux, an
//! in-memory one for tests). All methods are synchronous; the documents are
//! small and written as whole snapshots.

use serde_json::Value;

use crate::options::PluginOptions;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested document does not exist.
    #[error("Configuration not found: {0}")]
    NotFound(String),

    /// Failed to read a document.
    #[error("Read error: {0}")]
    Read(String),

    /// Failed to write a document.
    #[error("Write error: {0}")]
    Write(String),

    /// The document is not valid JSON or has the wrong shape.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Persistence for plugin options and the trim table.
pub trait ConfigStorage: Send + Sync {
    /// Load the options document.
    fn load_options(&self) -> Result<PluginOptions, ConfigError>;

    /// Replace the configuration inside the options document.
    ///
    /// Other fields of the document (such as `enabled`) are preserved.
    fn save_configuration(&self, configuration: &Value) -> Result<(), ConfigError>;

    /// Load the stored trim table, `Ok(None)` when none was saved yet.
    fn load_table(&self) -> Result<Option<Value>, ConfigError>;

    /// Replace the stored trim table.
    fn save_table(&self, table: &Value) -> Result<(), ConfigError>;
}

/// In-memory storage, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    options: std::sync::RwLock<Option<PluginOptions>>,
    table: std::sync::RwLock<Option<Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-loaded with an options document.
    pub fn with_options(options: PluginOptions) -> Self {
        Self {
            options: std::sync::RwLock::new(Some(options)),
            table: std::sync::RwLock::new(None),
        }
    }

    /// Storage pre-loaded with an enabled configuration.
    pub fn with_configuration(configuration: Value) -> Self {
        Self::with_options(PluginOptions {
            enabled: true,
            configuration,
        })
    }
}

impl ConfigStorage for MemoryStorage {
    fn load_options(&self) -> Result<PluginOptions, ConfigError> {
        let options = self
            .options
            .read()
            .map_err(|e| ConfigError::Read(e.to_string()))?;
        options
            .clone()
            .ok_or_else(|| ConfigError::NotFound("plugin options".to_string()))
    }

    fn save_configuration(&self, configuration: &Value) -> Result<(), ConfigError> {
        let mut options = self
            .options
            .write()
            .map_err(|e| ConfigError::Write(e.to_string()))?;
        let doc = options.get_or_insert_with(PluginOptions::default);
        doc.configuration = configuration.clone();
        Ok(())
    }

    fn load_table(&self) -> Result<Option<Value>, ConfigError> {
        let table = self
            .table
            .read()
            .map_err(|e| ConfigError::Read(e.to_string()))?;
        Ok(table.clone())
    }

    fn save_table(&self, table: &Value) -> Result<(), ConfigError> {
        let mut stored = self
            .table
            .write()
            .map_err(|e| ConfigError::Write(e.to_string()))?;
        *stored = Some(table.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_not_found() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.load_options(),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_save_configuration_keeps_enabled_flag() {
        let storage = MemoryStorage::with_configuration(json!({"sails": []}));
        storage
            .save_configuration(&json!({"wavePath": "navigation.attitude"}))
            .unwrap();

        let options = storage.load_options().unwrap();
        assert!(options.enabled);
        assert_eq!(options.configuration["wavePath"], "navigation.attitude");
    }

    #[test]
    fn test_table_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load_table().unwrap(), None);

        storage.save_table(&json!({"conditions": {}})).unwrap();
        assert_eq!(
            storage.load_table().unwrap(),
            Some(json!({"conditions": {}}))
        );
    }
}
