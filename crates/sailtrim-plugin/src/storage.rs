//! File based storage.
//!
//! Layout inside the SignalK configuration directory:
//!
//! ```text
//! ~/.signalk/
//! └── plugin-config-data/
//!     ├── signalk-trim-plugin.json        # options document (host options store)
//!     └── signalk-trim-plugin/
//!         └── config.json                 # trim table snapshot
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use sailtrim_core::{ConfigError, ConfigStorage, PluginOptions};

/// Storage backed by JSON files.
#[derive(Debug, Clone)]
pub struct FileConfigStorage {
    options_path: PathBuf,
    table_path: PathBuf,
}

impl FileConfigStorage {
    /// Storage for `plugin_id` under the SignalK configuration directory.
    pub fn new(config_dir: impl AsRef<Path>, plugin_id: &str) -> Self {
        let base = config_dir.as_ref().join("plugin-config-data");
        Self {
            options_path: base.join(format!("{plugin_id}.json")),
            table_path: base.join(plugin_id).join("config.json"),
        }
    }

    pub fn options_path(&self) -> &Path {
        &self.options_path
    }

    pub fn table_path(&self) -> &Path {
        &self.table_path
    }
}

/// Read and parse a JSON file, `Ok(None)` if it does not exist.
fn read_json(path: &Path) -> Result<Option<Value>, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::Read(format!("{}: {}", path.display(), e))),
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| ConfigError::InvalidData(format!("{}: {}", path.display(), e)))
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Write(format!("{}: {}", path.display(), e))
}

fn write_json(path: &Path, value: &Value, pretty: bool) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| write_error(path, e))?;
    }
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| write_error(path, e))?;
    std::fs::write(path, text).map_err(|e| write_error(path, e))
}

impl ConfigStorage for FileConfigStorage {
    fn load_options(&self) -> Result<PluginOptions, ConfigError> {
        let value = read_json(&self.options_path)?
            .ok_or_else(|| ConfigError::NotFound(self.options_path.display().to_string()))?;
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidData(e.to_string()))
    }

    fn save_configuration(&self, configuration: &Value) -> Result<(), ConfigError> {
        // Keep whatever else the host stored in the document
        let mut doc = match read_json(&self.options_path) {
            Ok(Some(Value::Object(map))) => Value::Object(map),
            Ok(_) | Err(ConfigError::InvalidData(_)) => serde_json::json!({ "enabled": true }),
            Err(e) => return Err(e),
        };
        doc["configuration"] = configuration.clone();
        write_json(&self.options_path, &doc, true)
    }

    fn load_table(&self) -> Result<Option<Value>, ConfigError> {
        read_json(&self.table_path)
    }

    fn save_table(&self, table: &Value) -> Result<(), ConfigError> {
        write_json(&self.table_path, table, false)
    }
}
