//! The trim table reload cycle: BUILD → RECONCILE → PERSIST.
//!
//! Every stage is total. Broken options give a partial table, an unreadable
//! stored table counts as empty, a failed write is logged. Callers are
//! responsible for never running two cycles at once.

use tracing::{debug, error, info, warn};

use sailtrim_core::{
    build_with_issues, reconcile, ConfigError, ConfigStorage, ConfigTable, PluginOptions,
    Reconciled, StoredTable,
};

/// Whether the reconciled table is written back to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persist {
    Yes,
    No,
}

/// Load the options document, falling back to defaults.
pub fn load_options(storage: &dyn ConfigStorage) -> PluginOptions {
    match storage.load_options() {
        Ok(options) => options,
        Err(ConfigError::NotFound(what)) => {
            info!("No plugin options found ({}), using defaults", what);
            PluginOptions::default()
        }
        Err(e) => {
            warn!("Plugin options unreadable, using defaults: {}", e);
            PluginOptions::default()
        }
    }
}

/// BUILD: a fresh table from the current options.
pub fn build_stage(storage: &dyn ConfigStorage) -> ConfigTable {
    let options = load_options(storage);
    let (table, issues) = build_with_issues(&options.configuration);
    for issue in &issues {
        warn!("Options seem broken: {}", issue);
    }
    table
}

/// The stored table, empty when absent or unreadable.
pub fn stored_table(storage: &dyn ConfigStorage) -> StoredTable {
    match storage.load_table() {
        Ok(Some(value)) => {
            debug!("Found stored trim table");
            if !value.get("conditions").is_some_and(|c| c.is_object()) {
                warn!("Stored trim table seems broken, ignoring it");
            }
            StoredTable::from_value(&value)
        }
        Ok(None) => {
            debug!("No stored trim table found");
            StoredTable::empty()
        }
        Err(e) => {
            warn!("Stored trim table unreadable, starting from defaults: {}", e);
            StoredTable::empty()
        }
    }
}

/// RECONCILE: carry stored values over to `fresh`.
pub fn reconcile_stage(storage: &dyn ConfigStorage, fresh: ConfigTable) -> ConfigTable {
    let stored = stored_table(storage);
    let Reconciled { table, carried } = reconcile(fresh, &stored);
    debug!(
        entries = table.len(),
        stored = stored.len(),
        carried,
        "Reconciled trim table"
    );
    table
}

/// PERSIST: write the table as a complete snapshot.
pub fn persist_stage(storage: &dyn ConfigStorage, table: &ConfigTable) {
    match storage.save_table(&table.to_value()) {
        Ok(()) => debug!("Trim table written"),
        Err(e) => error!("Failed to write trim table: {}", e),
    }
}

/// Run the full cycle.
pub fn run(storage: &dyn ConfigStorage, persist: Persist) -> ConfigTable {
    let fresh = build_stage(storage);
    let table = reconcile_stage(storage, fresh);
    if persist == Persist::Yes {
        persist_stage(storage, &table);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use sailtrim_core::{ConditionKey, MemoryStorage};
    use serde_json::{json, Value};

    fn configuration() -> Value {
        json!({
            "sails": [{"sail": "Main", "parts": [{"part": "Sheet", "markers": "Red,Blue"}]}],
            "wave": [{"type": "Calm", "min": 0, "max": 2}],
            "windSpeed": [{"type": "Light", "min": 0, "max": 4}],
            "windAngle": [{"type": "Upwind", "min": 35, "max": 60}]
        })
    }

    fn key() -> ConditionKey {
        ConditionKey::new("Calm", "Light", "Upwind", "Main", "Sheet")
    }

    #[test]
    fn test_first_run_persists_defaults() {
        let storage = MemoryStorage::with_configuration(configuration());

        let table = run(&storage, Persist::Yes);
        assert_eq!(table.len(), 1);
        assert_eq!(storage.load_table().unwrap(), Some(table.to_value()));
    }

    #[test]
    fn test_without_persist_storage_untouched() {
        let storage = MemoryStorage::with_configuration(configuration());
        run(&storage, Persist::No);
        assert_eq!(storage.load_table().unwrap(), None);
    }

    #[test]
    fn test_stored_values_survive_reload() {
        let storage = MemoryStorage::with_configuration(configuration());
        let mut table = run(&storage, Persist::Yes);
        table.get_mut(&key()).unwrap().marker = "Blue".to_string();
        storage.save_table(&table.to_value()).unwrap();

        let reloaded = run(&storage, Persist::Yes);
        assert_eq!(reloaded.get(&key()).unwrap().marker, "Blue");
    }

    #[test]
    fn test_bad_bound_does_not_lose_stored_values() {
        let storage = MemoryStorage::with_configuration(configuration());
        let mut table = run(&storage, Persist::Yes);
        table.get_mut(&key()).unwrap().marker = "Red".to_string();
        storage.save_table(&table.to_value()).unwrap();

        let mut broken = configuration();
        broken["windSpeed"] = json!([{"type": "Light", "min": "0", "max": 4}]);
        storage.save_configuration(&broken).unwrap();
        let table = run(&storage, Persist::Yes);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&key()).unwrap().marker, "Red");

        storage.save_configuration(&configuration()).unwrap();
        let table = run(&storage, Persist::Yes);
        assert_eq!(table.get(&key()).unwrap().marker, "Red");
    }

    #[test]
    fn test_missing_options_give_empty_table() {
        let storage = MemoryStorage::new();
        let table = run(&storage, Persist::Yes);
        assert!(table.is_empty());
        assert!(storage.load_table().unwrap().is_some());
    }

    #[test]
    fn test_broken_stored_table_is_ignored() {
        let storage = MemoryStorage::with_configuration(configuration());
        storage.save_table(&json!(["not", "a", "table"])).unwrap();

        let table = run(&storage, Persist::Yes);
        assert_eq!(table.get(&key()).unwrap().marker, "-");
        assert_eq!(storage.load_table().unwrap(), Some(table.to_value()));
    }
}
