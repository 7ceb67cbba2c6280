//! Derive a complete trim table from the plugin configuration.

use serde_json::Value;

use crate::classify::SignalClass;
use crate::options::TrimConfiguration;
use crate::table::{ConfigTable, SailPart};

pub use crate::options::ConfigIssue;

/// Build the table for `configuration`, every entry set to `'-'`.
///
/// Never fails: whatever part of the configuration is readable ends up in
/// the table. Use [`build_with_issues`] to find out what was skipped.
pub fn build(configuration: &Value) -> ConfigTable {
    build_with_issues(configuration).0
}

/// Like [`build`], also returning the problems found in the configuration.
pub fn build_with_issues(configuration: &Value) -> (ConfigTable, Vec<ConfigIssue>) {
    let (config, issues) = TrimConfiguration::from_value(configuration);
    (build_from(configuration.clone(), &config), issues)
}

/// Build from an already parsed configuration, keeping `options` as the snapshot.
pub fn build_from(options: Value, config: &TrimConfiguration) -> ConfigTable {
    let mut table = ConfigTable::new(options);

    for class in SignalClass::ALL {
        for rule in config.rules(class) {
            table.push_label(class, &rule.label);
        }
    }

    for sail in &config.sails {
        let parts = sail
            .parts
            .iter()
            .map(|p| SailPart::new(sail.sail.as_str(), p.part.as_str(), &p.markers))
            .collect();
        table.put_sail(&sail.sail, parts);
    }

    table.populate();
    table
}
