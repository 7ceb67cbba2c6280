//! Host settings read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

pub const DEFAULT_BIND: &str = "0.0.0.0:3001";

#[derive(Debug, Clone, PartialEq)]
pub struct HostSettings {
    /// SignalK configuration directory (`SAILTRIM_CONFIG_DIR`).
    pub config_dir: PathBuf,
    /// HTTP listen address (`SAILTRIM_BIND`).
    pub bind_addr: SocketAddr,
    /// Feed simulated telemetry (`SAILTRIM_DEMO`).
    pub demo: bool,
}

impl HostSettings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let config_dir = match lookup("SAILTRIM_CONFIG_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => lookup("HOME")
                .map(PathBuf::from)
                .unwrap_or_default()
                .join(".signalk"),
        };

        let bind = lookup("SAILTRIM_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind
            .parse()
            .with_context(|| format!("invalid SAILTRIM_BIND address: {bind}"))?;

        let demo = match lookup("SAILTRIM_DEMO").as_deref() {
            None => true,
            Some("1" | "true" | "on" | "yes") => true,
            Some("0" | "false" | "off" | "no") => false,
            Some(other) => anyhow::bail!("invalid SAILTRIM_DEMO value: {other}"),
        };

        Ok(Self {
            config_dir,
            bind_addr,
            demo,
        })
    }
}
