//! Load config from file and environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use jrpc_core::ClientConfig;
use serde::Deserialize;

/// CLI configuration. File: ~/.config/jrpc/config.toml or /etc/jrpc/config.toml.
/// Env overrides: JRPC_ADDR, JRPC_CONNECT_TIMEOUT_MS, JRPC_WRITE_TIMEOUT_MS, JRPC_READ_TIMEOUT_MS.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server address (default 127.0.0.1:9999).
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Deadlines, as a `[client]` table of `*_timeout_ms` keys.
    #[serde(default)]
    pub client: ClientConfig,
}

fn default_addr() -> String {
    "127.0.0.1:9999".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            client: ClientConfig::default(),
        }
    }
}

/// Load config: default, then config file (explicit path or first one present), then env vars.
/// An explicit path that can't be read or parsed is an error; the implicit ones are skipped.
pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut c = match path {
        Some(p) => parse_file(p)?,
        None => load_file().unwrap_or_default(),
    };
    apply_env(&mut c, |k| std::env::var(k).ok());
    Ok(c)
}

fn apply_env(c: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(s) = var("JRPC_ADDR") {
        c.addr = s;
    }
    if let Some(ms) = var("JRPC_CONNECT_TIMEOUT_MS").and_then(|s| s.parse().ok()) {
        c.client.connect_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = var("JRPC_WRITE_TIMEOUT_MS").and_then(|s| s.parse().ok()) {
        c.client.write_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = var("JRPC_READ_TIMEOUT_MS").and_then(|s| s.parse().ok()) {
        c.client.read_timeout = Duration::from_millis(ms);
    }
}

fn config_paths() -> Vec<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let mut out = Vec::new();
    if let Some(h) = home {
        out.push(h.join(".config/jrpc/config.toml"));
    }
    out.push(PathBuf::from("/etc/jrpc/config.toml"));
    out
}

fn parse_file(p: &Path) -> anyhow::Result<Config> {
    use anyhow::Context;
    let s = std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parsing {}", p.display()))
}

fn load_file() -> Option<Config> {
    let p = config_paths().into_iter().find(|p| p.exists())?;
    match parse_file(&p) {
        Ok(c) => Some(c),
        Err(e) => {
            tracing::warn!("ignoring config: {e:#}");
            None
        }
    }
}
