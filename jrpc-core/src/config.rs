//! Client deadlines. Defaults: connect 2s, write 4s, read 4s.

use std::time::Duration;

use serde::Deserialize;

/// Per-client deadlines. Deserializes from millisecond fields so it can sit in a TOML file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "RawConfig")]
pub struct ClientConfig {
    /// Bound on the TCP handshake.
    pub connect_timeout: Duration,
    /// Bound on sending one request.
    pub write_timeout: Duration,
    /// Bound on receiving one response, counted from the end of the write.
    pub read_timeout: Duration,
}

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(4);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(4);

impl ClientConfig {
    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = d;
        self
    }

    pub fn write_timeout(mut self, d: Duration) -> Self {
        self.write_timeout = d;
        self
    }

    pub fn read_timeout(mut self, d: Duration) -> Self {
        self.read_timeout = d;
        self
    }

    /// Longest a single call can wait before giving up (write + read).
    pub fn call_budget(&self) -> Duration {
        self.write_timeout + self.read_timeout
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default = "default_connect_ms")]
    connect_timeout_ms: u64,
    #[serde(default = "default_write_ms")]
    write_timeout_ms: u64,
    #[serde(default = "default_read_ms")]
    read_timeout_ms: u64,
}

fn default_connect_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_millis() as u64
}
fn default_write_ms() -> u64 {
    DEFAULT_WRITE_TIMEOUT.as_millis() as u64
}
fn default_read_ms() -> u64 {
    DEFAULT_READ_TIMEOUT.as_millis() as u64
}

impl From<RawConfig> for ClientConfig {
    fn from(raw: RawConfig) -> Self {
        Self {
            connect_timeout: Duration::from_millis(raw.connect_timeout_ms),
            write_timeout: Duration::from_millis(raw.write_timeout_ms),
            read_timeout: Duration::from_millis(raw.read_timeout_ms),
        }
    }
}
