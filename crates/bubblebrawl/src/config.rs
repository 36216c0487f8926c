//! Server configuration.
//!
//! Everything has a default, so a missing config file is fine. The file
//! is TOML:
//!
//! ```toml
//! bind = "0.0.0.0:3000"
//! room_count = 10
//! idle_timeout_secs = 300
//! outbound_buffer = 128
//!
//! [room]
//! capacity = 10
//! game_over_grace_secs = 10
//!
//! [game]
//! rows = 13
//! fill_probability = 0.4
//! ```

use std::path::Path;
use std::time::Duration;

use bubblebrawl_game::GameConfig;
use bubblebrawl_room::RoomConfig;
use serde::{Deserialize, Serialize};

use crate::BubbleBrawlError;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "BUBBLEBRAWL_CONFIG";
/// Config file used when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "bubblebrawl.toml";
/// Environment variable overriding the port of [`ServerConfig::bind`].
pub const PORT_ENV: &str = "PORT";

/// Smallest usable per-connection outbound queue.
const MIN_OUTBOUND_BUFFER: usize = 2;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    pub bind: String,
    /// Number of rooms created at startup (`room-1` .. `room-N`).
    pub room_count: u32,
    /// Connections that send no heartbeat for this long are dropped.
    pub idle_timeout_secs: u64,
    /// Events queued per connection before a slow client starts missing
    /// state updates.
    pub outbound_buffer: usize,
    pub room: RoomConfig,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            room_count: 10,
            idle_timeout_secs: 300,
            outbound_buffer: 128,
            room: RoomConfig::default(),
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads the config from the environment: the file named by
    /// `BUBBLEBRAWL_CONFIG` (or `bubblebrawl.toml`), then `PORT`.
    pub fn load() -> Result<Self, BubbleBrawlError> {
        let path = std::env::var(CONFIG_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let config = Self::load_file(Path::new(&path))?;
        match std::env::var(PORT_ENV) {
            Ok(port) => config.with_port(&port),
            Err(_) => Ok(config),
        }
    }

    /// Reads `path`, falling back to defaults if it doesn't exist.
    pub fn load_file(path: &Path) -> Result<Self, BubbleBrawlError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| {
            BubbleBrawlError::ConfigRead {
                path: path.display().to_string(),
                source,
            }
        })?;
        let config = Self::from_toml(&contents)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, BubbleBrawlError> {
        Ok(toml::from_str(contents)?)
    }

    /// Replaces the port in `bind`, keeping the host.
    pub fn with_port(mut self, port: &str) -> Result<Self, BubbleBrawlError> {
        let port: u16 = port.trim().parse().map_err(|_| {
            BubbleBrawlError::InvalidEnv {
                var: PORT_ENV,
                value: port.to_string(),
            }
        })?;
        let host = match self.bind.rsplit_once(':') {
            Some((host, _)) => host,
            None => self.bind.as_str(),
        };
        self.bind = format!("{host}:{port}");
        Ok(self)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn outbound_buffer(&self) -> usize {
        self.outbound_buffer.max(MIN_OUTBOUND_BUFFER)
    }
}
