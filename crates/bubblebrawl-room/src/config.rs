//! Room configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings shared by every room in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Maximum seated players.
    pub capacity: usize,

    /// Tick rate in Hz while a round is running.
    pub tick_rate: u32,

    /// Seconds a finished round stays in `GAME_OVER` before the room
    /// returns to the lobby.
    pub game_over_grace_secs: u64,

    /// Bound of each room actor's command channel.
    pub command_buffer: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            tick_rate: 60,
            game_over_grace_secs: 10,
            command_buffer: 64,
        }
    }
}

impl RoomConfig {
    pub fn game_over_grace(&self) -> Duration {
        Duration::from_secs(self.game_over_grace_secs)
    }

    /// Capacity, tick rate, and channel bound at least 1.
    pub fn validated(mut self) -> Self {
        self.capacity = self.capacity.max(1);
        self.tick_rate = self.tick_rate.max(1);
        self.command_buffer = self.command_buffer.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.capacity, 10);
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.game_over_grace(), Duration::from_secs(10));
    }

    #[test]
    fn test_room_config_partial_json() {
        let config: RoomConfig =
            serde_json::from_str(r#"{"capacity": 4}"#).unwrap();
        assert_eq!(config.capacity, 4);
        assert_eq!(config.tick_rate, 60);
    }

    #[test]
    fn test_validated_rejects_zero_capacity() {
        let config = RoomConfig {
            capacity: 0,
            command_buffer: 0,
            ..RoomConfig::default()
        }
        .validated();
        assert_eq!(config.capacity, 1);
        assert_eq!(config.command_buffer, 1);
    }

    #[test]
    fn test_validated_rejects_zero_tick_rate() {
        let config = RoomConfig {
            tick_rate: 0,
            ..RoomConfig::default()
        }
        .validated();
        assert_eq!(config.tick_rate, 1);
    }
}
