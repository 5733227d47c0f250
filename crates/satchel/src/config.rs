//! Server configuration.

use std::path::Path;
use std::time::Duration;

use satchel_authority::AuthorityConfig;
use serde::{Deserialize, Serialize};

use crate::SatchelError;

/// Settings for a [`SatchelServer`](crate::SatchelServer).
///
/// Every field has a default, so a JSON config only needs the fields it
/// changes. Durations are written as whole seconds:
///
/// ```json
/// { "bind_addr": "0.0.0.0:9080", "idle_timeout": 60,
///   "authority": { "max_request_quantity": 50 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// How long a new connection has to send its handshake.
    #[serde(with = "seconds")]
    pub handshake_timeout: Duration,

    /// A connection silent for this long is dropped. Clients keep it alive
    /// with heartbeats.
    #[serde(with = "seconds")]
    pub idle_timeout: Duration,

    /// Capacity of the authority's command queue.
    pub channel_size: usize,

    pub authority: AuthorityConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9080".to_string(),
            handshake_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(30),
            channel_size: 64,
            authority: AuthorityConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parses a JSON config. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, SatchelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SatchelError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:9080");
        assert_eq!(config.handshake_timeout, Duration::from_secs(10));
        assert_eq!(config.idle_timeout, Duration::from_secs(30));
        assert_eq!(config.channel_size, 64);
        assert_eq!(config.authority.max_request_quantity, 100);
    }

    #[test]
    fn test_from_json_partial_keeps_defaults() {
        let config = ServerConfig::from_json(
            r#"{"idle_timeout": 60, "authority": {"max_request_quantity": 5}}"#,
        )
        .unwrap();

        assert_eq!(config.idle_timeout, Duration::from_secs(60));
        assert_eq!(config.authority.max_request_quantity, 5);
        assert_eq!(config.bind_addr, "127.0.0.1:9080");
        assert_eq!(config.handshake_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_from_json_empty_object_is_default() {
        assert_eq!(ServerConfig::from_json("{}").unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_from_json_malformed_is_config_error() {
        let result = ServerConfig::from_json(r#"{"channel_size": "lots"}"#);
        assert!(matches!(result, Err(SatchelError::Config(_))));
    }

    #[test]
    fn test_serialize_writes_durations_as_seconds() {
        let json = serde_json::to_value(ServerConfig::default()).unwrap();
        assert_eq!(json["handshake_timeout"], 10);
        assert_eq!(json["idle_timeout"], 30);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = ServerConfig::load("/definitely/not/here/server.json");
        assert!(matches!(result, Err(SatchelError::Io(_))));
    }
}
