//! Configuration module for roomcast.

use serde::Deserialize;
use std::path::Path;

use crate::{ChatError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum number of concurrent connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Longest accepted input line in bytes; longer lines drop the client.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_max_connections() -> usize {
    64
}

fn default_max_line_len() -> usize {
    1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_connections: default_max_connections(),
            max_line_len: default_max_line_len(),
        }
    }
}

/// Chat room configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomConfig {
    /// Room name.
    #[serde(default = "default_room_name")]
    pub name: String,
    /// Per-subscriber queue capacity for queued delivery.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_room_name() -> String {
    "Lobby".to_string()
}

fn default_queue_capacity() -> usize {
    256
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            name: default_room_name(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/roomcast.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Chat room configuration.
    #[serde(default)]
    pub room: RoomConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ChatError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ChatError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `ROOMCAST_HOST`: Override the bind address
    /// - `ROOMCAST_PORT`: Override the listen port
    ///
    /// On error the configuration is left unchanged.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by variable name.
    ///
    /// All values are validated before any field is written.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("ROOMCAST_HOST").filter(|host| !host.is_empty());
        let port = match lookup("ROOMCAST_PORT") {
            Some(port) => Some(
                port.parse::<u16>()
                    .map_err(|_| ChatError::Config(format!("invalid ROOMCAST_PORT: {port}")))?,
            ),
            None => None,
        };

        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.max_connections, 64);
        assert_eq!(config.server.max_line_len, 1024);

        assert_eq!(config.room.name, "Lobby");
        assert_eq!(config.room.queue_capacity, 256);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/roomcast.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
max_connections = 8
max_line_len = 200

[room]
name = "Flet Chat"
queue_capacity = 16

[logging]
level = "debug"
file = "/tmp/roomcast.log"
"#;
        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.max_connections, 8);
        assert_eq!(config.server.max_line_len, 200);
        assert_eq!(config.room.name, "Flet Chat");
        assert_eq!(config.room.queue_capacity, 16);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "/tmp/roomcast.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[room]
name = "Tech"
"#;
        let config = Config::parse(toml).unwrap();

        assert_eq!(config.room.name, "Tech");
        assert_eq!(config.room.queue_capacity, 256);
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.room.name, "Lobby");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("[server]\nport = \"not a number\"");
        assert!(matches!(result, Err(ChatError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 4242").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 4242);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/roomcast.toml");
        assert!(matches!(result, Err(ChatError::Io(_))));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(|key| match key {
                "ROOMCAST_HOST" => Some("127.0.0.1".to_string()),
                "ROOMCAST_PORT" => Some("5555".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5555);
    }

    #[test]
    fn test_apply_overrides_empty_host_ignored() {
        let mut config = Config::default();
        config
            .apply_overrides(|key| (key == "ROOMCAST_HOST").then(String::new))
            .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_invalid_port_override_keeps_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nhost = \"10.0.0.1\"\nport = 4242\nmax_connections = 3\n\n[room]\nname = \"Tech\"\nqueue_capacity = 8"
        )
        .unwrap();
        let mut config = Config::load(file.path()).unwrap();

        // Host is valid, port is not: neither may be applied
        let result = config.apply_overrides(|key| match key {
            "ROOMCAST_HOST" => Some("192.168.1.1".to_string()),
            "ROOMCAST_PORT" => Some("abc".to_string()),
            _ => None,
        });

        assert!(matches!(result, Err(ChatError::Config(msg)) if msg.contains("abc")));
        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.server.port, 4242);
        assert_eq!(config.server.max_connections, 3);
        assert_eq!(config.room.name, "Tech");
        assert_eq!(config.room.queue_capacity, 8);
    }
}
