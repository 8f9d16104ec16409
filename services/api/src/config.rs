//! Server configuration

use anyhow::Result;
use std::env;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: String,
    /// Path to the optional seed file
    pub seed_file: PathBuf,
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `BIND_ADDR`: listener address (default: `0.0.0.0:3000`)
    /// - `SEED_FILE`: seed file path (default: `users.txt`)
    pub fn from_env() -> Result<Self> {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let seed_file = env::var("SEED_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("users.txt"));

        Ok(Self {
            bind_addr,
            seed_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_server_config_defaults() {
        unsafe {
            std::env::remove_var("BIND_ADDR");
            std::env::remove_var("SEED_FILE");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.seed_file, PathBuf::from("users.txt"));
    }

    #[test]
    #[serial]
    fn test_server_config_from_env() {
        unsafe {
            std::env::set_var("BIND_ADDR", "127.0.0.1:8080");
            std::env::set_var("SEED_FILE", "/tmp/seed.txt");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.seed_file, PathBuf::from("/tmp/seed.txt"));

        unsafe {
            std::env::remove_var("BIND_ADDR");
            std::env::remove_var("SEED_FILE");
        }
    }
}
