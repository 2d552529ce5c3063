//! Server configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then
//! `ENCOUNTERD_`-prefixed environment variables. CLI flags are applied on
//! top by the binary.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP API listens on
    pub bind_addr: SocketAddr,
    /// Directory keyed session snapshots are written to
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            data_dir: PathBuf::from("sessions"),
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional TOML file, and the
    /// environment (`ENCOUNTERD_BIND_ADDR`, `ENCOUNTERD_DATA_DIR`).
    pub fn load(file: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("ENCOUNTERD_")).extract()
    }
}
