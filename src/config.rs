// ⚙️ Settings - read from the environment (after an optional .env file)

use anyhow::Context;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// SQLite file; `None` runs against the in-memory store
    pub db_path: Option<PathBuf>,
    pub bind_addr: IpAddr,
    pub port: u16,

    /// Seed the in-memory store with demo records
    pub seed_demo: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            db_path: None,
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            seed_demo: true,
        }
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let db_path = lookup("PAYNOTI_DB_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let bind_addr = match lookup("BIND_ADDR") {
            Some(v) => v
                .parse()
                .with_context(|| format!("BIND_ADDR is not an IP address: {}", v))?,
            None => defaults.bind_addr,
        };

        let port = match lookup("PORT") {
            Some(v) => v
                .parse()
                .with_context(|| format!("PORT is not a valid port: {}", v))?,
            None => defaults.port,
        };

        let seed_demo = match lookup("PAYNOTI_SEED_DEMO") {
            Some(v) => parse_flag(&v).with_context(|| format!("PAYNOTI_SEED_DEMO is not a boolean: {}", v))?,
            None => defaults.seed_demo,
        };

        Ok(Settings {
            db_path,
            bind_addr,
            port,
            seed_demo,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
