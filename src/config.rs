//! Service configuration, loaded from TOML with CLI overrides on top.

use crate::api::server::ServerConfig;
use crate::errors::{CasinoError, CasinoResult};
use crate::games::house::HousePolicy;
use crate::money::Money;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RollhouseConfig {
    pub server: ServerSection,
    pub storage: StorageSection,
    pub house: HouseSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        let defaults = ServerConfig::default();
        Self {
            host: defaults.host,
            port: defaults.port,
            allowed_origins: defaults.allowed_origins,
            request_timeout_secs: defaults.request_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSection {
    pub data_directory: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_directory: "./data/rollhouse".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HouseSection {
    /// Outcome bias policy. Defaults to fair play; any bias must be an
    /// explicit operator decision in the config file.
    pub policy: HousePolicy,
    pub max_bet: Money,
    pub seed_demo_accounts: bool,
    pub starting_balance: Money,
}

impl Default for HouseSection {
    fn default() -> Self {
        Self {
            policy: HousePolicy::default(),
            max_bet: Money::from_cents(10_000_00),
            seed_demo_accounts: false,
            starting_balance: Money::from_cents(1_000_00),
        }
    }
}

impl RollhouseConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> CasinoResult<Self> {
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            CasinoError::Configuration(format!("read {}: {}", path.as_ref().display(), e))
        })?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| CasinoError::Configuration(format!("parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CasinoResult<()> {
        if self.server.request_timeout_secs == 0 {
            return Err(CasinoError::Configuration(
                "request_timeout_secs must be positive".into(),
            ));
        }
        if self.house.max_bet.is_zero() {
            return Err(CasinoError::Configuration("max_bet must be positive".into()));
        }
        self.house
            .policy
            .validate()
            .map_err(|e| CasinoError::Configuration(e.to_string()))
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            allowed_origins: self.server.allowed_origins.clone(),
            request_timeout_secs: self.server.request_timeout_secs,
        }
    }
}
