use std::net::{IpAddr, Ipv4Addr};

use rocket::figment::providers::{Env, Serialized};
use rocket::figment::{self, Figment};
use serde::{Deserialize, Serialize};

/// Service settings, read from `ADDRESS`, `PORT` and `DATABASE_URL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub address: IpAddr,
    pub port: u16,
    pub database_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8000,
            database_url: "data/ledger.sqlite".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, figment::Error> {
        Self::from_figment(Env::raw().only(&["address", "port", "database_url"]))
    }

    /// Layers `provider` over the defaults.
    pub fn from_figment(provider: impl figment::Provider) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(provider)
            .extract()
    }

    /// Rocket's own configuration with this address and port on top.
    pub fn rocket_figment(&self) -> Figment {
        rocket::Config::figment()
            .merge(("address", self.address))
            .merge(("port", self.port))
    }
}
