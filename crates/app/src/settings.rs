//! Handles settings for the application. Configuration is written in
//! `settings.toml`.
//!
//! See `settings.toml` for the configuration.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level filter (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overpayment {
    #[default]
    Reject,
    Clip,
}

impl Overpayment {
    pub fn policy(self) -> ledger::OverpaymentPolicy {
        match self {
            Overpayment::Reject => ledger::OverpaymentPolicy::Reject,
            Overpayment::Clip => ledger::OverpaymentPolicy::Clip,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    pub overpayment: Option<Overpayment>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
