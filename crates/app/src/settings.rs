//! Handles settings for the application.
//!
//! Settings are read from an optional TOML file (`settings.toml` unless
//! `--config` says otherwise), then from `CLIENT_REGISTRY__*` environment
//! variables, e.g. `CLIENT_REGISTRY__SERVER__PORT=8080`.
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
    Postgres(String),
}

impl Database {
    /// Connection URL understood by `sea_orm::Database::connect`.
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
            Database::Postgres(url) => url.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database")]
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            database: default_database(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_database() -> Database {
    Database::Memory
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub server: Server,
}

#[derive(Debug, Parser)]
#[command(name = "client_registry", version)]
struct Args {
    /// Optional settings file path (TOML, extension may be omitted).
    #[arg(long, env = "CLIENT_REGISTRY_CONFIG")]
    config: Option<String>,
    /// Override the log level (e.g. debug).
    #[arg(long)]
    level: Option<String>,
    /// Override the listening port.
    #[arg(long)]
    port: Option<u16>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let environment = Environment::with_prefix("CLIENT_REGISTRY").separator("__");
        let mut settings = Self::from_sources(config_path, environment)?;

        if let Some(level) = args.level {
            settings.app.level = level;
        }
        if let Some(port) = args.port {
            settings.server.port = port;
        }

        Ok(settings)
    }

    fn from_sources(config_path: &str, environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()
    }
}
