use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKSTORE_ENV";
const CONFIG_DIR_ENV: &str = "BOOKSTORE_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKSTORE";

/// Unprefixed variables honoured for compatibility with existing deployments.
const PORT_ENV: &str = "PORT";
const MONGODB_URI_ENV: &str = "MONGODB_URI";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

/// Values read from the bare `PORT` / `MONGODB_URI` variables.
#[derive(Debug, Clone, Default)]
pub struct LegacyOverrides {
    pub port: Option<String>,
    pub mongodb_uri: Option<String>,
}

impl LegacyOverrides {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var(PORT_ENV).ok(),
            mongodb_uri: std::env::var(MONGODB_URI_ENV).ok(),
        }
    }
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay,
    /// prefixed variables and finally `PORT` / `MONGODB_URI`.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .map(|cwd| cwd.join("config"))
                .context("unable to resolve current directory")?,
        };

        Self::load_from(&config_dir, &environment, LegacyOverrides::from_env())
    }

    /// Load configuration from an explicit directory and environment name.
    pub fn load_from(
        config_dir: &Path,
        environment: &str,
        legacy: LegacyOverrides,
    ) -> anyhow::Result<Self> {
        let parsed_environment: Environment = environment.parse()?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .set_override_option("server.port", legacy.port)
            .context("invalid PORT override")?
            .set_override_option("database.uri", legacy.mongodb_uri)
            .context("invalid MONGODB_URI override")?;

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parsed_environment;

        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        3000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "DatabaseSettings::default_uri")]
    pub uri: String,
    /// Database name; when unset the URI's default database is used.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "DatabaseSettings::default_collection")]
    pub collection: String,
}

impl DatabaseSettings {
    pub const FALLBACK_DATABASE: &'static str = "book-store";

    fn default_uri() -> String {
        "mongodb://localhost:27017/book-store".to_string()
    }

    fn default_collection() -> String {
        "books".to_string()
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            uri: Self::default_uri(),
            name: None,
            collection: Self::default_collection(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
