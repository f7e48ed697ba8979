use clap::Parser;
use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    pub backend: String, // "openai" or "ollama"
    pub model: String,   // Model name
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub max_tokens: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub llm: LlmConfig,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        // Start with default configuration
        let mut config_builder =
            Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            // Check for config in default locations
            let default_locations = vec![
                "config.toml",
                "config/config.toml",
                "/etc/nl-sql/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        // Build the config
        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        // Override with command line args if provided
        if let Some(host) = &args.host {
            config.web.host = host.clone();
        }
        if let Some(port) = args.port {
            config.web.port = port;
        }

        // Environment takes precedence over the file for credentials
        config.apply_env_overrides();

        // Fail fast before any network call is attempted
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("MYSQL_HOST") {
            self.database.host = host;
        }
        if let Ok(user) = std::env::var("MYSQL_USER") {
            self.database.user = user;
        }
        if let Ok(password) = std::env::var("MYSQL_PASSWORD") {
            self.database.password = password;
        }
        if let Ok(database) = std::env::var("MYSQL_DB") {
            self.database.database = database;
        }
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            self.llm.api_key = Some(api_key);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.host.is_empty() {
            return Err(ConfigError::Message(
                "database host is not set (database.host or MYSQL_HOST)".to_string(),
            ));
        }
        if self.database.user.is_empty() {
            return Err(ConfigError::Message(
                "database user is not set (database.user or MYSQL_USER)".to_string(),
            ));
        }
        if self.database.database.is_empty() {
            return Err(ConfigError::Message(
                "database name is not set (database.database or MYSQL_DB)".to_string(),
            ));
        }
        if self.llm.backend == "openai"
            && self.llm.api_key.as_deref().unwrap_or("").is_empty()
        {
            return Err(ConfigError::Message(
                "API key is not set (llm.api_key or OPENAI_API_KEY)".to_string(),
            ));
        }
        Ok(())
    }
}

// Default implementation
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                host: String::new(),
                port: 3306,
                user: String::new(),
                password: String::new(),
                database: String::new(),
            },
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 8001,
            },
            llm: LlmConfig {
                backend: "openai".to_string(),
                model: "gpt-4.1".to_string(),
                api_key: None,
                api_url: None,
                max_tokens: 256,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.host = "localhost".to_string();
        config.database.user = "root".to_string();
        config.database.database = "shop".to_string();
        config.llm.api_key = Some("sk-test".to_string());
        config
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert!(populated().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_database_host() {
        let mut config = populated();
        config.database.host.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("MYSQL_HOST"));
    }

    #[test]
    fn validate_rejects_missing_api_key_for_openai_backend() {
        let mut config = populated();
        config.llm.api_key = None;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn validate_allows_missing_api_key_for_ollama_backend() {
        let mut config = populated();
        config.llm.backend = "ollama".to_string();
        config.llm.api_key = None;
        assert!(config.validate().is_ok());
    }
}
