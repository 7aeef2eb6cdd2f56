// common/src/config.rs
use config::{Config as ConfigFile, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Central configuration for the site server
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub web_server_addr: String,
    pub content_api_url: String,

    pub session: SessionConfig,
    pub discord: DiscordConfig,
    pub auth: AuthConfig,

    // Static file serving configuration
    pub static_files: StaticFilesConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_hours: i64,
    pub cookie_secure: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub guild_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    pub dev_login_enabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StaticFilesConfig {
    pub path: String,
    pub index: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_server_addr: "127.0.0.1:8081".to_string(),
            content_api_url: "http://127.0.0.1:4000".to_string(),

            session: SessionConfig {
                secret: "dev_secret_change_me".to_string(),
                ttl_hours: 24,
                cookie_secure: false,
            },

            discord: DiscordConfig {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: String::new(),
                guild_id: String::new(),
            },

            auth: AuthConfig {
                dev_login_enabled: true,
            },

            static_files: StaticFilesConfig {
                path: "./static".to_string(),
                index: "index.html".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // Locate the config directory
        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        // Build configuration
        let config = ConfigFile::builder()
            // Start with defaults
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add environment specific config
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            // Add a local config file for local overrides
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment variables with prefix "APP"
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Build and deserialize
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load from environment variables directly (backward compatibility)
    pub fn from_env() -> Self {
        // Try to load from file first
        match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");

                // Fall back to the old method
                let web_server_addr = env::var("WEB_SERVER_ADDR")
                    .unwrap_or_else(|_| "127.0.0.1:8081".to_string());

                let content_api_url = env::var("CONTENT_API_URL")
                    .unwrap_or_else(|_| "http://127.0.0.1:4000".to_string());

                let session_secret = env::var("SESSION_SECRET")
                    .unwrap_or_else(|_| "dev_secret_change_me".to_string());

                let session_ttl_hours = env::var("SESSION_TTL_HOURS")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok())
                    .unwrap_or(24);

                let cookie_secure = env::var("COOKIE_SECURE")
                    .map(|v| v.to_lowercase() == "true")
                    .unwrap_or(false);

                let discord_client_id = env::var("DISCORD_CLIENT_ID").unwrap_or_default();
                let discord_client_secret = env::var("DISCORD_CLIENT_SECRET").unwrap_or_default();
                let discord_redirect_uri = env::var("DISCORD_REDIRECT_URI").unwrap_or_default();
                let discord_guild_id = env::var("DISCORD_GUILD_ID").unwrap_or_default();

                let dev_login_enabled = env::var("DEV_LOGIN_ENABLED")
                    .map(|v| v.to_lowercase() == "true")
                    .unwrap_or(true);

                // Static file serving configuration
                let static_files_path = env::var("STATIC_FILES_PATH")
                    .unwrap_or_else(|_| "./static".to_string());

                let static_files_index = env::var("STATIC_FILES_INDEX")
                    .unwrap_or_else(|_| "index.html".to_string());

                Self {
                    web_server_addr,
                    content_api_url,
                    session: SessionConfig {
                        secret: session_secret,
                        ttl_hours: session_ttl_hours,
                        cookie_secure,
                    },
                    discord: DiscordConfig {
                        client_id: discord_client_id,
                        client_secret: discord_client_secret,
                        redirect_uri: discord_redirect_uri,
                        guild_id: discord_guild_id,
                    },
                    auth: AuthConfig { dev_login_enabled },
                    static_files: StaticFilesConfig {
                        path: static_files_path,
                        index: static_files_index,
                    },
                }
            }
        }
    }
}
