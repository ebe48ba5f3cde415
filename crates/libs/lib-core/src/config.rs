//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! ```rust,no_run
//! use lib_core::Config;
//!
//! let config = Config::load().expect("invalid configuration");
//! println!("listening on {}", config.bind_address);
//! ```

use lib_utils::{get_env, get_env_or, get_env_parse_or};

/// Longest accepted chat message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 10_000;

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// Secret key for JWT token signing and verification
    ///
    /// **Must be at least 32 characters long** for security.
    pub jwt_secret: String,

    /// JWT token validity period in hours (1-720)
    pub jwt_expiration_hours: i64,

    /// Address the HTTP server binds to
    pub bind_address: String,

    /// Support chat tuning
    pub chat: ChatSettings,
}

/// Tunables for the support chat.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatSettings {
    /// Cooperative "thinking" pause before a bot reply, in milliseconds
    pub bot_delay_ms: u64,

    /// Minimum free-text score for a FAQ to be accepted as the answer
    pub match_threshold: u32,

    /// Words must be longer than this to count as significant
    pub min_word_len: usize,

    /// Capacity of each connection's outbound queue
    pub outbound_buffer: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            bot_delay_ms: 500,
            match_threshold: 3,
            min_word_len: 2,
            outbound_buffer: 64,
        }
    }
}

impl Config {
    /// Load `.env`, read the environment and validate.
    pub fn load() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let defaults = ChatSettings::default();

        let database_url = get_env_or("DATABASE_URL", "sqlite:data/parcel_chat.db");

        let jwt_secret = get_env("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set in environment")?;

        let jwt_expiration_hours = get_env_parse_or("JWT_EXPIRATION_HOURS", 24)
            .map_err(|_| "JWT_EXPIRATION_HOURS must be a valid number")?;

        let bind_address = get_env_or("BIND_ADDRESS", "127.0.0.1:3001");

        let chat = ChatSettings {
            bot_delay_ms: get_env_parse_or("CHAT_BOT_DELAY_MS", defaults.bot_delay_ms)
                .map_err(|_| "CHAT_BOT_DELAY_MS must be a valid number")?,
            match_threshold: get_env_parse_or("CHAT_MATCH_THRESHOLD", defaults.match_threshold)
                .map_err(|_| "CHAT_MATCH_THRESHOLD must be a valid number")?,
            min_word_len: get_env_parse_or("CHAT_MIN_WORD_LEN", defaults.min_word_len)
                .map_err(|_| "CHAT_MIN_WORD_LEN must be a valid number")?,
            outbound_buffer: get_env_parse_or("CHAT_OUTBOUND_BUFFER", defaults.outbound_buffer)
                .map_err(|_| "CHAT_OUTBOUND_BUFFER must be a valid number")?,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration_hours,
            bind_address,
            chat,
        })
    }

    /// Validate configuration values against security and business rules.
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters long".to_string());
        }

        if self.jwt_expiration_hours < 1 || self.jwt_expiration_hours > 720 {
            return Err("JWT_EXPIRATION_HOURS must be between 1 and 720 (30 days)".to_string());
        }

        if self.chat.bot_delay_ms > 5_000 {
            return Err("CHAT_BOT_DELAY_MS must be at most 5000".to_string());
        }

        if self.chat.outbound_buffer == 0 {
            return Err("CHAT_OUTBOUND_BUFFER must be at least 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "x".repeat(32),
            jwt_expiration_hours: 24,
            bind_address: "127.0.0.1:0".to_string(),
            chat: ChatSettings::default(),
        }
    }

    #[test]
    fn test_sample_config_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = sample();
        config.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bot_delay_bounded() {
        let mut config = sample();
        config.chat.bot_delay_ms = 60_000;
        assert_eq!(
            config.validate().unwrap_err(),
            "CHAT_BOT_DELAY_MS must be at most 5000"
        );
    }
}
