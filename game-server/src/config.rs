use std::env;
use std::str::FromStr;
use std::time::Duration;

use game_persistence::RetryPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub board_file: String,
    pub session_timeout_minutes: u64,
    pub leaderboard_default_limit: usize,
    pub leaderboard_max_limit: usize,
    pub leaderboard_read_attempts: u32,
    pub leaderboard_read_backoff_ms: u64,
    pub auth_dev_mode: bool,
    pub auth_token_secret: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_env("PORT", 8080),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://trivia.db?mode=rwc".to_string()),
            board_file: env::var("BOARD_FILE")
                .unwrap_or_else(|_| "./shared/boards/default.json".to_string()),
            session_timeout_minutes: parse_env("SESSION_TIMEOUT_MINUTES", 120),
            leaderboard_default_limit: parse_env("LEADERBOARD_DEFAULT_LIMIT", 10),
            leaderboard_max_limit: parse_env("LEADERBOARD_MAX_LIMIT", 1000),
            leaderboard_read_attempts: parse_env("LEADERBOARD_READ_ATTEMPTS", 5),
            leaderboard_read_backoff_ms: parse_env("LEADERBOARD_READ_BACKOFF_MS", 100),
            auth_dev_mode: parse_env("AUTH_DEV_MODE", false),
            auth_token_secret: env::var("AUTH_TOKEN_SECRET")
                .ok()
                .filter(|secret| !secret.is_empty()),
        }
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_minutes.saturating_mul(60))
    }

    pub fn leaderboard_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.leaderboard_read_attempts,
            Duration::from_millis(self.leaderboard_read_backoff_ms),
        )
    }

    /// Clamp a requested leaderboard size to `1..=leaderboard_max_limit`.
    pub fn leaderboard_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.leaderboard_default_limit)
            .clamp(1, self.leaderboard_max_limit.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => parse_or(name, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T: FromStr>(name: &str, raw: &str, default: T) -> T {
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("Invalid {} value '{}', using default", name, raw);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_url: "sqlite::memory:".to_string(),
            board_file: "board.json".to_string(),
            session_timeout_minutes: 120,
            leaderboard_default_limit: 10,
            leaderboard_max_limit: 1000,
            leaderboard_read_attempts: 5,
            leaderboard_read_backoff_ms: 100,
            auth_dev_mode: true,
            auth_token_secret: None,
        }
    }

    #[test]
    fn test_invalid_values_fall_back() {
        assert_eq!(parse_or("PORT", "not-a-port", 8080u16), 8080);
        assert_eq!(parse_or("PORT", " 9000 ", 8080u16), 9000);
        assert!(!parse_or("AUTH_DEV_MODE", "yes", false));
        assert!(parse_or("AUTH_DEV_MODE", "true", false));
    }

    #[test]
    fn test_leaderboard_limit_is_clamped() {
        let config = test_config();
        assert_eq!(config.leaderboard_limit(None), 10);
        assert_eq!(config.leaderboard_limit(Some(0)), 1);
        assert_eq!(config.leaderboard_limit(Some(50)), 50);
        assert_eq!(config.leaderboard_limit(Some(5000)), 1000);
    }

    #[test]
    fn test_derived_settings() {
        let config = test_config();
        assert_eq!(config.session_timeout(), Duration::from_secs(7200));

        let policy = config.leaderboard_retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_delay, Duration::from_millis(100));
    }
}
