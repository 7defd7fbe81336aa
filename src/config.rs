use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Connection parameters for the MySQL pool.
#[derive(Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub db: String,
    pub charset: String,
    pub autocommit: bool,
    pub maxsize: u32,
    pub minsize: u32,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl PoolConfig {
    /// Config with the required credentials and every other option at its default.
    pub fn new(user: impl Into<String>, password: impl Into<String>, db: impl Into<String>) -> Self {
        PoolConfig {
            host: "localhost".to_string(),
            port: 3306,
            user: user.into(),
            password: password.into(),
            db: db.into(),
            charset: "utf8".to_string(),
            autocommit: true,
            maxsize: 10,
            minsize: 1,
            acquire_timeout: Duration::from_millis(30_000),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let user = required(&env_map, "DB_USER")?;
        let password = required(&env_map, "DB_PASSWORD")?;
        let db = required(&env_map, "DB_NAME")?;

        let mut config = PoolConfig::new(user, password, db);

        if let Some(host) = env_map.get("DB_HOST") {
            config.host = host.clone();
        }
        if let Some(charset) = env_map.get("DB_CHARSET") {
            config.charset = charset.clone();
        }

        config.port = parse_or(&env_map, "DB_PORT", config.port, "must be a valid u16")?;
        config.maxsize = parse_or(&env_map, "DB_MAXSIZE", config.maxsize, "must be a valid u32")?;
        config.minsize = parse_or(&env_map, "DB_MINSIZE", config.minsize, "must be a valid u32")?;

        let timeout_ms = parse_or(
            &env_map,
            "DB_ACQUIRE_TIMEOUT_MS",
            config.acquire_timeout.as_millis() as u64,
            "must be a valid u64",
        )?;
        config.acquire_timeout = Duration::from_millis(timeout_ms);

        config.autocommit = match env_map
            .get("DB_AUTOCOMMIT")
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
        {
            None => config.autocommit,
            Some("1" | "true" | "yes" | "on") => true,
            Some("0" | "false" | "no" | "off") => false,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "DB_AUTOCOMMIT".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the pool bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.maxsize == 0 {
            return Err(ConfigError::InvalidValue(
                "DB_MAXSIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        if self.minsize > self.maxsize {
            return Err(ConfigError::InvalidValue(
                "DB_MINSIZE".to_string(),
                format!("must not exceed maxsize ({})", self.maxsize),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"******")
            .field("db", &self.db)
            .field("charset", &self.charset)
            .field("autocommit", &self.autocommit)
            .field("maxsize", &self.maxsize)
            .field("minsize", &self.minsize)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    env_map
        .get(key)
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}

fn parse_or<T: std::str::FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
    message: &str,
) -> Result<T, ConfigError> {
    match env_map.get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(key.to_string(), message.to_string())),
        None => Ok(default),
    }
}
