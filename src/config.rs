use std::net::SocketAddr;

/// Daily water target when `WATER_GOAL_ML` is not set.
pub const DEFAULT_WATER_GOAL_ML: i32 = 2000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub gemini: GeminiConfig,
    /// Signs the session cookie. At least 64 bytes; random per process when unset.
    pub session_secret: Option<String>,
    pub water_goal_ml: i32,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let port = match std::env::var("APP_PORT") {
            Ok(v) => v.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "APP_PORT",
                reason: e.to_string(),
            })?,
            Err(_) => 8000,
        };

        let water_goal_ml = match std::env::var("WATER_GOAL_ML") {
            Ok(v) => match v.parse::<i32>() {
                Ok(goal) if goal > 0 => goal,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "WATER_GOAL_ML",
                        reason: format!("expected a positive integer, got {v:?}"),
                    })
                }
            },
            Err(_) => DEFAULT_WATER_GOAL_ML,
        };

        let session_secret = std::env::var("SESSION_SECRET").ok();
        if let Some(secret) = &session_secret {
            if secret.len() < 64 {
                return Err(ConfigError::Invalid {
                    name: "SESSION_SECRET",
                    reason: "must be at least 64 bytes".into(),
                });
            }
        }

        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            gemini: GeminiConfig {
                api_key: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
                model: std::env::var("GEMINI_MODEL")
                    .unwrap_or_else(|_| "gemini-1.5-flash-latest".to_string()),
            },
            session_secret,
            water_goal_ml,
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "APP_HOST",
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/slimjourney".into(),
            host: "127.0.0.1".into(),
            port: 8000,
            gemini: GeminiConfig {
                api_key: None,
                model: "gemini-1.5-flash-latest".into(),
            },
            session_secret: None,
            water_goal_ml: DEFAULT_WATER_GOAL_ML,
            cors_origin: "http://localhost:3000".into(),
        }
    }

    #[test]
    fn bind_addr_parses_host_and_port() {
        let addr = sample().bind_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8000");
    }

    #[test]
    fn bind_addr_rejects_garbage_host() {
        let mut config = sample();
        config.host = "not a host".into();
        assert!(config.bind_addr().is_err());
    }
}
