use std::env;

use thiserror::Error;

/// Errors raised while reading the server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable `{0}`")]
    Missing(&'static str),
    #[error("invalid value for `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Runtime settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub address: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub handover: HandoverSettings,
    pub delivery_fee: i64,
    pub currency: String,
    pub default_commission_bp: i32,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

/// Shape and throttling of pickup/delivery handover codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandoverSettings {
    pub code_length: usize,
    pub max_attempts: i32,
}

impl Default for HandoverSettings {
    fn default() -> Self {
        Self {
            code_length: 6,
            max_attempts: 5,
        }
    }
}

/// Order-level pricing settings shared by the order services.
#[derive(Debug, Clone)]
pub struct OrderSettings {
    pub delivery_fee: i64,
    pub currency: String,
    pub handover: HandoverSettings,
}

impl ServerConfig {
    /// Read the configuration, loading `.env` first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "app.db".to_string());
        let address = env::var("ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("PORT", 8080u16)?;

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < 16 {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                reason: "must be at least 16 bytes".to_string(),
            });
        }

        let token_ttl_hours = parse_or("TOKEN_TTL_HOURS", 24i64)?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_HOURS",
                reason: "must be positive".to_string(),
            });
        }

        let code_length = parse_or("HANDOVER_CODE_LENGTH", 6usize)?;
        if !(4..=8).contains(&code_length) {
            return Err(ConfigError::Invalid {
                name: "HANDOVER_CODE_LENGTH",
                reason: "must be between 4 and 8".to_string(),
            });
        }

        let max_attempts = parse_or("HANDOVER_MAX_ATTEMPTS", 5i32)?;
        if max_attempts < 1 {
            return Err(ConfigError::Invalid {
                name: "HANDOVER_MAX_ATTEMPTS",
                reason: "must be at least 1".to_string(),
            });
        }

        let delivery_fee = parse_or("DELIVERY_FEE", 0i64)?;
        if delivery_fee < 0 {
            return Err(ConfigError::Invalid {
                name: "DELIVERY_FEE",
                reason: "must not be negative".to_string(),
            });
        }

        let currency = env::var("CURRENCY")
            .unwrap_or_else(|_| "RWF".to_string())
            .to_ascii_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid {
                name: "CURRENCY",
                reason: format!("`{currency}` is not an ISO 4217 code"),
            });
        }

        let default_commission_bp = parse_or("DEFAULT_COMMISSION_BP", 1000i32)?;
        if !(0..=10_000).contains(&default_commission_bp) {
            return Err(ConfigError::Invalid {
                name: "DEFAULT_COMMISSION_BP",
                reason: "must be between 0 and 10000".to_string(),
            });
        }

        Ok(Self {
            database_url,
            address,
            port,
            jwt_secret,
            token_ttl_hours,
            handover: HandoverSettings {
                code_length,
                max_attempts,
            },
            delivery_fee,
            currency,
            default_commission_bp,
            admin_email: env::var("ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
        })
    }

    pub fn order_settings(&self) -> OrderSettings {
        OrderSettings {
            delivery_fee: self.delivery_fee,
            currency: self.currency.clone(),
            handover: self.handover,
        }
    }
}

fn parse_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|err| ConfigError::Invalid {
            name,
            reason: err.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
