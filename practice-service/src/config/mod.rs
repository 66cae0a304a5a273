use rust_decimal::Decimal;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct PracticeConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub jwt: JwtConfig,
    pub billing: BillingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Tax rate applied to billable subtotals, e.g. 0.10 for 10%.
    pub tax_rate: Decimal,
}

impl PracticeConfig {
    pub fn load() -> Result<Self, AppError> {
        // Common config handles .env and the APP__ prefix.
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let config = PracticeConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("practice_db"), is_prod)?,
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET", Some("dev-only-secret"), is_prod)?,
                expiry_hours: get_env("JWT_EXPIRY_HOURS", Some("24"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                    })?,
            },
            billing: BillingConfig {
                tax_rate: Decimal::from_str(&get_env("BILLING_TAX_RATE", Some("0.10"), is_prod)?)
                    .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e.to_string())))?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.jwt.expiry_hours <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_EXPIRY_HOURS must be positive"
            )));
        }

        if self.billing.tax_rate.is_sign_negative() || self.billing.tax_rate >= Decimal::ONE {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "BILLING_TAX_RATE must be in [0, 1)"
            )));
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}
