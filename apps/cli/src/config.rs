//! CLI configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! The company profile printed on every invoice comes from the same place.

use acbill_core::{BankDetails, CompanyProfile, DEFAULT_PAYMENT_TERMS};
use acbill_db::DbConfig;
use std::env;

/// Default SQLite file, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "acbill.db";

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite database file
    pub database_path: String,

    /// Pool size for the database
    pub max_connections: u32,

    /// How many numbers bill creation tries before giving up
    pub create_attempts: u32,

    /// Issuer block, bank details and default payment terms
    pub company: CompanyProfile,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let defaults = CompanyProfile::default();

        let config = AppConfig {
            database_path: var("ACBILL_DATABASE_PATH", DEFAULT_DATABASE_PATH),

            max_connections: var("ACBILL_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ACBILL_MAX_CONNECTIONS".to_string()))?,

            create_attempts: var("ACBILL_CREATE_ATTEMPTS", "3")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ACBILL_CREATE_ATTEMPTS".to_string()))?,

            company: CompanyProfile {
                name: var("COMPANY_NAME", &defaults.name),
                pan: var("COMPANY_PAN", ""),
                phone: var("COMPANY_PHONE", ""),
                email: var("COMPANY_EMAIL", ""),
                bill_address: var("COMPANY_BILL_ADDRESS", ""),
                bank: BankDetails {
                    account_name: var("BANK_ACCOUNT_NAME", ""),
                    account_no: var("BANK_ACCOUNT_NO", ""),
                    ifsc: var("BANK_IFSC", ""),
                    branch: var("BANK_BRANCH", ""),
                },
                payment_terms: var("PAYMENT_TERMS", DEFAULT_PAYMENT_TERMS),
            },
        };

        if config.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("ACBILL_DATABASE_PATH".to_string()));
        }
        if config.company.name.trim().is_empty() {
            return Err(ConfigError::MissingRequired("COMPANY_NAME".to_string()));
        }
        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("ACBILL_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    ///
    /// `database_path` overrides the configured file (the `--db` flag).
    pub fn db_config(&self, database_path: Option<&str>) -> DbConfig {
        DbConfig::new(database_path.unwrap_or(&self.database_path))
            .max_connections(self.max_connections)
            .create_attempts(self.create_attempts)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.database_path, "acbill.db");
        assert_eq!(config.create_attempts, 3);
        assert_eq!(config.company.name, "AC Service Company");
        assert_eq!(config.company.payment_terms, "30 Days credit");
    }

    #[test]
    fn test_company_profile_from_env() {
        let config = load(&[
            ("COMPANY_NAME", "Cool Breeze Services"),
            ("COMPANY_PAN", "ABCDE1234F"),
            ("BANK_IFSC", "SBIN0001234"),
            ("PAYMENT_TERMS", "Immediate"),
        ])
        .unwrap();

        assert_eq!(config.company.name, "Cool Breeze Services");
        assert_eq!(config.company.pan, "ABCDE1234F");
        assert_eq!(config.company.bank.ifsc, "SBIN0001234");
        assert_eq!(config.company.payment_terms, "Immediate");
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let err = load(&[("ACBILL_CREATE_ATTEMPTS", "many")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "ACBILL_CREATE_ATTEMPTS"));

        let err = load(&[("ACBILL_MAX_CONNECTIONS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_blank_company_name_is_missing() {
        let err = load(&[("COMPANY_NAME", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(_)));
    }

    #[test]
    fn test_db_flag_overrides_path() {
        let config = load(&[("ACBILL_DATABASE_PATH", "/var/lib/acbill.db")]).unwrap();
        assert_eq!(
            config.db_config(Some("other.db")).database_path,
            std::path::PathBuf::from("other.db")
        );
        assert_eq!(
            config.db_config(None).database_path,
            std::path::PathBuf::from("/var/lib/acbill.db")
        );
    }
}
