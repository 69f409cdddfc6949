//! Pricing configuration
//!
//! Settings the calculator is handed at construction. Nothing here is global; callers load a
//! [`PricingConfig`] once and pass it in.

use std::{fs, path::Path};

use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;

use crate::prices::currency_from_code;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Wrapper for I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for YAML parsing errors.
    #[error(transparent)]
    Yaml(#[from] serde_norway::Error),

    /// The configured currency code is not supported.
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),
}

/// Settings that change how carts are priced.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricingConfig {
    /// Cap the sum of overlapping flat discounts at 100%
    pub clamp_flat_discounts: bool,

    /// ISO code of the currency carts are priced in
    pub currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            clamp_flat_discounts: false,
            currency: "GBP".to_string(),
        }
    }
}

impl PricingConfig {
    /// Parse configuration from a YAML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the document is not valid YAML, carries unknown keys or
    /// names an unsupported currency.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_norway::from_str(yaml)?;

        config.currency()?;

        Ok(config)
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// The configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] if the code is not supported.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        currency_from_code(&self.currency)
            .ok_or_else(|| ConfigError::UnknownCurrency(self.currency.clone()))
    }
}
