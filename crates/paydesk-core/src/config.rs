//! Process Configuration
//!
//! Read once at startup and shared read-only afterwards.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{DeskError, Result};

/// Customer charged when a payment request does not name one
pub const DEFAULT_CUSTOMER_ID: i64 = 4440;

/// Amount charged when a payment request does not name one
pub const DEFAULT_AMOUNT: Decimal = dec!(100.00);

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

pub const DEFAULT_ENVIRONMENT: &str = "sandbox";

/// Immutable process-wide settings
#[derive(Clone)]
pub struct DeskConfig {
    /// Secret API key sent with every remote call
    pub api_key: String,

    /// Merchant entry point scoping all remote calls
    pub entry_point: String,

    /// Public token handed to the browser-side card widget
    pub public_token: String,

    /// `sandbox`, `production`, or an explicit base URL
    pub environment: String,

    /// Per-request timeout for remote calls; `None` waits indefinitely
    pub timeout: Option<Duration>,

    pub default_customer_id: i64,

    pub default_amount: Decimal,

    pub bind_addr: String,
}

impl DeskConfig {
    /// Create with required values and defaults for the rest
    pub fn new(
        api_key: impl Into<String>,
        entry_point: impl Into<String>,
        public_token: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            entry_point: entry_point.into(),
            public_token: public_token.into(),
            environment: DEFAULT_ENVIRONMENT.into(),
            timeout: None,
            default_customer_id: DEFAULT_CUSTOMER_ID,
            default_amount: DEFAULT_AMOUNT,
            bind_addr: DEFAULT_BIND_ADDR.into(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| DeskError::Config(format!("{key} not set")))
        };

        let mut config = Self::new(
            required("PAYABLI_KEY")?,
            required("PAYABLI_ENTRY")?,
            required("PAYABLI_PUBLIC_TOKEN")?,
        );

        if let Some(environment) = lookup("PAYABLI_ENVIRONMENT") {
            config.environment = environment;
        }

        if let Some(secs) = lookup("PAYABLI_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| DeskError::Config(format!("PAYABLI_TIMEOUT_SECS '{secs}' is not a number")))?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        if let Some(id) = lookup("PAYDESK_DEFAULT_CUSTOMER_ID") {
            config.default_customer_id = id.trim().parse().map_err(|_| {
                DeskError::Config(format!("PAYDESK_DEFAULT_CUSTOMER_ID '{id}' is not an integer"))
            })?;
        }

        if let Some(amount) = lookup("PAYDESK_DEFAULT_AMOUNT") {
            config.default_amount = amount.trim().parse().map_err(|_| {
                DeskError::Config(format!("PAYDESK_DEFAULT_AMOUNT '{amount}' is not a decimal"))
            })?;
        }

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }

        Ok(config)
    }
}

impl std::fmt::Debug for DeskConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeskConfig")
            .field("api_key", &"<redacted>")
            .field("entry_point", &self.entry_point)
            .field("public_token", &self.public_token)
            .field("environment", &self.environment)
            .field("timeout", &self.timeout)
            .field("default_customer_id", &self.default_customer_id)
            .field("default_amount", &self.default_amount)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}
