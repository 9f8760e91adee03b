//! # paydesk-gateway
//!
//! Remote payment gateways for paydesk.
//!
//! ## Gateways
//!
//! - **Payabli** (default): REST API, sandbox or production
//!
//! ## Usage
//!
//! ```rust,ignore
//! use paydesk_gateway::{PayabliClient, PayabliConfig};
//!
//! let client = PayabliClient::new(PayabliConfig::new("api-key"))?;
//! let customers = client.list_customers("my-entry").await?;
//! ```

#[cfg(feature = "payabli")]
pub mod payabli;

#[cfg(feature = "payabli")]
pub use payabli::{PRODUCTION_URL, PayabliClient, PayabliConfig, SANDBOX_URL};

// Re-export core types for convenience
pub use paydesk_core::{DeskError, PaymentGateway, Result};
