//! Payment Gateway Strategy
//!
//! The remote payment API is reached only through [`PaymentGateway`], so the
//! HTTP client in `paydesk-gateway` and the recording double in
//! [`crate::mock`] are interchangeable.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use paydesk_core::gateway::PaymentGateway;
//!
//! let gateway: Arc<dyn PaymentGateway> = Arc::new(PayabliClient::new(config)?);
//! let customers = gateway.list_customers("my-entry").await?;
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{ChargeRequest, CustomerRecord, CustomerSummary, ResponseData, TokenizeRequest};

/// Remote payment API operations
///
/// Implementations map any remote failure (transport, non-2xx status,
/// `isSuccess: false`) to [`crate::DeskError::RemoteCall`] and never retry.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a customer under an entry point
    async fn create_customer(
        &self,
        entry_point: &str,
        customer: &CustomerRecord,
        force_creation: bool,
    ) -> Result<ResponseData>;

    /// List the customers of an entry point
    async fn list_customers(&self, entry_point: &str) -> Result<Vec<CustomerSummary>>;

    /// Delete a customer by id
    async fn delete_customer(&self, customer_id: i64) -> Result<ResponseData>;

    /// Exchange an ephemeral token for a stored payment method
    async fn tokenize_method(&self, request: &TokenizeRequest) -> Result<ResponseData>;

    /// Charge a stored payment method
    async fn charge_stored_method(&self, request: &ChargeRequest) -> Result<ResponseData>;

    /// Gateway name, for logs
    fn name(&self) -> &str;
}
