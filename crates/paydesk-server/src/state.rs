//! Application State

use std::sync::Arc;

use paydesk_core::{DeskConfig, PaymentGateway};

/// Shared application state
///
/// Built once at startup; handlers only ever read it.
#[derive(Clone)]
pub struct AppState {
    /// Remote payment API (Payabli, or a mock in tests)
    pub gateway: Arc<dyn PaymentGateway>,

    /// Process configuration
    pub config: Arc<DeskConfig>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn PaymentGateway>, config: DeskConfig) -> Self {
        Self {
            gateway,
            config: Arc::new(config),
        }
    }
}
