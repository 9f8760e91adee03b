//! # paydesk-core
//!
//! Customer management and two-step card payments over a pluggable payment
//! gateway.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HTTP handlers                          │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │ Form adapter│  │ PaymentFlow │  │   PaymentGateway    │  │
//! │  │  + Render   │──│ (tokenize → │──│   (Strategy)        │  │
//! │  │             │  │   charge)   │  │                     │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `PaymentGateway` trait lets the HTTP client be swapped for
//! [`mock::MockGateway`] without touching flow logic.

pub mod config;
pub mod error;
pub mod form;
pub mod gateway;
pub mod mock;
pub mod model;
pub mod render;
pub mod transaction;

pub use config::DeskConfig;
pub use error::{DeskError, Result};
pub use gateway::PaymentGateway;
pub use model::{
    ChargeRequest, CustomerRecord, CustomerSummary, GatewayResponse, Initiator, MethodKind,
    PaymentResult, ResponseData, StoredMethodUsage, StoredPaymentMethod, TokenizeRequest,
    TransactionIntent,
};
pub use transaction::{PaymentFlow, TransactionState, process_payment};
