//! Two-Step Payment Flow
//!
//! Exchanges a single-use card token for a stored payment method, then
//! charges that stored method.
//!
//! ```text
//! Idle ──▶ Tokenizing ──▶ Tokenized ──▶ Charging ──▶ Succeeded
//!               │                           │
//!               └────────▶ Failed ◀─────────┘
//! ```
//!
//! The charge is only ever attempted with a non-empty stored-method id
//! obtained by the tokenization call of the same flow. Nothing is retried:
//! the ephemeral token is consumed by the first attempt.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::error::{DeskError, Result};
use crate::gateway::PaymentGateway;
use crate::model::{
    ChargeRequest, Initiator, MethodKind, PaymentResult, StoredMethodUsage, StoredPaymentMethod,
    TokenizeRequest, TransactionIntent,
};

/// Source tag sent with token storage requests
pub const TOKEN_SOURCE: &str = "web";

/// Description attached to stored methods created by this flow
pub const METHOD_DESCRIPTION: &str = "Main card";

/// Progress of a single payment flow
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    Tokenizing,
    Tokenized(StoredPaymentMethod),
    Charging,
    Succeeded,
    Failed(String),
}

impl TransactionState {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }
}

/// One payment orchestration
///
/// Built fresh for every request; holds no state that outlives it.
pub struct PaymentFlow {
    gateway: Arc<dyn PaymentGateway>,
    state: TransactionState,
    history: Vec<TransactionState>,
}

impl PaymentFlow {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            gateway,
            state: TransactionState::Idle,
            history: vec![TransactionState::Idle],
        }
    }

    /// Current state
    pub const fn state(&self) -> &TransactionState {
        &self.state
    }

    /// Every state visited so far, starting with `Idle`
    pub fn history(&self) -> &[TransactionState] {
        &self.history
    }

    fn transition(&mut self, next: TransactionState) {
        tracing::debug!(from = ?self.state, to = ?next, "Payment flow transition");
        self.history.push(next.clone());
        self.state = next;
    }

    fn fail(&mut self, err: DeskError) -> DeskError {
        tracing::error!(
            gateway = self.gateway.name(),
            stage = ?self.state,
            error = %err,
            "Payment flow failed"
        );
        self.transition(TransactionState::Failed(err.reason().to_string()));
        err
    }

    /// Run tokenization then charge for `intent`.
    pub async fn run(&mut self, intent: &TransactionIntent) -> Result<PaymentResult> {
        if self.state != TransactionState::Idle {
            return Err(DeskError::InvalidInput("payment flow already used".into()));
        }

        let token = intent.ephemeral_token.trim();
        if token.is_empty() {
            return Err(DeskError::InvalidInput("payment token is empty".into()));
        }
        if intent.amount <= Decimal::ZERO {
            return Err(DeskError::InvalidInput(format!(
                "amount {} must be positive",
                intent.amount
            )));
        }

        tracing::info!(
            customer_id = intent.customer_id,
            token_prefix = %token.chars().take(6).collect::<String>(),
            "Converting temporary token to stored method"
        );

        // Step 1: token storage
        self.transition(TransactionState::Tokenizing);
        let tokenize = TokenizeRequest {
            customer_id: intent.customer_id,
            entry_point: intent.entry_point.clone(),
            token_id: token.to_string(),
            method: MethodKind::Card,
            source: TOKEN_SOURCE.into(),
            method_description: METHOD_DESCRIPTION.into(),
        };

        let tokenized = self.gateway.tokenize_method(&tokenize).await;
        let stored = match tokenized {
            Ok(data) => data.reference_id.unwrap_or_default(),
            Err(err) => return Err(self.fail(err)),
        };
        let stored = match StoredPaymentMethod::new(stored) {
            Ok(stored) => stored,
            Err(err) => return Err(self.fail(err)),
        };

        tracing::info!(stored_method_id = %stored, "Token stored");
        self.transition(TransactionState::Tokenized(stored.clone()));

        // Step 2: charge the stored method
        self.transition(TransactionState::Charging);
        let charge = ChargeRequest {
            customer_id: intent.customer_id,
            entry_point: intent.entry_point.clone(),
            ip_address: intent.ip_address.clone(),
            total_amount: intent.amount,
            service_fee: Decimal::ZERO,
            method: MethodKind::Card,
            stored_method_id: stored.as_str().to_string(),
            initiator: Initiator::Payor,
            usage_type: StoredMethodUsage::Unscheduled,
        };

        let charged = self.gateway.charge_stored_method(&charge).await;
        let receipt = match charged {
            Ok(data) => data,
            Err(err) => return Err(self.fail(err)),
        };

        tracing::info!(
            reference_id = ?receipt.reference_id,
            amount = %intent.amount,
            "Payment processed"
        );
        self.transition(TransactionState::Succeeded);

        Ok(PaymentResult {
            stored_method: stored,
            reference_id: receipt.reference_id,
            result_text: receipt.result_text,
        })
    }
}

/// Run a fresh [`PaymentFlow`] for `intent`
pub async fn process_payment(
    gateway: Arc<dyn PaymentGateway>,
    intent: &TransactionIntent,
) -> Result<PaymentResult> {
    PaymentFlow::new(gateway).run(intent).await
}
