//! Domain Models
//!
//! Pass-through shapes for the payment API. Nothing here is persisted locally:
//! each value lives for one request and is dropped once the remote call returns.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};

// ============================================================================
// Customers
// ============================================================================

/// Customer sent to the remote service on creation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub firstname: String,
    pub lastname: String,
    pub email: String,

    /// Offset from UTC in whole hours
    pub time_zone: i32,

    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,

    /// Extra attributes; a key is present only when the caller set it
    #[serde(default)]
    pub additional_fields: BTreeMap<String, Option<String>>,

    /// Fields the remote service de-duplicates on
    #[serde(default)]
    pub identifier_fields: Vec<String>,
}

/// One row of the remote customer listing
///
/// The remote service omits fields it has no value for, the id included.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    #[serde(rename = "customerId", default)]
    pub customer_id: Option<i64>,

    #[serde(rename = "Firstname", default)]
    pub firstname: Option<String>,

    #[serde(rename = "Lastname", default)]
    pub lastname: Option<String>,

    #[serde(rename = "Email", default)]
    pub email: Option<String>,

    #[serde(rename = "Address", default)]
    pub address: Option<String>,

    #[serde(rename = "City", default)]
    pub city: Option<String>,

    #[serde(rename = "State", default)]
    pub state: Option<String>,

    #[serde(rename = "Zip", default)]
    pub zip: Option<String>,

    #[serde(rename = "TimeZone", default)]
    pub time_zone: Option<i32>,
}

// ============================================================================
// Payment method vocabulary
// ============================================================================

/// Kind of payment instrument
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    #[default]
    Card,
}

/// Who initiated a stored-method charge
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Initiator {
    /// Customer-initiated
    #[default]
    Payor,
}

/// How a stored method is being used for this charge
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredMethodUsage {
    /// One-off use, not part of a pre-authorized schedule
    #[default]
    Unscheduled,
}

// ============================================================================
// Payment flow
// ============================================================================

/// Everything one payment orchestration needs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionIntent {
    /// Single-use token issued by the client-side card widget
    pub ephemeral_token: String,

    pub customer_id: i64,

    pub amount: Decimal,

    pub entry_point: String,

    /// Address of the paying client, forwarded to the processor
    pub ip_address: String,
}

/// Durable reference to a tokenized card held by the remote service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPaymentMethod(String);

impl StoredPaymentMethod {
    /// Wrap a stored-method id; empty or blank ids are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DeskError::Integrity("missing stored method id".into()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoredPaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request to exchange an ephemeral token for a stored method
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenizeRequest {
    pub customer_id: i64,
    pub entry_point: String,
    pub token_id: String,
    pub method: MethodKind,
    pub source: String,
    pub method_description: String,
}

/// Request to charge a previously stored method
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChargeRequest {
    pub customer_id: i64,
    pub entry_point: String,
    pub ip_address: String,
    pub total_amount: Decimal,
    pub service_fee: Decimal,
    pub method: MethodKind,
    pub stored_method_id: String,
    pub initiator: Initiator,
    pub usage_type: StoredMethodUsage,
}

/// Reference data the remote service attaches to a successful call
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    #[serde(default)]
    pub reference_id: Option<String>,

    #[serde(default)]
    pub result_text: Option<String>,

    #[serde(default)]
    pub customer_id: Option<i64>,
}

/// Standard envelope wrapped around every remote response
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    #[serde(default)]
    pub is_success: bool,

    #[serde(default)]
    pub response_text: Option<String>,

    #[serde(default)]
    pub response_data: Option<ResponseData>,
}

impl GatewayResponse {
    /// Unwrap the envelope, turning `isSuccess: false` into a remote failure.
    pub fn into_result(self) -> Result<ResponseData> {
        if self.is_success {
            Ok(self.response_data.unwrap_or_default())
        } else {
            Err(DeskError::RemoteCall(
                self.response_text
                    .unwrap_or_else(|| "request was not successful".into()),
            ))
        }
    }
}

/// Outcome of a completed payment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentResult {
    pub stored_method: StoredPaymentMethod,

    /// Transaction reference from the charge response, if any
    pub reference_id: Option<String>,

    pub result_text: Option<String>,
}
