//! Payabli Payment Gateway
//!
//! Implementation of `PaymentGateway` over the Payabli REST API.

use std::time::Duration;

use async_trait::async_trait;
use paydesk_core::{
    ChargeRequest, CustomerRecord, CustomerSummary, DeskConfig, DeskError, GatewayResponse,
    Initiator, MethodKind, PaymentGateway, ResponseData, Result, StoredMethodUsage,
    TokenizeRequest,
};
use reqwest::{
    RequestBuilder, Url,
    header::{ACCEPT, HeaderMap, HeaderName, HeaderValue},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SANDBOX_URL: &str = "https://api-sandbox.payabli.com/api";
pub const PRODUCTION_URL: &str = "https://api.payabli.com/api";

const REQUEST_TOKEN: HeaderName = HeaderName::from_static("requesttoken");
const IDEMPOTENCY_KEY: &str = "idempotencyKey";

/// Payabli client configuration
#[derive(Clone)]
pub struct PayabliConfig {
    /// API root, e.g. `https://api-sandbox.payabli.com/api`
    pub base_url: String,

    /// Secret API key, sent as the `requestToken` header
    pub api_key: String,

    /// Request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl PayabliConfig {
    /// Sandbox configuration for an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: SANDBOX_URL.into(),
            api_key: api_key.into(),
            timeout: None,
        }
    }

    /// Derive from process configuration
    pub fn from_desk_config(config: &DeskConfig) -> Result<Self> {
        Ok(Self {
            base_url: Self::resolve_base_url(&config.environment)?,
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        })
    }

    /// Map `sandbox` / `production` / an explicit URL to an API root
    pub fn resolve_base_url(environment: &str) -> Result<String> {
        let environment = environment.trim();
        match environment.to_ascii_lowercase().as_str() {
            "" | "sandbox" => Ok(SANDBOX_URL.into()),
            "production" | "prod" => Ok(PRODUCTION_URL.into()),
            _ => {
                let url = Url::parse(environment).map_err(|e| {
                    DeskError::Config(format!("PAYABLI_ENVIRONMENT '{environment}': {e}"))
                })?;
                if url.cannot_be_a_base() {
                    return Err(DeskError::Config(format!(
                        "PAYABLI_ENVIRONMENT '{environment}' is not a base URL"
                    )));
                }
                Ok(environment.to_string())
            }
        }
    }
}

impl std::fmt::Debug for PayabliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayabliConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
enum PayabliError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid endpoint: {0}")]
    Endpoint(String),
}

impl From<PayabliError> for DeskError {
    fn from(err: PayabliError) -> Self {
        match err {
            PayabliError::Endpoint(msg) => Self::Config(msg),
            other => Self::RemoteCall(other.to_string()),
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerRef {
    customer_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenStorageBody<'a> {
    customer_data: CustomerRef,
    entry_point: &'a str,
    payment_method: ConvertToken<'a>,
    source: &'a str,
    method_description: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConvertToken<'a> {
    method: MethodKind,
    token_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GetPaidBody<'a> {
    customer_data: CustomerRef,
    entry_point: &'a str,
    ipaddress: &'a str,
    payment_details: PaymentDetails,
    payment_method: StoredMethodPayment<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentDetails {
    #[serde(with = "rust_decimal::serde::float")]
    total_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    service_fee: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredMethodPayment<'a> {
    method: MethodKind,
    initiator: Initiator,
    stored_method_id: &'a str,
    stored_method_usage_type: StoredMethodUsage,
}

#[derive(Deserialize)]
struct CustomerQuery {
    #[serde(rename = "Records", default)]
    records: Vec<CustomerSummary>,
}

// ============================================================================
// Client
// ============================================================================

/// Payabli API client
pub struct PayabliClient {
    http: reqwest::Client,
    config: PayabliConfig,
}

impl PayabliClient {
    /// Create a client; fails on an unusable key or base URL
    pub fn new(config: PayabliConfig) -> Result<Self> {
        Url::parse(&config.base_url)
            .map_err(|e| DeskError::Config(format!("base URL '{}': {e}", config.base_url)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut token = HeaderValue::from_str(&config.api_key)
            .map_err(|_| DeskError::Config("API key is not a valid header value".into()))?;
        token.set_sensitive(true);
        headers.insert(REQUEST_TOKEN, token);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| DeskError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Create from process configuration
    pub fn from_desk_config(config: &DeskConfig) -> Result<Self> {
        Self::new(PayabliConfig::from_desk_config(config)?)
    }

    pub const fn config(&self) -> &PayabliConfig {
        &self.config
    }

    fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, PayabliError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| PayabliError::Endpoint(e.to_string()))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| PayabliError::Endpoint("base URL cannot hold a path".into()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Send a request and read the raw body, mapping non-2xx to an error
    async fn send(&self, request: RequestBuilder) -> std::result::Result<String, PayabliError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = status.as_u16(), body = %body, "Payabli response");

        if !status.is_success() {
            // Error bodies usually still carry the standard envelope
            let message = serde_json::from_str::<GatewayResponse>(&body)
                .ok()
                .and_then(|r| r.response_text)
                .unwrap_or(body);
            return Err(PayabliError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    /// Send a request whose response is the standard envelope
    async fn send_envelope(&self, request: RequestBuilder) -> Result<ResponseData> {
        let body = self.send(request).await?;
        let envelope: GatewayResponse =
            serde_json::from_str(&body).map_err(|e| PayabliError::Decode(e.to_string()))?;

        envelope.into_result()
    }
}

#[async_trait]
impl PaymentGateway for PayabliClient {
    async fn create_customer(
        &self,
        entry_point: &str,
        customer: &CustomerRecord,
        force_creation: bool,
    ) -> Result<ResponseData> {
        let url = self.endpoint(&["Customer", "single", entry_point])?;
        let request = self
            .http
            .post(url)
            .query(&[("forceCustomerCreation", force_creation)])
            .json(customer);

        self.send_envelope(request).await
    }

    async fn list_customers(&self, entry_point: &str) -> Result<Vec<CustomerSummary>> {
        let url = self.endpoint(&["Query", "customers", entry_point])?;
        let body = self.send(self.http.get(url)).await?;

        let query: CustomerQuery = serde_json::from_str(&body)
            .map_err(|e| DeskError::from(PayabliError::Decode(e.to_string())))?;
        Ok(query.records)
    }

    async fn delete_customer(&self, customer_id: i64) -> Result<ResponseData> {
        let url = self.endpoint(&["Customer", &customer_id.to_string()])?;
        self.send_envelope(self.http.delete(url)).await
    }

    async fn tokenize_method(&self, request: &TokenizeRequest) -> Result<ResponseData> {
        let url = self.endpoint(&["TokenStorage", "add"])?;
        let body = TokenStorageBody {
            customer_data: CustomerRef {
                customer_id: request.customer_id,
            },
            entry_point: &request.entry_point,
            payment_method: ConvertToken {
                method: request.method,
                token_id: &request.token_id,
            },
            source: &request.source,
            method_description: &request.method_description,
        };
        let builder = self
            .http
            .post(url)
            .query(&[("createAnonymous", true), ("temporary", false)])
            .json(&body);

        self.send_envelope(builder).await
    }

    async fn charge_stored_method(&self, request: &ChargeRequest) -> Result<ResponseData> {
        let url = self.endpoint(&["MoneyIn", "getpaid"])?;
        let body = GetPaidBody {
            customer_data: CustomerRef {
                customer_id: request.customer_id,
            },
            entry_point: &request.entry_point,
            ipaddress: &request.ip_address,
            payment_details: PaymentDetails {
                total_amount: request.total_amount,
                service_fee: request.service_fee,
            },
            payment_method: StoredMethodPayment {
                method: request.method,
                initiator: request.initiator,
                stored_method_id: &request.stored_method_id,
                stored_method_usage_type: request.usage_type,
            },
        };
        let builder = self
            .http
            .post(url)
            .header(IDEMPOTENCY_KEY, uuid::Uuid::new_v4().to_string())
            .json(&body);

        self.send_envelope(builder).await
    }

    fn name(&self) -> &str {
        "Payabli"
    }
}
