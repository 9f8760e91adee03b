//! Mock Payment Gateway
//!
//! For testing and demo purposes. Records every call and answers with
//! canned responses, so flows can be exercised without network access.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::{DeskError, Result};
use crate::gateway::PaymentGateway;
use crate::model::{ChargeRequest, CustomerRecord, CustomerSummary, ResponseData, TokenizeRequest};

/// A call received by [`MockGateway`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayCall {
    CreateCustomer {
        entry_point: String,
        customer: CustomerRecord,
        force_creation: bool,
    },
    ListCustomers {
        entry_point: String,
    },
    DeleteCustomer(i64),
    Tokenize(TokenizeRequest),
    Charge(ChargeRequest),
}

/// In-memory gateway with configurable failures
pub struct MockGateway {
    customers: Vec<CustomerSummary>,
    stored_method: Option<String>,
    charge_reference: Option<String>,
    create_error: Option<String>,
    list_error: Option<String>,
    delete_error: Option<String>,
    tokenize_error: Option<String>,
    charge_error: Option<String>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// Gateway where every call succeeds
    pub fn new() -> Self {
        Self {
            customers: Vec::new(),
            stored_method: Some("sm_mock".into()),
            charge_reference: Some("txn_mock".into()),
            create_error: None,
            list_error: None,
            delete_error: None,
            tokenize_error: None,
            charge_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Customers returned by `list_customers`
    #[must_use]
    pub fn with_customers(mut self, customers: Vec<CustomerSummary>) -> Self {
        self.customers = customers;
        self
    }

    /// Reference id returned by tokenization (`None` omits it)
    #[must_use]
    pub fn with_stored_method(mut self, id: Option<&str>) -> Self {
        self.stored_method = id.map(str::to_string);
        self
    }

    /// Reference id returned by a successful charge
    #[must_use]
    pub fn with_charge_reference(mut self, id: Option<&str>) -> Self {
        self.charge_reference = id.map(str::to_string);
        self
    }

    #[must_use]
    pub fn failing_create(mut self, message: &str) -> Self {
        self.create_error = Some(message.into());
        self
    }

    #[must_use]
    pub fn failing_list(mut self, message: &str) -> Self {
        self.list_error = Some(message.into());
        self
    }

    #[must_use]
    pub fn failing_delete(mut self, message: &str) -> Self {
        self.delete_error = Some(message.into());
        self
    }

    #[must_use]
    pub fn failing_tokenize(mut self, message: &str) -> Self {
        self.tokenize_error = Some(message.into());
        self
    }

    #[must_use]
    pub fn failing_charge(mut self, message: &str) -> Self {
        self.charge_error = Some(message.into());
        self
    }

    /// Calls received so far, oldest first
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of charge attempts received
    pub fn charge_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GatewayCall::Charge(_)))
            .count()
    }

    fn record(&self, call: GatewayCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn answer(error: Option<&String>, data: ResponseData) -> Result<ResponseData> {
        error.map_or(Ok(data), |msg| Err(DeskError::RemoteCall(msg.clone())))
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_customer(
        &self,
        entry_point: &str,
        customer: &CustomerRecord,
        force_creation: bool,
    ) -> Result<ResponseData> {
        self.record(GatewayCall::CreateCustomer {
            entry_point: entry_point.to_string(),
            customer: customer.clone(),
            force_creation,
        });
        Self::answer(
            self.create_error.as_ref(),
            ResponseData {
                customer_id: Some(1),
                ..Default::default()
            },
        )
    }

    async fn list_customers(&self, entry_point: &str) -> Result<Vec<CustomerSummary>> {
        self.record(GatewayCall::ListCustomers {
            entry_point: entry_point.to_string(),
        });
        match &self.list_error {
            Some(msg) => Err(DeskError::RemoteCall(msg.clone())),
            None => Ok(self.customers.clone()),
        }
    }

    async fn delete_customer(&self, customer_id: i64) -> Result<ResponseData> {
        self.record(GatewayCall::DeleteCustomer(customer_id));
        Self::answer(self.delete_error.as_ref(), ResponseData::default())
    }

    async fn tokenize_method(&self, request: &TokenizeRequest) -> Result<ResponseData> {
        self.record(GatewayCall::Tokenize(request.clone()));
        Self::answer(
            self.tokenize_error.as_ref(),
            ResponseData {
                reference_id: self.stored_method.clone(),
                customer_id: Some(request.customer_id),
                ..Default::default()
            },
        )
    }

    async fn charge_stored_method(&self, request: &ChargeRequest) -> Result<ResponseData> {
        self.record(GatewayCall::Charge(request.clone()));
        Self::answer(
            self.charge_error.as_ref(),
            ResponseData {
                reference_id: self.charge_reference.clone(),
                result_text: Some("Approved".into()),
                customer_id: Some(request.customer_id),
            },
        )
    }

    fn name(&self) -> &str {
        "MockGateway"
    }
}
