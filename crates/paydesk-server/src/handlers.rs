//! HTTP Handlers

use std::collections::HashMap;
use std::net::IpAddr;

use axum::{
    Form, Json,
    extract::{Path, State, rejection::FormRejection},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use paydesk_core::{DeskError, TransactionIntent, form, process_payment, render};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pages;
use crate::state::AppState;

/// Forwarded to the processor when the caller's address is unknown
pub const FALLBACK_IP: &str = "255.255.255.255";

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub gateway: String,
}

/// Optional overrides posted with a payment
#[derive(Debug, Default, Deserialize)]
pub struct PaymentForm {
    #[serde(rename = "customerId", default)]
    pub customer_id: Option<String>,

    #[serde(default)]
    pub amount: Option<String>,
}

// ============================================================================
// Pages
// ============================================================================

pub async fn create_customer_page() -> Html<&'static str> {
    Html(pages::CREATE_PAGE)
}

pub async fn list_customers_page() -> Html<&'static str> {
    Html(pages::LIST_PAGE)
}

pub async fn transaction_page(State(state): State<AppState>) -> Html<String> {
    Html(pages::transaction_page(
        &state.config.public_token,
        &state.config.entry_point,
    ))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        gateway: state.gateway.name().to_string(),
    })
}

// ============================================================================
// Customer API
// ============================================================================

/// Error fragment swapped into the form result slot with a 200
fn soft_error(html: String) -> Response {
    (StatusCode::OK, [("HX-Reswap", "innerHTML")], Html(html)).into_response()
}

/// Create a customer from a submitted form
pub async fn create_customer(
    State(state): State<AppState>,
    payload: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    let fields = match payload {
        Ok(Form(fields)) => fields,
        Err(e) => {
            tracing::warn!("Unreadable customer form: {}", e);
            return soft_error(render::create_failure());
        }
    };

    let customer = match form::customer_from_form(&fields) {
        Ok(customer) => customer,
        Err(e) => {
            tracing::warn!("Rejected customer form: {}", e);
            return soft_error(render::create_failure());
        }
    };

    match state
        .gateway
        .create_customer(&state.config.entry_point, &customer, true)
        .await
    {
        Ok(data) => {
            tracing::info!(customer_id = ?data.customer_id, email = %customer.email, "Customer created");
            (StatusCode::CREATED, Html(render::create_success())).into_response()
        }
        Err(e) => {
            tracing::error!("Create customer error: {}", e);
            soft_error(render::create_failure())
        }
    }
}

/// Customer table fragment
pub async fn list_customers(State(state): State<AppState>) -> (StatusCode, Html<String>) {
    match state.gateway.list_customers(&state.config.entry_point).await {
        Ok(customers) => {
            tracing::debug!(count = customers.len(), "Listed customers");
            (StatusCode::OK, Html(render::customer_table(&customers)))
        }
        Err(e) => {
            tracing::error!("List customers error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(render::list_failure()))
        }
    }
}

/// Delete a customer by numeric id
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> (StatusCode, Html<String>) {
    let Ok(customer_id) = raw_id.trim().parse::<i64>() else {
        let err = DeskError::InvalidInput(format!("customer id '{raw_id}' is not numeric"));
        tracing::warn!("{}", err);
        return (StatusCode::BAD_REQUEST, Html(render::invalid_customer_id()));
    };

    match state.gateway.delete_customer(customer_id).await {
        Ok(_) => {
            tracing::info!(customer_id, "Customer deleted");
            (StatusCode::OK, Html(String::new()))
        }
        Err(e) => {
            tracing::error!(customer_id, "Delete customer error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render::delete_failure(&e.user_message())),
            )
        }
    }
}

// ============================================================================
// Payment API
// ============================================================================

/// First valid address from `X-Forwarded-For`, then `X-Real-IP`
pub fn client_ip(headers: &HeaderMap) -> String {
    let header_ip = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    header_ip("x-forwarded-for")
        .or_else(|| header_ip("x-real-ip"))
        .map_or_else(|| FALLBACK_IP.to_string(), |ip| ip.to_string())
}

fn build_intent(
    state: &AppState,
    token: String,
    form: PaymentForm,
    ip_address: String,
) -> paydesk_core::Result<TransactionIntent> {
    let customer_id = match form.customer_id.as_deref().map(str::trim) {
        None | Some("") => state.config.default_customer_id,
        Some(raw) => raw.parse().map_err(|_| {
            DeskError::InvalidInput(format!("customer id '{raw}' is not numeric"))
        })?,
    };

    let amount = match form.amount.as_deref().map(str::trim) {
        None | Some("") => state.config.default_amount,
        Some(raw) => raw
            .parse::<Decimal>()
            .map_err(|_| DeskError::InvalidInput(format!("amount '{raw}' is not a number")))?,
    };

    Ok(TransactionIntent {
        ephemeral_token: token,
        customer_id,
        amount,
        entry_point: state.config.entry_point.clone(),
        ip_address,
    })
}

/// Tokenize the posted card token and charge it
pub async fn process_transaction(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    payload: Result<Form<PaymentForm>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let payment_form = match payload {
        Ok(Form(form)) => form,
        // A bare POST carries no form at all
        Err(FormRejection::InvalidFormContentType(_)) => PaymentForm::default(),
        Err(e) => {
            tracing::warn!("Rejected payment form: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Html(render::status_input(false, "Invalid payment request", None)),
            );
        }
    };

    let intent = match build_intent(&state, token, payment_form, client_ip(&headers)) {
        Ok(intent) => intent,
        Err(e) => {
            tracing::warn!("{}", e);
            return (
                StatusCode::BAD_REQUEST,
                Html(render::status_input(false, &e.user_message(), None)),
            );
        }
    };

    match process_payment(state.gateway.clone(), &intent).await {
        Ok(result) => (StatusCode::OK, Html(render::payment_success(&result))),
        Err(e) if e.is_client_error() => (
            StatusCode::BAD_REQUEST,
            Html(render::status_input(false, &e.user_message(), None)),
        ),
        Err(e) => {
            tracing::error!(customer_id = intent.customer_id, "Transaction error: {}", e);
            (StatusCode::OK, Html(render::payment_failure(&e.user_message())))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, header},
    };
    use paydesk_core::{
        CustomerSummary, DeskConfig, Initiator, StoredMethodUsage,
        mock::{GatewayCall, MockGateway},
    };
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    use super::*;
    use crate::build_router;

    const FORM: &str = "application/x-www-form-urlencoded";

    fn app(gateway: &Arc<MockGateway>) -> Router {
        let config = DeskConfig::new("key_123", "entry_abc", "pub_xyz");
        build_router(AppState::new(gateway.clone(), config))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, FORM)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    const CUSTOMER_FORM: &str = "firstname=Ada&lastname=Lovelace&email=ada%40example.com&timeZone=-5\
        &address=1+Main+St&city=Miami&state=FL&zip=33101&country=US";

    #[tokio::test]
    async fn test_create_customer_success() {
        let gateway = Arc::new(MockGateway::new());
        let (status, _, body) = send(
            app(&gateway),
            post("/api/create", &format!("{CUSTOMER_FORM}&hvac=on")),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body.contains("Success!"));

        match &gateway.calls()[0] {
            GatewayCall::CreateCustomer { entry_point, customer, force_creation } => {
                assert_eq!(entry_point, "entry_abc");
                assert!(*force_creation);
                assert_eq!(customer.email, "ada@example.com");
                assert_eq!(customer.additional_fields.len(), 1);
            }
            other => panic!("expected create, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_customer_bad_time_zone_is_soft_error() {
        let gateway = Arc::new(MockGateway::new());
        let form = CUSTOMER_FORM.replace("timeZone=-5", "timeZone=EST");
        let (status, headers, body) = send(app(&gateway), post("/api/create", &form)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get("HX-Reswap").unwrap(), "innerHTML");
        assert!(body.contains("Error!"));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_customer_remote_failure() {
        let gateway = Arc::new(MockGateway::new().failing_create("duplicate"));
        let (status, _, body) = send(app(&gateway), post("/api/create", CUSTOMER_FORM)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("aria-invalid=\"true\""));
    }

    #[tokio::test]
    async fn test_create_customer_without_form_content_type() {
        let gateway = Arc::new(MockGateway::new());
        let request = Request::builder()
            .method("POST")
            .uri("/api/create")
            .body(Body::from("firstname=Ada"))
            .unwrap();
        let (status, headers, body) = send(app(&gateway), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get("HX-Reswap").unwrap(), "innerHTML");
        assert!(body.contains("value=\"Error!\""));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_customers() {
        let gateway = Arc::new(MockGateway::new().with_customers(vec![CustomerSummary {
            customer_id: Some(5),
            email: Some("<b>x</b>@example.com".into()),
            ..Default::default()
        }]));
        let request = Request::get("/api/list").body(Body::empty()).unwrap();
        let (status, _, body) = send(app(&gateway), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("&lt;b&gt;x&lt;/b&gt;@example.com"));
        assert!(body.contains("/api/delete/5"));
    }

    #[tokio::test]
    async fn test_list_customers_failure() {
        let gateway = Arc::new(MockGateway::new().failing_list("unauthorized"));
        let request = Request::get("/api/list").body(Body::empty()).unwrap();
        let (status, _, _) = send(app(&gateway), request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_delete_non_numeric_id() {
        let gateway = Arc::new(MockGateway::new());
        let request = Request::delete("/api/delete/abc").body(Body::empty()).unwrap();
        let (status, _, body) = send(app(&gateway), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Invalid customer ID"));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_customer() {
        let gateway = Arc::new(MockGateway::new());
        let request = Request::delete("/api/delete/42").body(Body::empty()).unwrap();
        let (status, _, body) = send(app(&gateway), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_eq!(gateway.calls(), vec![GatewayCall::DeleteCustomer(42)]);
    }

    #[tokio::test]
    async fn test_delete_customer_remote_failure() {
        let gateway = Arc::new(MockGateway::new().failing_delete("not found"));
        let request = Request::delete("/api/delete/42").body(Body::empty()).unwrap();
        let (status, _, body) = send(app(&gateway), request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("not found"));
    }

    #[tokio::test]
    async fn test_transaction_end_to_end() {
        let gateway = Arc::new(
            MockGateway::new()
                .with_stored_method(Some("sm_999"))
                .with_charge_reference(Some("txn_1")),
        );
        let request = Request::post("/api/transaction/tok_abc123")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(app(&gateway), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Payment processed successfully! Reference ID: txn_1"));

        let calls = gateway.calls();
        assert_eq!(calls.len(), 2);
        match &calls[1] {
            GatewayCall::Charge(charge) => {
                assert_eq!(charge.stored_method_id, "sm_999");
                assert_eq!(charge.initiator, Initiator::Payor);
                assert_eq!(charge.usage_type, StoredMethodUsage::Unscheduled);
                assert_eq!(charge.customer_id, 4440);
                assert_eq!(charge.total_amount, dec!(100.00));
                assert_eq!(charge.ip_address, "203.0.113.7");
            }
            other => panic!("expected charge, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transaction_with_overrides() {
        let gateway = Arc::new(MockGateway::new());
        let (status, _, _) = send(
            app(&gateway),
            post("/api/transaction/tok_1", "customerId=41792&amount=20.50"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        match &gateway.calls()[1] {
            GatewayCall::Charge(charge) => {
                assert_eq!(charge.customer_id, 41792);
                assert_eq!(charge.total_amount, dec!(20.50));
                assert_eq!(charge.ip_address, FALLBACK_IP);
            }
            other => panic!("expected charge, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transaction_malformed_amount() {
        let gateway = Arc::new(MockGateway::new());
        let (status, _, _) =
            send(app(&gateway), post("/api/transaction/tok_1", "amount=lots")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_transaction_blank_token() {
        let gateway = Arc::new(MockGateway::new());
        let request = Request::post("/api/transaction/%20%20").body(Body::empty()).unwrap();
        let (status, _, _) = send(app(&gateway), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_transaction_missing_stored_method() {
        let gateway = Arc::new(MockGateway::new().with_stored_method(None));
        let request = Request::post("/api/transaction/tok_abc123").body(Body::empty()).unwrap();
        let (status, _, body) = send(app(&gateway), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("There was a processing error: missing stored method id"));
        assert_eq!(gateway.charge_count(), 0);
    }

    #[tokio::test]
    async fn test_transaction_charge_declined_is_soft() {
        let gateway = Arc::new(MockGateway::new().failing_charge("Declined <05>"));
        let request = Request::post("/api/transaction/tok_abc123").body(Body::empty()).unwrap();
        let (status, _, body) = send(app(&gateway), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("There was a processing error: Declined &lt;05&gt;"));
        assert_eq!(gateway.charge_count(), 1);
    }

    #[tokio::test]
    async fn test_transaction_page_injects_config() {
        let gateway = Arc::new(MockGateway::new());
        let request = Request::get("/transaction").body(Body::empty()).unwrap();
        let (status, _, body) = send(app(&gateway), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("data-public-token=\"pub_xyz\""));
        assert!(body.contains("data-entry-point=\"entry_abc\""));
    }

    #[tokio::test]
    async fn test_health_check() {
        let gateway = Arc::new(MockGateway::new());
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, _, body) = send(app(&gateway), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"gateway\":\"MockGateway\""));
    }

    #[test]
    fn test_client_ip_fallbacks() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), FALLBACK_IP);

        headers.insert("x-forwarded-for", "not-an-ip".parse().unwrap());
        headers.insert("x-real-ip", "198.51.100.2".parse().unwrap());
        assert_eq!(client_ip(&headers), "198.51.100.2");
    }
}
