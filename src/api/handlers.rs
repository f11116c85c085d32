//! HTTP request handlers for the Renewal Workflow Engine API.
//!
//! Every batch action reads the acting user from the `x-acting-user`
//! header (falling back to "system") and answers with the
//! `{"success"}`/`{"error"}` envelope. A fresh correlation id is logged
//! per request.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::export::{export_csv, payment_order_xml};
use crate::notify::NoticeStage;
use crate::store::Repository;
use crate::workflow::{BatchOutcome, LogQuery, WorkflowEngine};

use super::request::{BatchRequest, LogQueryParams};
use super::response::{batch_success, error_message, error_response, success_message};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/renewals/first-call", post(first_call_handler))
        .route("/renewals/reminder-call", post(reminder_call_handler))
        .route("/renewals/last-call", post(last_call_handler))
        .route("/renewals/to-pay", post(to_pay_handler))
        .route("/renewals/invoice", post(invoice_handler))
        .route("/renewals/paid", post(paid_handler))
        .route("/renewals/done", post(done_handler))
        .route("/renewals/receipt", post(receipt_handler))
        .route("/renewals/closing", post(closing_handler))
        .route("/renewals/abandon", post(abandon_handler))
        .route("/renewals/lapsing", post(lapsing_handler))
        .route("/renewals/export", post(export_handler))
        .route("/renewals/renewal-order", post(renewal_order_handler))
        .route("/renewals/logs", get(logs_handler))
        .with_state(state)
}

/// The acting user, taken from the `x-acting-user` header.
fn acting_user(headers: &HeaderMap) -> String {
    headers
        .get("x-acting-user")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or("system")
        .to_string()
}

/// Unwraps the JSON body, answering 400 on parse failures.
fn parse_body(
    payload: Result<Json<BatchRequest>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<BatchRequest, Response> {
    match payload {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            let message = match rejection {
                JsonRejection::JsonDataError(err) => err.body_text(),
                JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
                JsonRejection::MissingJsonContentType(_) => {
                    "Content-Type must be application/json".to_string()
                }
                _ => "Failed to parse request body".to_string(),
            };
            warn!(correlation_id = %correlation_id, error = %message, "Bad request body");
            Err(error_message(message))
        }
    }
}

type MarkOp = fn(&WorkflowEngine, &mut Repository, &[String], &str) -> EngineResult<BatchOutcome>;

/// Runs one direct step transition and renders the envelope.
async fn run_mark(
    state: &AppState,
    headers: &HeaderMap,
    payload: Result<Json<BatchRequest>, JsonRejection>,
    operation: &'static str,
    op: MarkOp,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let actor = acting_user(headers);

    let mut repo = state.repo().write().await;
    match op(state.engine(), &mut repo, &request.ids, &actor) {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                operation,
                job_id = outcome.job_id,
                updated = outcome.updated,
                skipped = outcome.skipped.len(),
                actor = %actor,
                "Batch completed"
            );
            batch_success(&outcome)
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, operation, error = %err, "Batch rejected");
            error_response(&err)
        }
    }
}

/// Dispatches staged notices and renders the envelope.
async fn run_notices(
    state: &AppState,
    headers: &HeaderMap,
    payload: Result<Json<BatchRequest>, JsonRejection>,
    operation: &'static str,
    stages: &[NoticeStage],
    reminder: bool,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let actor = acting_user(headers);

    let mut repo = state.repo().write().await;
    let sent = state
        .notifications()
        .send_notifications(
            &mut repo,
            state.log(),
            state.config(),
            &request.ids,
            stages,
            reminder,
            &actor,
        )
        .await;

    match sent {
        Ok(notified) => {
            info!(
                correlation_id = %correlation_id,
                operation,
                notified,
                actor = %actor,
                "Notices dispatched"
            );
            success_message(format!("{} renewal(s) notified.", notified))
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, operation, error = %err, "Notice dispatch failed");
            error_response(&err)
        }
    }
}

/// Handler for POST /renewals/first-call.
///
/// With `send=1` the First notices are dispatched; with `send=0` (or no
/// flag) the batch is only marked as notified.
async fn first_call_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    let send = match &payload {
        Ok(Json(request)) => request.send == Some(1),
        Err(_) => false,
    };
    if send {
        run_notices(
            &state,
            &headers,
            payload,
            "first_call",
            &[NoticeStage::First],
            false,
        )
        .await
    } else {
        run_mark(
            &state,
            &headers,
            payload,
            "first_call",
            WorkflowEngine::mark_first_call,
        )
        .await
    }
}

/// Handler for POST /renewals/reminder-call.
async fn reminder_call_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    run_notices(
        &state,
        &headers,
        payload,
        "reminder_call",
        &[NoticeStage::First, NoticeStage::Warn],
        true,
    )
    .await
}

/// Handler for POST /renewals/last-call.
async fn last_call_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    run_notices(
        &state,
        &headers,
        payload,
        "last_call",
        &[NoticeStage::Last],
        false,
    )
    .await
}

/// Handler for POST /renewals/to-pay.
async fn to_pay_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    run_mark(&state, &headers, payload, "to_pay", WorkflowEngine::mark_to_pay).await
}

/// Handler for POST /renewals/invoice.
///
/// With `create=1` the invoices are created in the external system; with
/// `create=0` (or no flag) the batch is only marked as invoiced.
async fn invoice_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let actor = acting_user(&headers);

    if request.create != Some(1) {
        let mut repo = state.repo().write().await;
        return match state.engine().mark_invoiced(&mut repo, &request.ids, &actor) {
            Ok(outcome) => batch_success(&outcome),
            Err(err) => error_response(&err),
        };
    }

    let mut repo = state.repo().write().await;
    let run = state
        .invoicing()
        .create_invoices(&mut repo, state.log(), state.config(), &request.ids, &actor)
        .await;

    match run {
        Ok(run) => match run.error {
            None => {
                info!(
                    correlation_id = %correlation_id,
                    created = run.created,
                    actor = %actor,
                    "Invoicing run completed"
                );
                success_message(format!("{} invoice(s) created.", run.created))
            }
            Some(err) => {
                warn!(
                    correlation_id = %correlation_id,
                    created = run.created,
                    error = %err,
                    "Invoicing run stopped"
                );
                error_message(format!("{} invoice(s) created. {}", run.created, err))
            }
        },
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Invoicing run rejected");
            error_response(&err)
        }
    }
}

/// Handler for POST /renewals/paid.
async fn paid_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    run_mark(&state, &headers, payload, "paid", WorkflowEngine::mark_paid).await
}

/// Handler for POST /renewals/done.
async fn done_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    run_mark(&state, &headers, payload, "done", WorkflowEngine::mark_done).await
}

/// Handler for POST /renewals/receipt.
async fn receipt_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    run_mark(&state, &headers, payload, "receipt", WorkflowEngine::mark_receipt).await
}

/// Handler for POST /renewals/closing.
async fn closing_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    run_mark(&state, &headers, payload, "closing", WorkflowEngine::mark_closed).await
}

/// Handler for POST /renewals/abandon.
async fn abandon_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    run_mark(&state, &headers, payload, "abandon", WorkflowEngine::mark_abandoned).await
}

/// Handler for POST /renewals/lapsing.
async fn lapsing_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    run_mark(&state, &headers, payload, "lapsing", WorkflowEngine::mark_lapsed).await
}

/// Handler for POST /renewals/export. Answers `text/csv`.
async fn export_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let repo = state.repo().read().await;
    match export_csv(&repo, state.config(), &request.ids) {
        Ok(csv) => {
            info!(correlation_id = %correlation_id, renewals = request.ids.len(), "CSV export");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/csv")],
                csv,
            )
                .into_response()
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "CSV export rejected");
            error_response(&err)
        }
    }
}

/// Handler for POST /renewals/renewal-order. Answers `application/xml`.
async fn renewal_order_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let repo = state.repo().read().await;
    let today = Utc::now().date_naive();
    match payment_order_xml(&repo, state.config(), &request.ids, today) {
        Ok(xml) => {
            info!(correlation_id = %correlation_id, renewals = request.ids.len(), "Payment order");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/xml")],
                xml,
            )
                .into_response()
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Payment order rejected");
            error_response(&err)
        }
    }
}

/// Handler for GET /renewals/logs.
async fn logs_handler(
    State(state): State<AppState>,
    Query(params): Query<LogQueryParams>,
) -> Response {
    let query = LogQuery {
        task_id: params.task_id,
        job_id: params.job_id,
        user: params.user,
        since: params.since,
        until: params.until,
    };
    let entries = state.log().filter(&query);
    (StatusCode::OK, Json(entries)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::response::ApiMessage;
    use crate::config::ConfigLoader;
    use crate::invoicing::StaticInvoicingClient;
    use crate::models::{
        Client, InvoiceStep, Language, LifecycleStep, Matter, RenewalTask,
    };
    use crate::notify::RecordingMailer;
    use crate::workflow::LogService;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let config = ConfigLoader::load("./config/renewals").expect("Failed to load config");
        let mut repo = Repository::new();
        repo.insert_client(Client {
            id: "cli_001".to_string(),
            display_name: "Acme".to_string(),
            reference: "ACM".to_string(),
            email: Some("ip@acme.example".to_string()),
            language: Language::En,
            tax_id: None,
        });
        repo.insert_matter(Matter {
            id: "mat_001".to_string(),
            uid: "P-0001".to_string(),
            title: "Widget".to_string(),
            country: "EP".to_string(),
            category: "patent".to_string(),
            origin: "national".to_string(),
            kind: "B1".to_string(),
            filing_number: Some("EP20305123".to_string()),
            publication_number: None,
            filing_date: NaiveDate::from_ymd_opt(2020, 3, 31).unwrap(),
            grant_date: None,
            owner: "Acme SA".to_string(),
            client_id: "cli_001".to_string(),
            contacts: vec![],
            events: vec![],
        });
        repo.insert_task(RenewalTask {
            id: "ren_001".to_string(),
            matter_id: "mat_001".to_string(),
            event_id: "evt_001".to_string(),
            detail: 5,
            due_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            done: false,
            done_date: None,
            step: LifecycleStep::Pending,
            grace_period: false,
            invoice_step: InvoiceStep::None,
            cost: Decimal::ZERO,
            fee: Decimal::ZERO,
            discount: Decimal::ZERO,
            sme_status: false,
            table_fee: true,
        });
        AppState::new(
            config,
            repo,
            LogService::new(),
            Arc::new(RecordingMailer::default()),
            Arc::new(StaticInvoicingClient::new(vec![])),
        )
    }

    async fn post_json(router: Router, uri: &str, body: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_empty_selection_returns_exact_error() {
        let router = create_router(create_test_state());
        let (status, body) = post_json(router, "/renewals/to-pay", r#"{"ids": []}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message: ApiMessage = serde_json::from_str(&body).unwrap();
        assert_eq!(message.error.as_deref(), Some("No renewal selected."));
    }

    #[tokio::test]
    async fn test_to_pay_reports_updated_count() {
        let router = create_router(create_test_state());
        let (status, body) = post_json(router, "/renewals/to-pay", r#"{"ids": ["ren_001"]}"#).await;

        assert_eq!(status, StatusCode::OK);
        let message: ApiMessage = serde_json::from_str(&body).unwrap();
        assert_eq!(message.success.as_deref(), Some("1 renewal(s) updated."));
    }

    #[tokio::test]
    async fn test_unknown_ids_are_reported_not_fatal() {
        let router = create_router(create_test_state());
        let (status, body) = post_json(
            router,
            "/renewals/to-pay",
            r#"{"ids": ["ren_001", "ghost"]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let message: ApiMessage = serde_json::from_str(&body).unwrap();
        assert_eq!(
            message.success.as_deref(),
            Some("1 renewal(s) updated, 1 id(s) not found.")
        );
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let router = create_router(create_test_state());
        let (status, _) = post_json(router, "/renewals/to-pay", "{invalid json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_answers_csv() {
        let router = create_router(create_test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/renewals/export")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"ids": ["ren_001"]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/csv"
        );
    }

    #[tokio::test]
    async fn test_logs_endpoint_filters_by_user() {
        let state = create_test_state();
        let router = create_router(state.clone());

        let (status, _) = post_json(
            router.clone(),
            "/renewals/to-pay",
            r#"{"ids": ["ren_001"]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/renewals/logs?user=system")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let entries: Vec<serde_json::Value> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_acting_user_header_is_threaded_to_the_log() {
        let state = create_test_state();
        let router = create_router(state.clone());

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/renewals/paid")
                    .header("Content-Type", "application/json")
                    .header("x-acting-user", "alice")
                    .body(Body::from(r#"{"ids": ["ren_001"]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let entries = state.log().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user, "alice");
    }
}
