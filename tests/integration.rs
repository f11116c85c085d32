//! Integration tests for the Renewal Workflow Engine.
//!
//! This suite drives the full router and covers:
//! - Batch step transitions and best-effort id handling
//! - Staged notifications (first, reminder and last call)
//! - Grace period entry via the last call
//! - Invoicing runs that stop at a missing client
//! - CSV export and payment-order XML
//! - The audit trail and job id allocation

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tower::ServiceExt;

use renewal_engine::api::{ApiMessage, AppState, create_router};
use renewal_engine::config::ConfigLoader;
use renewal_engine::invoicing::{ExternalClient, StaticInvoicingClient};
use renewal_engine::models::{
    Client, InvoiceStep, Language, LifecycleStep, Matter, RenewalTask,
};
use renewal_engine::notify::RecordingMailer;
use renewal_engine::store::Repository;
use renewal_engine::workflow::LogService;

// =============================================================================
// Test Helpers
// =============================================================================

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn client(id: &str, name: &str, reference: &str) -> Client {
    Client {
        id: id.to_string(),
        display_name: name.to_string(),
        reference: reference.to_string(),
        email: Some(format!("ip@{}.example", reference.to_lowercase())),
        language: Language::En,
        tax_id: None,
    }
}

fn matter(id: &str, uid: &str, country: &str, client_id: &str) -> Matter {
    Matter {
        id: id.to_string(),
        uid: uid.to_string(),
        title: "Widget".to_string(),
        country: country.to_string(),
        category: "patent".to_string(),
        origin: "national".to_string(),
        kind: "B1".to_string(),
        filing_number: Some(format!("{}20305123", country)),
        publication_number: None,
        filing_date: NaiveDate::from_ymd_opt(2020, 3, 31).unwrap(),
        grant_date: None,
        owner: "Acme SA".to_string(),
        client_id: client_id.to_string(),
        contacts: vec![],
        events: vec![],
    }
}

fn task(id: &str, matter_id: &str, detail: u32) -> RenewalTask {
    RenewalTask {
        id: id.to_string(),
        matter_id: matter_id.to_string(),
        event_id: "evt_001".to_string(),
        detail,
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
    }
}

/// Two clients: Client A is known to the invoicing system, Client B is not.
fn create_test_state() -> (AppState, Arc<RecordingMailer>, Arc<StaticInvoicingClient>) {
    let config = ConfigLoader::load("./config/renewals").expect("Failed to load config");

    let mut repo = Repository::new();
    repo.insert_client(client("cli_a", "Client A", "CLA"));
    repo.insert_client(client("cli_b", "Client B", "CLB"));
    repo.insert_matter(matter("mat_a1", "P-0001", "EP", "cli_a"));
    repo.insert_matter(matter("mat_a2", "P-0002", "EP", "cli_a"));
    repo.insert_matter(matter("mat_b1", "P-0003", "FR", "cli_b"));
    repo.insert_task(task("ren_a1", "mat_a1", 5));
    repo.insert_task(task("ren_a2", "mat_a2", 4));
    repo.insert_task(task("ren_b1", "mat_b1", 5));

    let mailer = Arc::new(RecordingMailer::new());
    let invoicing = Arc::new(StaticInvoicingClient::new(vec![ExternalClient {
        id: "ext_a".to_string(),
        name: "Client A Holdings".to_string(),
        tax_id: Some("GB123456".to_string()),
    }]));

    let state = AppState::new(
        config,
        repo,
        LogService::new(),
        mailer.clone(),
        invoicing.clone(),
    );
    (state, mailer, invoicing)
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

fn envelope(body: &str) -> ApiMessage {
    serde_json::from_str(body).unwrap()
}

// =============================================================================
// Step transitions
// =============================================================================

#[tokio::test]
async fn test_to_pay_moves_both_axes() {
    let (state, _, _) = create_test_state();
    let router = create_router(state.clone());

    let (status, body) = post_json(router, "/renewals/to-pay", r#"{"ids": ["ren_a1"]}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope(&body).success.as_deref(), Some("1 renewal(s) updated."));

    let repo = state.repo().read().await;
    let task = repo.task("ren_a1").unwrap();
    assert_eq!(task.step, LifecycleStep::ToPay);
    assert_eq!(task.invoice_step, InvoiceStep::ToInvoice);
}

#[tokio::test]
async fn test_empty_selection_is_rejected_with_exact_message() {
    let (state, _, _) = create_test_state();

    for uri in [
        "/renewals/first-call",
        "/renewals/to-pay",
        "/renewals/invoice",
        "/renewals/export",
        "/renewals/renewal-order",
    ] {
        let router = create_router(state.clone());
        let (status, body) = post_json(router, uri, r#"{"ids": []}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            envelope(&body).error.as_deref(),
            Some("No renewal selected."),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn test_closing_splits_on_the_done_flag() {
    let (state, _, _) = create_test_state();
    let router = create_router(state.clone());

    // ren_a1 is paid and completed first; ren_a2 is closed unpaid.
    let (status, _) = post_json(
        router.clone(),
        "/renewals/done",
        r#"{"ids": ["ren_a1"]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(
        router,
        "/renewals/closing",
        r#"{"ids": ["ren_a1", "ren_a2"]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let repo = state.repo().read().await;
    assert_eq!(repo.task("ren_a1").unwrap().step, LifecycleStep::Done);
    assert_eq!(repo.task("ren_a2").unwrap().step, LifecycleStep::Closed);
}

#[tokio::test]
async fn test_abandon_records_a_case_event() {
    let (state, _, _) = create_test_state();
    let router = create_router(state.clone());

    let (status, _) = post_json(router, "/renewals/abandon", r#"{"ids": ["ren_a1"]}"#).await;
    assert_eq!(status, StatusCode::OK);

    let repo = state.repo().read().await;
    assert_eq!(repo.task("ren_a1").unwrap().step, LifecycleStep::Abandoned);
    assert_eq!(repo.matter("mat_a1").unwrap().events.len(), 1);
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_first_call_with_send_dispatches_one_notice_per_client() {
    let (state, mailer, _) = create_test_state();
    let router = create_router(state.clone());

    let (status, body) = post_json(
        router,
        "/renewals/first-call",
        r#"{"ids": ["ren_a1", "ren_a2", "ren_b1"], "send": 1}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope(&body).success.as_deref(), Some("3 renewal(s) notified."));

    // Client A's two renewals share one notice; Client B gets its own.
    let sent = mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].client_name, "Client A");
    assert_eq!(sent[0].lines.len(), 2);
    assert_eq!(sent[1].client_name, "Client B");

    let repo = state.repo().read().await;
    assert_eq!(repo.task("ren_a1").unwrap().step, LifecycleStep::FirstCall);
    assert!(!repo.task("ren_a1").unwrap().grace_period);
}

#[tokio::test]
async fn test_first_call_without_send_only_marks() {
    let (state, mailer, _) = create_test_state();
    let router = create_router(state.clone());

    let (status, body) = post_json(
        router,
        "/renewals/first-call",
        r#"{"ids": ["ren_a1"], "send": 0}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope(&body).success.as_deref(), Some("1 renewal(s) updated."));
    assert!(mailer.sent().is_empty());

    let repo = state.repo().read().await;
    assert_eq!(repo.task("ren_a1").unwrap().step, LifecycleStep::FirstCall);
}

#[tokio::test]
async fn test_last_call_opens_the_grace_period() {
    let (state, mailer, _) = create_test_state();
    let router = create_router(state.clone());

    let (status, _) = post_json(router, "/renewals/last-call", r#"{"ids": ["ren_a1"]}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mailer.sent().len(), 1);
    assert_eq!(mailer.sent()[0].stage, "last");

    let repo = state.repo().read().await;
    let task = repo.task("ren_a1").unwrap();
    assert_eq!(task.step, LifecycleStep::FirstCall);
    assert!(task.grace_period);
}

#[tokio::test]
async fn test_reminder_call_covers_both_grace_populations() {
    let (state, mailer, _) = create_test_state();
    let router = create_router(state.clone());

    // ren_a2 is already in grace; ren_a1 is not.
    let (status, _) = post_json(
        router.clone(),
        "/renewals/last-call",
        r#"{"ids": ["ren_a2"]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        router,
        "/renewals/reminder-call",
        r#"{"ids": ["ren_a1", "ren_a2"]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope(&body).success.as_deref(), Some("2 renewal(s) notified."));

    // One last-call notice plus one per reminder stage.
    let sent = mailer.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent[1].reminder);
    assert!(sent[2].reminder);
    assert!(sent[1].subject.starts_with("REMINDER: "));
}

#[tokio::test]
async fn test_notice_lines_carry_schedule_amounts_and_vat() {
    let (state, mailer, _) = create_test_state();
    let router = create_router(state);

    let (status, _) = post_json(
        router,
        "/renewals/first-call",
        r#"{"ids": ["ren_a1"], "send": 1}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // EP qt 5 normal: cost 925, fee 150, VAT 20% on the fee only.
    let sent = mailer.sent();
    let line = &sent[0].lines[0];
    assert_eq!(line.cost, decimal("925"));
    assert_eq!(line.fee, decimal("150"));
    assert_eq!(line.vat, decimal("30.00"));
    assert_eq!(line.total, decimal("1105.00"));
    assert_eq!(sent[0].total, decimal("1105.00"));
}

// =============================================================================
// Invoicing
// =============================================================================

#[tokio::test]
async fn test_invoicing_stops_at_the_missing_client_and_keeps_earlier_invoices() {
    let (state, _, invoicing) = create_test_state();
    let router = create_router(state.clone());

    let (status, body) = post_json(
        router,
        "/renewals/invoice",
        r#"{"ids": ["ren_a1", "ren_a2", "ren_b1"], "create": 1}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let message = envelope(&body).error.unwrap();
    assert!(message.starts_with("1 invoice(s) created."), "{message}");
    assert!(message.contains("Client 'Client B' not found"), "{message}");

    // Client A's invoice survives; its renewals are marked, Client B's is not.
    assert_eq!(invoicing.created().len(), 1);
    let repo = state.repo().read().await;
    assert_eq!(repo.task("ren_a1").unwrap().invoice_step, InvoiceStep::Invoiced);
    assert_eq!(repo.task("ren_a2").unwrap().invoice_step, InvoiceStep::Invoiced);
    assert_eq!(repo.task("ren_b1").unwrap().invoice_step, InvoiceStep::None);
}

#[tokio::test]
async fn test_invoice_lines_split_fee_and_official_cost() {
    let (state, _, invoicing) = create_test_state();
    let router = create_router(state);

    let (status, _) = post_json(
        router,
        "/renewals/invoice",
        r#"{"ids": ["ren_a1"], "create": 1}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let drafts = invoicing.created();
    assert_eq!(drafts.len(), 1);
    // One fee line with VAT, one zero-VAT official cost line.
    assert_eq!(drafts[0].lines.len(), 2);
    assert_eq!(drafts[0].lines[0].amount, decimal("150"));
    assert_eq!(drafts[0].lines[0].vat_rate, decimal("0.20"));
    assert_eq!(drafts[0].lines[1].amount, decimal("925"));
    assert_eq!(drafts[0].lines[1].vat_rate, Decimal::ZERO);
}

#[tokio::test]
async fn test_invoice_without_create_only_marks_the_billing_step() {
    let (state, _, invoicing) = create_test_state();
    let router = create_router(state.clone());

    let (status, _) = post_json(router, "/renewals/invoice", r#"{"ids": ["ren_a1"]}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert!(invoicing.created().is_empty());

    let repo = state.repo().read().await;
    assert_eq!(repo.task("ren_a1").unwrap().invoice_step, InvoiceStep::Invoiced);
}

// =============================================================================
// Exports
// =============================================================================

#[tokio::test]
async fn test_export_returns_one_row_per_renewal_plus_header() {
    let (state, _, _) = create_test_state();
    let router = create_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/renewals/export")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"ids": ["ren_a1", "ren_a2", "ren_b1"]}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "text/csv");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.starts_with("Case,Title,Country,Year,Due date,Step,Cost,Fee\n"));
}

#[tokio::test]
async fn test_renewal_order_rejects_mixed_jurisdictions() {
    let (state, _, _) = create_test_state();
    let router = create_router(state);

    let (status, body) = post_json(
        router,
        "/renewals/renewal-order",
        r#"{"ids": ["ren_a1", "ren_b1"]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = envelope(&body).error.unwrap();
    assert!(message.contains("EP, FR"), "{message}");
}

#[tokio::test]
async fn test_renewal_order_trailer_totals_the_official_costs() {
    let (state, _, _) = create_test_state();
    let router = create_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/renewals/renewal-order")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"ids": ["ren_a1", "ren_a2"]}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/xml"
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let xml = String::from_utf8(bytes.to_vec()).unwrap();
    // EP qt 5 costs 925, qt 4 costs 660.
    assert!(xml.contains("<total-amount>1585</total-amount>"));
    assert!(xml.contains("<record-count>2</record-count>"));
    assert!(xml.contains("<type-of-fee>035</type-of-fee>"));
    assert!(xml.contains("<type-of-fee>034</type-of-fee>"));
}

// =============================================================================
// Audit trail
// =============================================================================

#[tokio::test]
async fn test_each_batch_gets_its_own_job_id() {
    let (state, _, _) = create_test_state();
    let router = create_router(state.clone());

    let (status, _) = post_json(
        router.clone(),
        "/renewals/to-pay",
        r#"{"ids": ["ren_a1", "ren_a2"]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(router, "/renewals/paid", r#"{"ids": ["ren_a1"]}"#).await;
    assert_eq!(status, StatusCode::OK);

    let entries = state.log().entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].job_id, entries[1].job_id);
    assert!(entries[2].job_id > entries[0].job_id);
}

#[tokio::test]
async fn test_logs_endpoint_filters_by_job_id() {
    let (state, _, _) = create_test_state();
    let router = create_router(state.clone());

    let (status, _) = post_json(
        router.clone(),
        "/renewals/to-pay",
        r#"{"ids": ["ren_a1", "ren_a2"]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(
        router.clone(),
        "/renewals/paid",
        r#"{"ids": ["ren_a1"]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let first_job = state.log().entries()[0].job_id;
    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(&format!("/renewals/logs?job_id={}", first_job))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let entries: Vec<Value> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn test_log_entries_record_per_task_prior_state() {
    let (state, _, _) = create_test_state();
    let router = create_router(state.clone());

    // ren_a1 starts from FIRST_CALL, ren_a2 from PENDING.
    let (status, _) = post_json(
        router.clone(),
        "/renewals/first-call",
        r#"{"ids": ["ren_a1"], "send": 0}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(
        router,
        "/renewals/to-pay",
        r#"{"ids": ["ren_a1", "ren_a2"]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let entries = state.log().entries();
    let a1 = entries
        .iter()
        .find(|e| e.task_id == "ren_a1" && e.to_step == LifecycleStep::ToPay)
        .unwrap();
    let a2 = entries
        .iter()
        .find(|e| e.task_id == "ren_a2" && e.to_step == LifecycleStep::ToPay)
        .unwrap();
    assert_eq!(a1.from_step, LifecycleStep::FirstCall);
    assert_eq!(a2.from_step, LifecycleStep::Pending);
}
