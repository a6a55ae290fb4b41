use ahp_profiler_cli::error::{ErrorKind, RenderError, SubmitError};
use ahp_profiler_cli::model::{ActiveView, ClientConfig, SubmitState};
use ahp_profiler_cli::orchestrator::{SubmissionController, SubmissionForm};
use ahp_profiler_cli::render::DashboardView;
use ahp_profiler_cli::transport::HttpTransport;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
struct ReceivedField {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

#[derive(Clone, Default)]
struct Captured {
    fields: Arc<Mutex<Vec<ReceivedField>>>,
    user_agent: Arc<Mutex<Option<String>>>,
}

async fn drain(captured: &Captured, headers: &HeaderMap, mut multipart: Multipart) {
    let ua = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *captured.user_agent.lock().unwrap() = ua;

    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        fields.push(ReceivedField {
            name,
            file_name,
            content_type,
            data,
        });
    }
    *captured.fields.lock().unwrap() = fields;
}

fn scenario_a() -> Value {
    json!({
        "student_metadata": {"name": "Alice", "id": "S1", "gpa": 3.8},
        "recommendations": [{
            "rank": 1,
            "profile": "Data Science",
            "score": 0.8912,
            "explanation": "Strong analytics",
            "details": {"foundation_score": 0.9, "competency_score": 0.85, "density_score": 0.88}
        }]
    })
}

async fn analyze_ok(
    State(captured): State<Captured>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    drain(&captured, &headers, multipart).await;
    Json(scenario_a()).into_response()
}

async fn analyze_too_large(
    State(captured): State<Captured>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    drain(&captured, &headers, multipart).await;
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"detail": "file too large"})),
    )
        .into_response()
}

async fn analyze_bare_error(
    State(captured): State<Captured>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    drain(&captured, &headers, multipart).await;
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))).into_response()
}

async fn analyze_empty(
    State(captured): State<Captured>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    drain(&captured, &headers, multipart).await;
    Json(json!({
        "student_metadata": {"name": "Alice", "id": "S1", "gpa": 3.8},
        "recommendations": []
    }))
    .into_response()
}

async fn analyze_not_json(
    State(captured): State<Captured>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    drain(&captured, &headers, multipart).await;
    (StatusCode::OK, "<html>maintenance</html>").into_response()
}

async fn spawn_service(captured: Captured) -> String {
    let app = Router::new()
        .route("/ok", post(analyze_ok))
        .route("/too-large", post(analyze_too_large))
        .route("/bare-error", post(analyze_bare_error))
        .route("/empty", post(analyze_empty))
        .route("/not-json", post(analyze_not_json))
        .with_state(captured);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(endpoint: String) -> ClientConfig {
    ClientConfig {
        endpoint,
        user_agent: "ahp-profiler-test/0".into(),
        connect_timeout_ms: 2_000,
        certificate_path: None,
        check_weight_sum: false,
    }
}

fn transcript() -> (tempfile::NamedTempFile, SubmissionForm) {
    let mut file = tempfile::Builder::new()
        .prefix("transcript")
        .suffix(".pdf")
        .tempfile()
        .unwrap();
    file.write_all(b"%PDF-1.4 fake transcript").unwrap();
    let form = SubmissionForm {
        document: Some(file.path().to_path_buf()),
        w_foundation: "0.2".into(),
        w_competency: "0.5".into(),
        w_density: "0.3".into(),
    };
    (file, form)
}

fn controller(endpoint: String) -> SubmissionController<HttpTransport> {
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let transport = HttpTransport::new(&config(endpoint)).unwrap();
    SubmissionController::new(transport, false, tx)
}

#[tokio::test]
async fn scenario_a_renders_dashboard_and_sends_multipart_fields() {
    let captured = Captured::default();
    let base = spawn_service(captured.clone()).await;
    let mut ctrl = controller(format!("{base}/ok"));
    let (_file, form) = transcript();
    let mut view = DashboardView::default();

    ctrl.submit(&form, &mut view).await.unwrap();

    assert_eq!(ctrl.state(), SubmitState::Success);
    assert_eq!(view.active_view, ActiveView::Results);
    assert_eq!(view.metadata.as_deref(), Some("Alice | ID: S1 | GPA: 3.8"));
    let top = view.top.as_ref().unwrap();
    assert_eq!(top.profile, "Data Science");
    assert_eq!(top.score_text, "89.1% Match");
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].to_string(), "1. Data Science — 0.8912");
    let chart = view.chart.as_ref().unwrap();
    assert_eq!(chart.series[0].data, vec![0.9]);

    let fields = captured.fields.lock().unwrap().clone();
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["file", "w_foundation", "w_competency", "w_density"]);
    assert_eq!(fields[0].content_type.as_deref(), Some("application/pdf"));
    assert!(fields[0].file_name.as_deref().unwrap().ends_with(".pdf"));
    assert_eq!(fields[0].data, b"%PDF-1.4 fake transcript");
    assert_eq!(fields[1].data, b"0.2");
    assert_eq!(fields[2].data, b"0.5");
    assert_eq!(fields[3].data, b"0.3");
    assert_eq!(
        captured.user_agent.lock().unwrap().as_deref(),
        Some("ahp-profiler-test/0")
    );
}

#[tokio::test]
async fn scenario_b_service_detail_is_shown_and_trigger_reenabled() {
    let base = spawn_service(Captured::default()).await;
    let mut ctrl = controller(format!("{base}/too-large"));
    let (_file, form) = transcript();
    let mut view = DashboardView::default();

    let err = ctrl.submit(&form, &mut view).await.unwrap_err();

    assert_eq!(
        err,
        SubmitError::Service {
            status: 500,
            message: "file too large".into()
        }
    );
    assert_eq!(ctrl.state(), SubmitState::Failed);
    assert_eq!(ctrl.view().error.as_deref(), Some("file too large"));
    assert!(ctrl.view().trigger_enabled);
}

#[tokio::test]
async fn scenario_c_bare_error_uses_generic_message() {
    let base = spawn_service(Captured::default()).await;
    let mut ctrl = controller(format!("{base}/bare-error"));
    let (_file, form) = transcript();
    let mut view = DashboardView::default();

    let err = ctrl.submit(&form, &mut view).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServiceFailure);
    assert_eq!(ctrl.view().error.as_deref(), Some("Analysis failed"));
}

#[tokio::test]
async fn scenario_d_connection_refused_surfaces_transport_message() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut ctrl = controller(format!("http://{addr}/api/v1/analyze"));
    let (_file, form) = transcript();
    let mut view = DashboardView::default();

    let err = ctrl.submit(&form, &mut view).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportFailure);
    let shown = ctrl.view().error.clone().unwrap();
    assert!(!shown.is_empty());
    assert_eq!(shown, err.to_string());
    assert!(ctrl.view().trigger_enabled);
}

#[tokio::test]
async fn scenario_e_empty_recommendations_fail_fast() {
    let base = spawn_service(Captured::default()).await;
    let mut ctrl = controller(format!("{base}/empty"));
    let (_file, form) = transcript();
    let mut view = DashboardView::default();

    let err = ctrl.submit(&form, &mut view).await.unwrap_err();
    assert_eq!(err, SubmitError::Render(RenderError::EmptyRecommendations));
    assert!(view.top.is_none());
    assert!(view.metadata.is_none());
    assert_eq!(view.active_view, ActiveView::Submission);
    assert!(ctrl.view().trigger_enabled);
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    let base = spawn_service(Captured::default()).await;
    let mut ctrl = controller(format!("{base}/not-json"));
    let (_file, form) = transcript();
    let mut view = DashboardView::default();

    let err = ctrl.submit(&form, &mut view).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    assert_eq!(ctrl.state(), SubmitState::Failed);
}

#[tokio::test]
async fn retry_after_failure_clears_error_and_succeeds() {
    let base = spawn_service(Captured::default()).await;
    let (_file, mut form) = transcript();
    let mut view = DashboardView::default();

    // A missing weight fails locally before any request is made.
    form.w_density.clear();
    let mut ctrl = controller(format!("{base}/ok"));
    let err = ctrl.submit(&form, &mut view).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationPrecondition);
    assert!(ctrl.view().error.is_some());

    form.w_density = "0.3".into();
    ctrl.submit(&form, &mut view).await.unwrap();
    assert_eq!(ctrl.view().error, None);
    assert_eq!(ctrl.view().active_view, ActiveView::Results);
}
