//! Integration tests for the dashboard web API.
//!
//! Requests go straight into the router, without binding a port.

#![cfg(feature = "gui")]

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use carepath::gui::{AppState, router};
use carepath::session::Dashboard;
use carepath::storage::TableStore;
use common::{SAMPLE_CSV, TestEnv};
use tower::ServiceExt;

fn app(env: &TestEnv) -> Router {
    let store = TableStore::open(&env.file("sheet.csv")).unwrap();
    router(AppState::new(Dashboard::open(store).unwrap()))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> serde_json::Value {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_index_is_served() {
    let env = TestEnv::sample();
    let request = Request::get("/").body(Body::empty()).unwrap();
    let (status, body) = send(&app(&env), request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("<title>Carepath</title>"));
}

#[tokio::test]
async fn test_dashboard_initial_view() {
    let env = TestEnv::sample();
    let view = get_json(&app(&env), "/api/dashboard").await;

    assert_eq!(view["record_count"], 6);
    assert_eq!(view["rows"].as_array().unwrap().len(), 6);
    assert_eq!(view["cascade"]["pathway"]["selected"], 0);
    assert_eq!(view["status_options"][2], "Done");
    assert_eq!(view["summary"]["selected"]["pathway"], "Cardiologia");
    assert_eq!(view["export_filename"], "tarefas_filtradas.csv");
}

#[tokio::test]
async fn test_dashboard_cascade_query() {
    let env = TestEnv::sample();
    let view = get_json(&app(&env), "/api/dashboard?pathway=Diabetes&phase=C").await;

    assert_eq!(view["cascade"]["phase"]["options"][1], "C");
    assert_eq!(view["cascade"]["phase"]["selected"], 1);
    assert_eq!(view["cascade"]["task"]["options"][0], "9");
    assert_eq!(view["cascade"]["phase"]["clamped"], false);
}

#[tokio::test]
async fn test_edit_persists_and_updates_view() {
    let env = TestEnv::sample();
    let app = app(&env);

    let (status, out) = send_json(
        &app,
        "POST",
        "/api/edit",
        serde_json::json!({
            "pathway": "Diabetes", "phase": "A", "task": "1",
            "status": "Done", "note": "dropped"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["kind"], "edited");
    assert_eq!(out["result"]["outcome"], "updated");

    assert!(env.read("sheet.csv").contains("Diabetes,A,1,Done,\n"));
    let view = get_json(&app, "/api/dashboard").await;
    assert_eq!(view["summary"]["by_pathway"][1]["percent"], 100.0);
}

#[tokio::test]
async fn test_edit_invalid_status_is_bad_request() {
    let env = TestEnv::sample();
    let (status, out) = send_json(
        &app(&env),
        "POST",
        "/api/edit",
        serde_json::json!({
            "pathway": "Diabetes", "phase": "A", "task": "1", "status": "Later"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(out["error"].as_str().unwrap().contains("Unknown status"));
    assert_eq!(env.read("sheet.csv"), SAMPLE_CSV);
}

#[tokio::test]
async fn test_edit_save_failure_is_server_error() {
    let env = TestEnv::new();
    let data = env.file("data");
    std::fs::create_dir(&data).unwrap();
    std::fs::write(data.join("sheet.csv"), SAMPLE_CSV).unwrap();
    let store = TableStore::open(&data.join("sheet.csv")).unwrap();
    let app = router(AppState::new(Dashboard::open(store).unwrap()));

    std::fs::remove_dir_all(&data).unwrap();

    let (status, out) = send_json(
        &app,
        "POST",
        "/api/edit",
        serde_json::json!({
            "pathway": "Diabetes", "phase": "A", "task": "1", "status": "done"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(out["error"].as_str().unwrap().contains("IO error"));
}

#[tokio::test]
async fn test_edit_target_preselects_form() {
    let env = TestEnv::sample();
    let app = app(&env);

    let (status, out) = send_json(
        &app,
        "POST",
        "/api/edit-target",
        serde_json::json!({ "pathway": "Cardiologia", "phase": "B", "task": "2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["kind"], "edit_target_set");

    let view = get_json(&app, "/api/dashboard").await;
    assert_eq!(view["pending_edit"]["task"], "2");
    assert_eq!(view["cascade"]["phase"]["selected"], 1);
    assert_eq!(view["cascade"]["task"]["selected"], 1);
}

#[tokio::test]
async fn test_new_pathway_is_listed() {
    let env = TestEnv::sample();
    let app = app(&env);

    let (status, out) = send_json(
        &app,
        "POST",
        "/api/pathways",
        serde_json::json!({ "name": "Oncologia" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["result"]["added"], 5);

    let view = get_json(&app, "/api/dashboard").await;
    assert_eq!(view["record_count"], 11);
    assert_eq!(view["filter_options"]["pathways"][2], "Oncologia");
}

#[tokio::test]
async fn test_filters_drive_rows_and_export() {
    let env = TestEnv::sample();
    let app = app(&env);

    let (status, out) = send_json(
        &app,
        "PUT",
        "/api/filters",
        serde_json::json!({ "pathways": ["Diabetes"], "statuses": ["Done"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["kind"], "filters_set");

    let view = get_json(&app, "/api/dashboard").await;
    assert_eq!(view["rows"].as_array().unwrap().len(), 1);
    assert_eq!(view["rows"][0]["index"], 5);

    let response = app
        .clone()
        .oneshot(Request::get("/api/export").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"tarefas_filtradas.csv\""
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(
        String::from_utf8(body.to_vec()).unwrap(),
        "pathway,phase,task,status,note\nDiabetes,C,9,Done,\n"
    );
}

#[tokio::test]
async fn test_portuguese_sheet_sends_status_labels() {
    let env = TestEnv::with_sheet(common::SAMPLE_PT_CSV);
    let view = get_json(&app(&env), "/api/dashboard").await;

    assert_eq!(view["rows"][1]["status"], "Ongoing");
    assert_eq!(view["rows"][1]["status_label"], "Ação Contínua");
    assert_eq!(view["filter_options"]["statuses"][0], "Done");
    assert_eq!(view["filter_options"]["status_labels"][0], "Concluído");
    assert_eq!(view["status_options"][0], "Pendente");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_edits_are_all_saved() {
    let env = TestEnv::sample();
    let app = app(&env);

    let edit = |pathway: &'static str, phase: &'static str, task: &'static str| {
        send_json(
            &app,
            "POST",
            "/api/edit",
            serde_json::json!({
                "pathway": pathway, "phase": phase, "task": task, "status": "Done"
            }),
        )
    };
    let (first, second, view) = tokio::join!(
        edit("Diabetes", "A", "1"),
        edit("Cardiologia", "B", "1"),
        get_json(&app, "/api/dashboard"),
    );
    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);
    assert_eq!(view["record_count"], 6);

    let sheet = env.read("sheet.csv");
    assert!(sheet.contains("Diabetes,A,1,Done,\n"));
    assert!(sheet.contains("Cardiologia,B,1,Done,\n"));
}
