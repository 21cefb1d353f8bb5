//! Web server for serving the dashboard page and API endpoints

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::cascade::FormChoice;
use crate::models::{TaskKey, TaskStatus};
use crate::session::{Dashboard, Event};
use crate::view::FilterSelection;
use crate::{Error, Result};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The one dashboard session this server hosts (wrapped in Mutex so events run one at a time)
    pub dashboard: Arc<Mutex<Dashboard>>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard: Arc::new(Mutex::new(dashboard)),
        }
    }
}

/// Build the router for the page and its API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/edit", post(post_edit))
        .route("/api/edit-target", post(post_edit_target))
        .route("/api/pathways", post(post_pathway))
        .route("/api/filters", put(put_filters))
        .route("/api/export", get(get_export))
        .with_state(state)
}

/// Start the dashboard web server
pub async fn start_server(dashboard: Dashboard, host: &str, port: u16) -> Result<()> {
    let app = router(AppState::new(dashboard));

    let host_addr: std::net::IpAddr = host
        .parse()
        .map_err(|_| Error::Config(format!("Invalid host address: {}", host)))?;
    let addr = SocketAddr::from((host_addr, port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!(address = %local, "dashboard listening");
    println!("Carepath dashboard running at: http://{}", local);
    println!("Press Ctrl+C to stop");

    axum::serve(listener, app).await?;

    Ok(())
}

type ApiError = (StatusCode, Json<serde_json::Value>);

/// Invalid input maps to 400; storage failures map to 500.
fn api_error(error: Error) -> ApiError {
    let status = match error {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(%error, "dashboard request failed");
    }
    (status, Json(serde_json::json!({ "error": error.to_string() })))
}

/// Run `work` against the session on the blocking pool.
///
/// The session lock is held until `work` returns, so sheet reads and
/// writes stay serialized without stalling the async workers.
async fn with_dashboard<T, F>(state: &AppState, work: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce(&mut Dashboard) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let mut dashboard = state.dashboard.clone().lock_owned().await;
    tokio::task::spawn_blocking(move || work(&mut dashboard))
        .await
        .map_err(|e| api_error(Error::Io(e.into())))?
        .map_err(api_error)
}

async fn dispatch(
    state: &AppState,
    event: Event,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    let outcome = with_dashboard(state, move |dashboard| dashboard.dispatch(event)).await?;
    let value = serde_json::to_value(outcome).map_err(|e| api_error(e.into()))?;
    Ok(Json(value))
}

/// Serve the main HTML page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("index.html"))
}

/// Rebuild the whole page model for the current form choices
async fn get_dashboard(
    State(state): State<AppState>,
    Query(form): Query<FormChoice>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    let view = with_dashboard(&state, move |dashboard| dashboard.view(&form)).await?;
    let value = serde_json::to_value(view).map_err(|e| api_error(e.into()))?;
    Ok(Json(value))
}

#[derive(Deserialize)]
struct EditRequest {
    pathway: String,
    phase: String,
    task: String,
    status: String,
    #[serde(default)]
    note: Option<String>,
}

/// Save a status/note edit
async fn post_edit(
    State(state): State<AppState>,
    Json(req): Json<EditRequest>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    let status: TaskStatus = req
        .status
        .parse()
        .map_err(|e| api_error(Error::InvalidInput(e)))?;
    let event = Event::Edit {
        key: TaskKey::new(req.pathway, req.phase, req.task),
        status,
        note: req.note,
    };
    dispatch(&state, event).await
}

/// Pre-select a browsed row in the edit form
async fn post_edit_target(
    State(state): State<AppState>,
    Json(key): Json<TaskKey>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    dispatch(&state, Event::SelectForEdit { key }).await
}

#[derive(Deserialize)]
struct PathwayRequest {
    name: String,
}

/// Create a pathway from the template pairs
async fn post_pathway(
    State(state): State<AppState>,
    Json(req): Json<PathwayRequest>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    dispatch(&state, Event::AppendPathway { name: req.name }).await
}

/// Replace the browse filters
async fn put_filters(
    State(state): State<AppState>,
    Json(filters): Json<FilterSelection>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    dispatch(&state, Event::SetFilters { filters }).await
}

/// Download the filtered rows as CSV
async fn get_export(State(state): State<AppState>) -> std::result::Result<Response, ApiError> {
    let (bytes, filename) = with_dashboard(&state, |dashboard| {
        let bytes = dashboard.export()?;
        Ok((bytes, dashboard.export_filename().to_string()))
    })
    .await?;
    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
