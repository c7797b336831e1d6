use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use log::{info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::export::SyncPayload;
use crate::gesture::GestureMode;
use crate::layout::WeekLayout;
use crate::persistence::TaskStore;
use crate::{NewTask, Planner, PlannerError, ProjectInfo, Task, TaskPatch};

pub type SharedStore = Arc<dyn TaskStore + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    planner: Arc<RwLock<Planner>>,
    store: Option<SharedStore>,
}

impl AppState {
    pub fn new(planner: Planner) -> Self {
        Self {
            planner: Arc::new(RwLock::new(planner)),
            store: None,
        }
    }

    /// Saves the snapshot to `store` after every successful write.
    pub fn with_store(planner: Planner, store: SharedStore) -> Self {
        Self {
            planner: Arc::new(RwLock::new(planner)),
            store: Some(store),
        }
    }

    fn planner(&self) -> Arc<RwLock<Planner>> {
        self.planner.clone()
    }

    fn persist(&self, planner: &Planner) -> Result<(), ApiError> {
        if let Some(store) = &self.store {
            planner.save(store.as_ref()).map_err(ApiError::from)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl From<PlannerError> for ApiError {
    fn from(value: PlannerError) -> Self {
        match value {
            PlannerError::NotFound(id) => ApiError::NotFound(format!("task {id} not found")),
            PlannerError::Validation(err) => ApiError::Invalid(err.to_string()),
            PlannerError::Persistence(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                warn!("event=http_error module=http_api status=error message={message}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct MonthQuery {
    date: Option<NaiveDate>,
}

impl MonthQuery {
    fn reference(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[derive(Debug, Deserialize)]
struct ShiftPayload {
    mode: String,
    days: i64,
}

#[derive(Debug, Deserialize)]
struct FilterPayload {
    assignee: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutResponse {
    title: String,
    reference: NaiveDate,
    month_start: NaiveDate,
    month_end: NaiveDate,
    assignee_filter: Option<String>,
    weeks: Vec<WeekLayout>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/project", get(get_project).put(update_project))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task)
                .patch(update_task)
                .put(update_task)
                .delete(delete_task),
        )
        .route("/tasks/:id/shift", post(shift_task))
        .route("/undo", post(undo))
        .route("/assignees", get(list_assignees))
        .route("/filter", get(get_filter).put(set_filter))
        .route("/layout", get(month_layout))
        .route("/sync", get(sync_payload))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("event=http_listen module=http_api status=ok addr={addr}");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_project(State(state): State<AppState>) -> Json<ProjectInfo> {
    let planner = state.planner();
    let project = planner.read().project().clone();
    Json(project)
}

async fn update_project(
    State(state): State<AppState>,
    Json(project): Json<ProjectInfo>,
) -> Result<Json<ProjectInfo>, ApiError> {
    if project.name.trim().is_empty() {
        return Err(ApiError::Invalid("project name must not be empty".into()));
    }
    let planner = state.planner();
    let mut guard = planner.write();
    guard.set_project(project);
    state.persist(&guard)?;
    Ok(Json(guard.project().clone()))
}

async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    let planner = state.planner();
    let tasks = planner.read().visible_tasks();
    Json(tasks)
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let planner = state.planner();
    let task = planner.read().task(&task_id).cloned();
    task.map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("task {task_id} not found")))
}

async fn create_task(
    State(state): State<AppState>,
    Json(data): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let planner = state.planner();
    let mut guard = planner.write();
    let created = guard.add_task(data)?;
    state.persist(&guard)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    let planner = state.planner();
    let mut guard = planner.write();
    let updated = guard.update_task(&task_id, &patch)?;
    state.persist(&guard)?;
    Ok(Json(updated))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let planner = state.planner();
    let mut guard = planner.write();
    guard.delete_task(&task_id)?;
    state.persist(&guard)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn shift_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(payload): Json<ShiftPayload>,
) -> Result<Json<Task>, ApiError> {
    let mode = GestureMode::parse(&payload.mode)
        .ok_or_else(|| ApiError::Invalid(format!("unknown gesture mode '{}'", payload.mode)))?;
    let planner = state.planner();
    let mut guard = planner.write();
    let updated = guard.shift_task(&task_id, mode, payload.days)?;
    state.persist(&guard)?;
    Ok(Json(updated))
}

async fn undo(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let planner = state.planner();
    let mut guard = planner.write();
    let undone = guard.undo();
    if undone {
        state.persist(&guard)?;
    }
    Ok(Json(json!({
        "undone": undone,
        "undoDepth": guard.undo_depth(),
    })))
}

async fn list_assignees(State(state): State<AppState>) -> Json<Vec<String>> {
    let planner = state.planner();
    let assignees = planner.read().assignees();
    Json(assignees)
}

async fn get_filter(State(state): State<AppState>) -> Json<serde_json::Value> {
    let planner = state.planner();
    let guard = planner.read();
    Json(json!({
        "assignee": guard.assignee_filter(),
        "visible": guard.visible_count(),
        "total": guard.tasks().len(),
    }))
}

async fn set_filter(
    State(state): State<AppState>,
    Json(payload): Json<FilterPayload>,
) -> Json<serde_json::Value> {
    let planner = state.planner();
    let mut guard = planner.write();
    guard.set_assignee_filter(payload.assignee);
    Json(json!({
        "assignee": guard.assignee_filter(),
        "visible": guard.visible_count(),
        "total": guard.tasks().len(),
    }))
}

async fn month_layout(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Json<LayoutResponse> {
    let planner = state.planner();
    let guard = planner.read();
    let month = guard.layout(query.reference());
    Json(LayoutResponse {
        title: month.window.title(),
        reference: month.reference,
        month_start: month.window.month_start(),
        month_end: month.window.month_end(),
        assignee_filter: guard.assignee_filter().map(str::to_string),
        weeks: month.weeks,
    })
}

async fn sync_payload(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Json<SyncPayload> {
    let planner = state.planner();
    let guard = planner.read();
    let payload = SyncPayload::new(guard.project(), guard.tasks().as_slice(), query.reference());
    Json(payload)
}
