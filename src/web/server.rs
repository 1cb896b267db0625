//! axum server and route handlers.

use axum::{
    Router,
    extract::{Form, Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use super::templates;
use crate::db::TaskStore;
use crate::error::{ApiError, ErrorCode, StoreError, StoreResult};
use crate::types::Task;
use crate::validate::validate_title;

/// State shared across handlers.
#[derive(Clone)]
pub struct WebServer {
    store: TaskStore,
}

impl WebServer {
    pub fn new(store: TaskStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Run a store operation on the blocking pool so a busy database does
    /// not stall the async workers.
    async fn run<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&TaskStore) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || op(&store)).await?
    }
}

/// A storage fault surfaced to an HTML route.
#[derive(Debug)]
pub struct PageError(StoreError);

impl From<StoreError> for PageError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "Task store operation failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(templates::render_error(&self.0.to_string())),
        )
            .into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.code {
            ErrorCode::ValidationRejected => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::StorageFault => {
                error!(error = %self.message, "Task store operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(self)).into_response()
    }
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Form data for the add route. A missing field is treated as empty.
#[derive(Debug, Deserialize)]
struct AddTaskForm {
    #[serde(default)]
    title: String,
}

/// JSON body for task creation. A missing title is treated as empty.
#[derive(Debug, Deserialize)]
struct CreateTaskRequest {
    #[serde(default)]
    title: String,
}

/// Index page with the add form and every task.
async fn index(State(state): State<WebServer>) -> Result<Html<String>, PageError> {
    let tasks = state.run(|store| store.list_tasks()).await?;
    Ok(Html(templates::render_index(&tasks)))
}

/// Add a task from the form, then go back to the list.
///
/// A rejected title is dropped without touching the store.
async fn add_task(
    State(state): State<WebServer>,
    Form(form): Form<AddTaskForm>,
) -> Result<Redirect, PageError> {
    let title = form.title.trim().to_owned();

    match validate_title(&title) {
        Ok(()) => {
            let id = state
                .run({
                    let title = title.clone();
                    move |store| store.create_task(&title)
                })
                .await?;
            info!(task_id = id, title = %title, "Task created");
        }
        Err(reason) => {
            debug!(reason = %reason, "Rejected task title");
        }
    }

    Ok(Redirect::to("/"))
}

/// Mark a task done. Unknown ids are ignored.
async fn complete_task(
    State(state): State<WebServer>,
    Path(task_id): Path<i64>,
) -> Result<Redirect, PageError> {
    let affected = state.run(move |store| store.complete_task(task_id)).await?;
    if affected == 0 {
        debug!(task_id, "Complete on unknown task ignored");
    } else {
        info!(task_id, "Task completed");
    }
    Ok(Redirect::to("/"))
}

/// Delete a task. Unknown ids are ignored.
async fn delete_task(
    State(state): State<WebServer>,
    Path(task_id): Path<i64>,
) -> Result<Redirect, PageError> {
    let affected = state.run(move |store| store.delete_task(task_id)).await?;
    if affected == 0 {
        debug!(task_id, "Delete on unknown task ignored");
    } else {
        info!(task_id, "Task deleted");
    }
    Ok(Redirect::to("/"))
}

/// JSON list of every task in id order.
async fn api_list_tasks(State(state): State<WebServer>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.run(|store| store.list_tasks()).await?))
}

/// JSON task creation. Unlike the form route, a rejected title is reported.
///
/// An unreadable body is reported in the same error shape as a bad title.
async fn api_create_task(
    State(state): State<WebServer>,
    request: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(request) = request.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "Rejected task body");
        ApiError::rejected("title", rejection.body_text())
    })?;
    let title = request.title.trim().to_owned();
    validate_title(&title).map_err(|reason| ApiError::rejected("title", reason))?;

    let id = state
        .run({
            let title = title.clone();
            move |store| store.create_task(&title)
        })
        .await?;
    info!(task_id = id, title = %title, "Task created");

    Ok((
        StatusCode::CREATED,
        Json(Task {
            id,
            title,
            is_done: false,
        }),
    ))
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router with all routes.
///
/// No CORS layer: the page and its form are same-origin, and the JSON
/// routes must stay unreadable from other origins.
pub fn build_router(state: WebServer) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/add", post(add_task))
        .route("/complete/{task_id}", get(complete_task))
        .route("/delete/{task_id}", get(delete_task))
        .route("/api/tasks", get(api_list_tasks).post(api_create_task))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn serve_until<F>(store: TaskStore, addr: SocketAddr, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("To-do server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(WebServer::new(store)))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("To-do server stopped");
    Ok(())
}

/// Start the HTTP server in the background.
///
/// Returns a oneshot sender that signals shutdown, and the address the
/// server is bound to (useful with port 0).
pub async fn start_server(
    store: TaskStore,
    addr: SocketAddr,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;
    let app = build_router(WebServer::new(store));

    info!("To-do server listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
        {
            error!("To-do server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_state() -> (TempDir, WebServer) {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::new(dir.path().join("todo.db"));
        store.init().unwrap();
        (dir, WebServer::new(store))
    }

    fn add_form(title: &str) -> Form<AddTaskForm> {
        Form(AddTaskForm {
            title: title.to_string(),
        })
    }

    #[tokio::test]
    async fn add_trims_before_storing() {
        let (_dir, state) = setup_state();

        let response = add_task(State(state.clone()), add_form("  Buy milk  "))
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let tasks = state.store().list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy milk");
        assert!(!tasks[0].is_done);
    }

    #[tokio::test]
    async fn add_drops_rejected_titles() {
        let (_dir, state) = setup_state();
        let too_long = "x".repeat(201);

        for title in ["", "   ", "Robert'); DROP TABLE tasks;--", too_long.as_str()] {
            let response = add_task(State(state.clone()), add_form(title))
                .await
                .unwrap()
                .into_response();
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
        }

        assert!(state.store().list_tasks().unwrap().is_empty());
    }

    #[tokio::test]
    async fn complete_and_delete_redirect_even_for_unknown_ids() {
        let (_dir, state) = setup_state();

        let response = complete_task(State(state.clone()), Path(999))
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");

        let response = delete_task(State(state.clone()), Path(999))
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        assert!(state.store().list_tasks().unwrap().is_empty());
    }

    #[tokio::test]
    async fn api_create_reports_rejection() {
        let (_dir, state) = setup_state();

        let err = api_create_task(
            State(state.clone()),
            Ok(Json(CreateTaskRequest {
                title: "no <tags>".to_string(),
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationRejected);
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        assert!(state.store().list_tasks().unwrap().is_empty());
    }

    #[tokio::test]
    async fn api_create_returns_new_task() {
        let (_dir, state) = setup_state();

        let (status, Json(task)) = api_create_task(
            State(state.clone()),
            Ok(Json(CreateTaskRequest {
                title: " Write report ".to_string(),
            })),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(task.title, "Write report");
        assert!(!task.is_done);

        let Json(listed) = api_list_tasks(State(state)).await.unwrap();
        assert_eq!(listed, vec![task]);
    }

    #[tokio::test]
    async fn storage_fault_becomes_500() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened as a database file.
        let state = WebServer::new(TaskStore::new(dir.path()));

        let response = index(State(state)).await.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_json_title_reads_as_empty() {
        let request: CreateTaskRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.title, "");
    }

    #[tokio::test]
    async fn api_create_reports_missing_title_as_rejection() {
        let (_dir, state) = setup_state();

        let err = api_create_task(
            State(state.clone()),
            Ok(Json(CreateTaskRequest {
                title: String::new(),
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationRejected);
        assert_eq!(err.field.as_deref(), Some("title"));
    }

    #[tokio::test]
    async fn store_work_panicking_surfaces_as_store_error() {
        let (_dir, state) = setup_state();

        let result: StoreResult<()> = state.run(|_| panic!("store worker died")).await;
        assert!(matches!(result, Err(StoreError::Worker(_))));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn handlers_run_on_a_single_worker_runtime() {
        let (_dir, state) = setup_state();

        let response = add_task(State(state.clone()), add_form("On one thread"))
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let Json(tasks) = api_list_tasks(State(state)).await.unwrap();
        assert_eq!(tasks.len(), 1);
    }
}
