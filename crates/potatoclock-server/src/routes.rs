use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use potatoclock_core::sync::wire::{
    AddRestIdeaRequest, AddTaskRequest, ErrorBody, FocusResponse, GardenResponse, IdeaResponse,
    PlantRequest, SetFocusRequest, StateQuery, TaskResponse, TimerControlRequest, TimerResponse,
    TimerSetRequest, ToggleDoneRequest,
};
use potatoclock_core::{
    Command, CommandError, CommandOutcome, ErrorKind, SessionHandle, StateResponse,
};

use crate::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/state", get(get_state))
        .route("/tasks", post(add_task))
        .route("/tasks/toggle_done", post(toggle_done))
        .route("/focus/set", post(set_focus))
        .route("/timer/control", post(timer_control))
        .route("/timer/set", post(timer_set))
        .route("/garden/plant", post(plant))
        .route("/rest-ideas", post(add_rest_idea))
        .route("/rest-ideas/suggestion", get(suggest_rest_idea))
}

/// Handler failure rendered as `{ok: false, error: {kind, message}}`.
#[derive(Debug)]
pub enum ApiError {
    Command(CommandError),
    Internal(String),
}

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        ApiError::Command(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Command(CommandError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Command(CommandError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Command(err) => {
                let status = match err {
                    CommandError::Validation(_) => StatusCode::BAD_REQUEST,
                    CommandError::NotFound { .. } => StatusCode::NOT_FOUND,
                    CommandError::InvalidState(_) | CommandError::NotReady { .. } => {
                        StatusCode::CONFLICT
                    }
                };
                (status, ErrorBody::from(err))
            }
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(ErrorKind::Internal, message.clone()),
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn unexpected(outcome: CommandOutcome) -> ApiError {
    ApiError::Internal(format!("unexpected command outcome: {outcome:?}"))
}

/// Run `f` against the session on the blocking pool. Commands hold the
/// session lock while the SQLite save runs, so neither they nor reads
/// waiting on that lock may occupy a runtime worker.
async fn with_session<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&SessionHandle) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let session = state.session.clone();
    tokio::task::spawn_blocking(move || f(&session))
        .await
        .map_err(|e| ApiError::Internal(format!("session task failed: {e}")))?
}

// ---------- handlers ----------

async fn get_state(
    State(state): State<AppState>,
    query: Result<Query<StateQuery>, QueryRejection>,
) -> Result<Json<StateResponse>, ApiError> {
    let Query(query) = query?;
    let since = query.since.unwrap_or(0);
    with_session(&state, move |session| Ok(Json(session.state_since(since)))).await
}

async fn add_task(
    State(state): State<AppState>,
    body: Result<Json<AddTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Json(req) = body?;
    task_command(&state, Command::from(req)).await
}

async fn toggle_done(
    State(state): State<AppState>,
    body: Result<Json<ToggleDoneRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Json(req) = body?;
    task_command(&state, Command::from(req)).await
}

async fn task_command(state: &AppState, command: Command) -> Result<Json<TaskResponse>, ApiError> {
    with_session(state, move |session| {
        let (outcome, progress) = session.execute_then(command, |s| s.progress())?;
        match outcome {
            CommandOutcome::Task(task) => Ok(Json(TaskResponse {
                ok: true,
                task,
                progress,
            })),
            other => Err(unexpected(other)),
        }
    })
    .await
}

async fn set_focus(
    State(state): State<AppState>,
    body: Result<Json<SetFocusRequest>, JsonRejection>,
) -> Result<Json<FocusResponse>, ApiError> {
    let Json(req) = body?;
    with_session(&state, move |session| match session.execute(Command::from(req))? {
        CommandOutcome::Focus(focus) => Ok(Json(FocusResponse { ok: true, focus })),
        other => Err(unexpected(other)),
    })
    .await
}

async fn timer_control(
    State(state): State<AppState>,
    body: Result<Json<TimerControlRequest>, JsonRejection>,
) -> Result<Json<TimerResponse>, ApiError> {
    let Json(req) = body?;
    timer_command(&state, Command::from(req)).await
}

async fn timer_set(
    State(state): State<AppState>,
    body: Result<Json<TimerSetRequest>, JsonRejection>,
) -> Result<Json<TimerResponse>, ApiError> {
    let Json(req) = body?;
    timer_command(&state, Command::from(req)).await
}

async fn timer_command(state: &AppState, command: Command) -> Result<Json<TimerResponse>, ApiError> {
    with_session(state, move |session| match session.execute(command)? {
        CommandOutcome::Timer(timer) => Ok(Json(TimerResponse { ok: true, timer })),
        other => Err(unexpected(other)),
    })
    .await
}

async fn plant(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GardenResponse>, ApiError> {
    // An empty body plants without a task.
    let req: PlantRequest = if body.is_empty() {
        PlantRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| CommandError::Validation(format!("invalid plant request: {e}")))?
    };
    with_session(&state, move |session| match session.execute(Command::from(req))? {
        CommandOutcome::Garden(garden) => Ok(Json(GardenResponse { ok: true, garden })),
        other => Err(unexpected(other)),
    })
    .await
}

async fn add_rest_idea(
    State(state): State<AppState>,
    body: Result<Json<AddRestIdeaRequest>, JsonRejection>,
) -> Result<Json<IdeaResponse>, ApiError> {
    let Json(req) = body?;
    with_session(&state, move |session| match session.execute(Command::from(req))? {
        CommandOutcome::RestIdea(idea) => Ok(Json(IdeaResponse { ok: true, idea })),
        other => Err(unexpected(other)),
    })
    .await
}

async fn suggest_rest_idea(
    State(state): State<AppState>,
) -> Result<Json<IdeaResponse>, ApiError> {
    with_session(&state, |session| {
        let idea = session.suggest_rest_idea()?;
        Ok(Json(IdeaResponse { ok: true, idea }))
    })
    .await
}
