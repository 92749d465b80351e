//! Axum-based HTTP server for the lift control panel.
//!
//! Provides endpoints for:
//! - GET `/status` - Relay states, position, target and panel text
//! - POST `/floor` - Travel to a level: `{"floor": "1"}`
//! - POST `/control` - Manual drive: `{"direction": "up", "state": true}`
//! - POST `/stop` - Emergency stop
//! - POST `/heartbeat` - Keep the safety watchdog satisfied
//!
//! Anything else is served from the static UI directory when one is
//! configured.
//!
//! Command endpoints answer `200` on success, `400` for a bad request body
//! or unknown level, `409` while the lift position is still unknown, and
//! `500` when a relay write fails.

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::task::JoinError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::commands::{CommandOutcome, ControlError, LiftCommand};
use crate::config::WebConfig;
use crate::messages::{ControlRequest, FloorRequest};
use crate::traits::RelayOutput;

use super::api::{ApiResponse, CommandResponse, StatusResponse};
use super::shared::{blocking, SharedLiftState};

type CommandReply = (StatusCode, Json<ApiResponse<CommandResponse>>);

fn command_reply<E: core::fmt::Debug>(result: Result<CommandOutcome, ControlError<E>>) -> CommandReply {
    match result {
        Ok(outcome) => (StatusCode::OK, Json(ApiResponse::ok(outcome.into()))),
        Err(err) => {
            let code = match &err {
                ControlError::InvalidLevel(_) => StatusCode::BAD_REQUEST,
                ControlError::PositionUnknown => StatusCode::CONFLICT,
                ControlError::Actuator { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (code, Json(ApiResponse::err(err.to_string())))
        }
    }
}

fn bad_request(message: &str) -> CommandReply {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::err(message)))
}

fn task_failed(err: &JoinError) -> CommandReply {
    tracing::error!(error = %err, "controller task failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::err("Controller task failed")),
    )
}

/// Apply `cmd` on the blocking pool.
async fn apply<R>(state: &Arc<SharedLiftState<R>>, cmd: LiftCommand) -> CommandReply
where
    R: RelayOutput + Send + 'static,
    R::Error: Send + 'static,
{
    match blocking(state, move |s| s.apply_command(cmd)).await {
        Ok(result) => command_reply(result),
        Err(err) => task_failed(&err),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /status - Returns the current lift status
async fn get_status<R>(State(state): State<Arc<SharedLiftState<R>>>) -> Response
where
    R: RelayOutput + Send + 'static,
    R::Error: Send + 'static,
{
    match blocking(&state, |s| s.status()).await {
        Ok(status) => Json(StatusResponse::from(&status)).into_response(),
        Err(err) => task_failed(&err).into_response(),
    }
}

/// POST /floor - Start an automatic trip
///
/// Accepts JSON: `{"floor": "G"}`
async fn request_floor<R>(State(state): State<Arc<SharedLiftState<R>>>, body: Bytes) -> CommandReply
where
    R: RelayOutput + Send + 'static,
    R::Error: Send + 'static,
{
    let Ok(request) = serde_json::from_slice::<FloorRequest>(&body) else {
        return bad_request("Invalid floor request");
    };
    match request.command() {
        Ok(cmd) => apply(&state, cmd).await,
        Err(err) => command_reply::<R::Error>(Err(err.into())),
    }
}

/// POST /control - Manual drive or release
///
/// Accepts JSON: `{"direction": "up", "state": true}`
async fn manual_control<R>(State(state): State<Arc<SharedLiftState<R>>>, body: Bytes) -> CommandReply
where
    R: RelayOutput + Send + 'static,
    R::Error: Send + 'static,
{
    let Ok(request) = serde_json::from_slice::<ControlRequest>(&body) else {
        return bad_request("Invalid control request");
    };
    let Some(cmd) = request.command() else {
        return bad_request("Direction must be \"up\" or \"down\"");
    };
    apply(&state, cmd).await
}

/// POST /stop - Emergency stop
async fn emergency_stop<R>(State(state): State<Arc<SharedLiftState<R>>>) -> CommandReply
where
    R: RelayOutput + Send + 'static,
    R::Error: Send + 'static,
{
    apply(&state, LiftCommand::Stop).await
}

/// POST /heartbeat - Panel keep-alive
async fn heartbeat<R>(State(state): State<Arc<SharedLiftState<R>>>) -> CommandReply
where
    R: RelayOutput + Send + 'static,
    R::Error: Send + 'static,
{
    match blocking(&state, |s| s.heartbeat()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok(CommandResponse::accepted("heartbeat"))),
        ),
        Err(err) => task_failed(&err),
    }
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::err("Not found")),
    )
}

// ============================================================================
// Server Builder
// ============================================================================

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
    /// Directory served for paths that are not API routes
    pub static_dir: Option<PathBuf>,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self::from_config(&WebConfig::default())
    }
}

impl WebServerConfig {
    /// Create a new config with the given address and no static files
    pub fn new(addr: impl Into<SocketAddr>) -> Self {
        Self {
            addr: addr.into(),
            cors_permissive: true,
            static_dir: None,
        }
    }

    /// Set whether CORS should be permissive
    pub fn cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Serve static files from `dir`
    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Create from shared WebConfig
    pub fn from_config(config: &WebConfig) -> Self {
        let static_dir = (!config.static_dir.is_empty())
            .then(|| PathBuf::from(config.static_dir.as_str()));
        Self {
            addr: ([0, 0, 0, 0], config.port).into(),
            cors_permissive: config.cors_permissive,
            static_dir,
        }
    }
}

/// Build the Axum router with all routes
pub fn build_router<R>(state: Arc<SharedLiftState<R>>, config: &WebServerConfig) -> Router
where
    R: RelayOutput + Send + 'static,
    R::Error: Send + 'static,
{
    let router = Router::new()
        .route("/status", get(get_status::<R>))
        .route("/floor", post(request_floor::<R>))
        .route("/control", post(manual_control::<R>))
        .route("/stop", post(emergency_stop::<R>))
        .route("/heartbeat", post(heartbeat::<R>));

    // Browser UI, or a JSON 404
    let router = match &config.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(not_found),
    };
    let mut router = router.with_state(state);

    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Run the web server on shared state until `shutdown` resolves.
pub async fn run_server_with_state<R, S>(
    state: Arc<SharedLiftState<R>>,
    config: WebServerConfig,
    shutdown: S,
) -> Result<(), std::io::Error>
where
    R: RelayOutput + Send + 'static,
    R::Error: Send + 'static,
    S: Future<Output = ()> + Send + 'static,
{
    let router = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "web server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
