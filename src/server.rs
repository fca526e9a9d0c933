use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::{RenderError, ViewError, error_chain};
use crate::k8s::KanisterApi;
use crate::pipeline::build_view;
use crate::render::Renderer;

pub struct AppState<A> {
    pub api: Arc<A>,
    pub renderer: Arc<Renderer>,
    pub namespace: Arc<str>,
    pub fetch_timeout: Duration,
    pub shutdown: CancellationToken,
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            renderer: Arc::clone(&self.renderer),
            namespace: Arc::clone(&self.namespace),
            fetch_timeout: self.fetch_timeout,
            shutdown: self.shutdown.clone(),
        }
    }
}

/// Failure of a page request. The body stays generic; details go to the log.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::View(ViewError::Fetch { collection, .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to list Kanister {collection}"),
            ),
            Self::View(ViewError::Normalize { collection, .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to decode Kanister {collection}"),
            ),
            Self::View(ViewError::Cancelled) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Server is shutting down".to_string(),
            ),
            Self::View(ViewError::DeadlineExceeded(_)) => (
                StatusCode::GATEWAY_TIMEOUT,
                "Timed out listing Kanister resources".to_string(),
            ),
            Self::Render(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to execute HTML template".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let chain = error_chain(&self);
        match &self {
            Self::View(view_error) => error!(
                stage = view_error.stage(),
                collection = view_error.collection().map(|c| c.title()),
                "{chain}"
            ),
            Self::Render(_) => error!(stage = "render", "{chain}"),
        }
        (status, message).into_response()
    }
}

pub fn build_router<A: KanisterApi>(state: AppState<A>, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index::<A>))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index<A: KanisterApi>(State(state): State<AppState<A>>) -> Result<Html<String>, AppError> {
    let token = state.shutdown.child_token();
    let view = build_view(
        state.api.as_ref(),
        &state.namespace,
        &token,
        state.fetch_timeout,
    )
    .await?;
    let html = state.renderer.render(&view)?;
    Ok(Html(html))
}

pub async fn serve(listener: TcpListener, router: Router, shutdown: CancellationToken) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Kanister visualiser listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

/// Cancels `shutdown` on Ctrl-C or SIGTERM.
pub async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                warn!("failed to listen for SIGTERM: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
        () = shutdown.cancelled() => return,
    }

    info!("shutdown requested");
    shutdown.cancel();
}
