//! HTTP layer.
//!
//! - `GET /` redirects to the frontend's `index.html`
//! - `GET /api/corona/united-states` returns the full breakdown
//! - `GET /api/corona/state/:state` returns one state's breakdown; an
//!   unknown state code is a 400 with `{ "error": "Invalid state: <value>." }`
//! - everything else is served from the frontend directory
//!
//! Each API request triggers one fresh feed fetch; nothing is cached.

use crate::config::AppConfig;
use crate::fips::FipsDirectory;
use crate::ingest::coronadatascraper::get_corona_data;
use crate::ingest::FeedSource;
use crate::logging::{DataSource, SharedLogger};
use crate::model::{CoronaBreakdown, CoronaDataPoint, StateBreakdown};
use crate::states::find_state;
use axum::{
    extract::{Path as UrlPath, State},
    http::{
        header::{CONTENT_TYPE, LOCATION},
        Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub const UNITED_STATES_ROUTE: &str = "/api/corona/united-states";
pub const STATE_ROUTE: &str = "/api/corona/state/:state";

// ---------------------------------------------------------------------------
// State and errors
// ---------------------------------------------------------------------------

/// Everything a request handler needs. Immutable once the server starts.
pub struct AppState<S> {
    pub source: S,
    pub directory: FipsDirectory,
    pub logger: SharedLogger,
}

impl<S: FeedSource> AppState<S> {
    pub fn new(source: S, directory: FipsDirectory, logger: SharedLogger) -> Arc<Self> {
        Arc::new(AppState { source, directory, logger })
    }

    async fn breakdown(&self) -> CoronaBreakdown {
        get_corona_data(&self.source, &self.directory, self.logger.as_ref()).await
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid state: {0}.")]
    InvalidState(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidState(_) => StatusCode::BAD_REQUEST,
        };

        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

/// Body of the per-state route.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nation: Option<CoronaDataPoint>,
    /// `null` when the feed carried nothing for the state.
    pub state: Option<StateBreakdown>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index_redirect() -> impl IntoResponse {
    (StatusCode::FOUND, [(LOCATION, "/index.html")])
}

async fn united_states_handler<S: FeedSource>(
    State(app): State<Arc<AppState<S>>>,
) -> Json<CoronaBreakdown> {
    app.logger.debug(DataSource::Http, Some(UNITED_STATES_ROUTE), "serving country data");
    Json(app.breakdown().await)
}

async fn state_handler<S: FeedSource>(
    State(app): State<Arc<AppState<S>>>,
    UrlPath(state): UrlPath<String>,
) -> Result<Json<StateResponse>, ApiError> {
    let Some(us_state) = find_state(&state) else {
        app.logger.warn(DataSource::Http, Some(&state), "rejected invalid state code");
        return Err(ApiError::InvalidState(state));
    };

    app.logger.debug(DataSource::Http, Some(us_state.name), "serving state data");

    let CoronaBreakdown { nation, mut states } = app.breakdown().await;
    Ok(Json(StateResponse {
        nation,
        state: states.remove(us_state.name),
    }))
}

// ---------------------------------------------------------------------------
// Router and server
// ---------------------------------------------------------------------------

pub fn router<S: FeedSource + 'static>(app: Arc<AppState<S>>, frontend_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(index_redirect))
        .route(UNITED_STATES_ROUTE, get(united_states_handler::<S>))
        .route(STATE_ROUTE, get(state_handler::<S>))
        .fallback_service(ServeDir::new(frontend_dir))
        .layer(cors)
        .with_state(app)
}

pub async fn start_server<S: FeedSource + 'static>(
    config: &AppConfig,
    app: Arc<AppState<S>>,
) -> std::io::Result<()> {
    let logger = app.logger.clone();
    let routes = router(app, &config.server.frontend_dir);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    logger.info(DataSource::Http, None, &format!("Server running on {}", address));

    axum::serve(listener, routes)
        .with_graceful_shutdown(shutdown_signal(logger.clone()))
        .await?;

    logger.info(DataSource::System, None, "Server shut down");
    Ok(())
}

async fn shutdown_signal(logger: SharedLogger) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => logger.info(DataSource::System, None, "Received Ctrl+C, shutting down"),
            Err(e) => {
                logger.error(DataSource::System, None, &format!("Failed to install Ctrl+C handler: {}", e));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                logger.info(DataSource::System, None, "Received terminate signal, shutting down");
            }
            Err(e) => {
                logger.error(DataSource::System, None, &format!("Failed to install signal handler: {}", e));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
