//! Transport Boundary
//!
//! Builds the axum router over the two consistency services and maps their
//! outcomes to HTTP responses. No business rule lives here: `ApiError` is a
//! pure translation from error kind to status code.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Json,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::models::{FieldError, ValidationError};
use crate::routes;
use crate::services::{ClientService, SalesRepService, ServiceError};
use crate::storage::{ClientRepository, SalesRepRepository};

#[derive(Clone)]
pub struct AppState {
    pub clients: Arc<ClientService>,
    pub sales_reps: Arc<SalesRepService>,
}

impl AppState {
    pub fn new(clients: ClientService, sales_reps: SalesRepService) -> Self {
        Self {
            clients: Arc::new(clients),
            sales_reps: Arc::new(sales_reps),
        }
    }

    /// Wires both services to one backend that stores both record kinds.
    pub fn from_store<S>(store: S) -> Self
    where
        S: ClientRepository + SalesRepRepository + 'static,
    {
        let store = Arc::new(store);
        let client_repo: Arc<dyn ClientRepository> = store.clone();
        let rep_repo: Arc<dyn SalesRepRepository> = store;
        Self::new(
            ClientService::new(client_repo.clone(), rep_repo.clone()),
            SalesRepService::new(rep_repo, client_repo),
        )
    }
}

/// Everything a handler can fail with.
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    /// Body that could not be read as the expected JSON shape.
    MalformedBody(String),
    Validation(ValidationError),
    Service(ServiceError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clients: Vec<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MalformedBody(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::ReferenceNotFound(_)) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::DependentRecordsExist(_)) => StatusCode::CONFLICT,
            ApiError::Service(ServiceError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Storage details stay in the log; callers get a generic message.
    pub fn body(&self) -> ErrorBody {
        let mut body = ErrorBody {
            message: String::new(),
            errors: Vec::new(),
            clients: Vec::new(),
        };
        match self {
            ApiError::NotFound => body.message = "resource not found".to_string(),
            ApiError::MalformedBody(reason) => body.message = reason.clone(),
            ApiError::Validation(e) => {
                body.message = "validation failed".to_string();
                body.errors = e.errors.clone();
            }
            ApiError::Service(ServiceError::Storage(_)) => {
                body.message = "internal server error".to_string();
            }
            ApiError::Service(err) => {
                body.message = err.to_string();
                if let ServiceError::DependentRecordsExist(names) = err {
                    body.clients = names.clone();
                }
            }
        }
        body
    }

    fn log(&self) {
        if let ApiError::Service(ServiceError::Storage(e)) = self {
            error!("Request failed in storage: {:?}", e);
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

// Ids that do not parse cannot name a stored record.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        debug!("Rejected path: {}", rejection.body_text());
        ApiError::NotFound
    }
}

/// `Json` whose rejections are answered like any other bad input.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathId<T>(pub T);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(self.body())).into_response()
    }
}

/// HTML flavour of `ApiError`, for fragment handlers.
pub struct HtmlError(pub ApiError);

impl From<ApiError> for HtmlError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl From<ServiceError> for HtmlError {
    fn from(err: ServiceError) -> Self {
        Self(ApiError::Service(err))
    }
}

impl From<ValidationError> for HtmlError {
    fn from(err: ValidationError) -> Self {
        Self(ApiError::Validation(err))
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        self.0.log();
        let status = self.0.status();
        (status, routes::ui::render_error(&self.0.body())).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::api::routes())
        .merge(routes::ui::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Customers server listening at http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
