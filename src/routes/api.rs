//! JSON REST endpoints

use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{ClientPayload, ClientView, SalesRepPayload, SalesRepView};
use crate::server::{ApiError, AppState, JsonBody, PathId};

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/clients", get(list_clients).post(create_client))
        .route(
            "/api/clients/{id}",
            get(get_client).put(update_client).delete(delete_client),
        )
        .route("/api/salesreps", get(list_sales_reps).post(create_sales_rep))
        .route(
            "/api/salesreps/{id}",
            get(get_sales_rep).put(update_sales_rep).delete(delete_sales_rep),
        )
}

fn created(location: String, id: Uuid) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CreatedResponse { id }),
    )
}

fn no_content_or_missing(found: bool) -> Result<StatusCode, ApiError> {
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

async fn list_clients(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClientView>>, ApiError> {
    Ok(Json(state.clients.list_all().await?))
}

async fn get_client(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
) -> Result<Json<ClientView>, ApiError> {
    state
        .clients
        .get_details(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn create_client(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let input = payload.validate()?;
    let id = state.clients.create(input).await?;
    Ok(created(format!("/api/clients/{}", id), id))
}

async fn update_client(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
    JsonBody(payload): JsonBody<ClientPayload>,
) -> Result<StatusCode, ApiError> {
    let input = payload.validate()?;
    no_content_or_missing(state.clients.update(id, input).await?)
}

async fn delete_client(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
) -> Result<StatusCode, ApiError> {
    no_content_or_missing(state.clients.delete(id).await?)
}

async fn list_sales_reps(
    State(state): State<AppState>,
) -> Result<Json<Vec<SalesRepView>>, ApiError> {
    Ok(Json(state.sales_reps.list_all().await?))
}

async fn get_sales_rep(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
) -> Result<Json<SalesRepView>, ApiError> {
    state
        .sales_reps
        .get_details(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn create_sales_rep(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SalesRepPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let input = payload.validate()?;
    let id = state.sales_reps.create(input).await?;
    Ok(created(format!("/api/salesreps/{}", id), id))
}

async fn update_sales_rep(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
    JsonBody(payload): JsonBody<SalesRepPayload>,
) -> Result<StatusCode, ApiError> {
    let input = payload.validate()?;
    no_content_or_missing(state.sales_reps.update(id, input).await?)
}

async fn delete_sales_rep(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
) -> Result<StatusCode, ApiError> {
    no_content_or_missing(state.sales_reps.delete(id).await?)
}
