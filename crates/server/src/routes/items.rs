use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::state::ServerState;

/// Request body for create and update. `value` is optional on the wire so a
/// missing or null value is answered with 400 instead of an extractor error.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ValueBody {
    pub value: Option<String>,
}

/// Both extractors are optional: any rejection is a client error.
fn validate(key: Option<Path<String>>, body: Option<Json<ValueBody>>) -> Result<(String, String), ApiError> {
    let key = match key {
        Some(Path(key)) if !key.is_empty() => key,
        _ => return Err(ApiError::BadRequest("key must not be empty")),
    };
    match body {
        Some(Json(ValueBody { value: Some(value) })) => Ok((key, value)),
        _ => Err(ApiError::BadRequest("body must carry a string `value`")),
    }
}

/// Read the value stored under a key.
#[utoipa::path(
    get, path = "/items/{key}", tag = "items",
    params(("key" = String, Path, description = "Record key")),
    responses(
        (status = 200, description = "Stored value", body = String),
        (status = 404, description = "No record for key", body = crate::errors::ErrorBody),
        (status = 500, description = "Internal error", body = crate::errors::ErrorBody)
    )
)]
pub async fn read_value(
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> Result<Json<String>, ApiError> {
    let value = state.kv.read(&key).await?;
    Ok(Json(value))
}

/// Create a record; the key must not exist yet.
#[utoipa::path(
    put, path = "/items/{key}", tag = "items",
    params(("key" = String, Path, description = "Record key")),
    request_body = ValueBody,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Missing key or value", body = crate::errors::ErrorBody),
        (status = 409, description = "Key already exists", body = crate::errors::ErrorBody),
        (status = 500, description = "Internal error", body = crate::errors::ErrorBody)
    )
)]
pub async fn create_value(
    State(state): State<ServerState>,
    key: Option<Path<String>>,
    body: Option<Json<ValueBody>>,
) -> Result<StatusCode, ApiError> {
    let (key, value) = validate(key, body)?;
    state.kv.create(&key, &value).await?;
    Ok(StatusCode::CREATED)
}

/// Replace the value of an existing record.
#[utoipa::path(
    patch, path = "/items/{key}", tag = "items",
    params(("key" = String, Path, description = "Record key")),
    request_body = ValueBody,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Missing key or value", body = crate::errors::ErrorBody),
        (status = 404, description = "No record for key", body = crate::errors::ErrorBody),
        (status = 500, description = "Internal error", body = crate::errors::ErrorBody)
    )
)]
pub async fn update_value(
    State(state): State<ServerState>,
    key: Option<Path<String>>,
    body: Option<Json<ValueBody>>,
) -> Result<StatusCode, ApiError> {
    let (key, value) = validate(key, body)?;
    state.kv.update(&key, &value).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete, path = "/items/{key}", tag = "items",
    params(("key" = String, Path, description = "Record key")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No record for key", body = crate::errors::ErrorBody),
        (status = 500, description = "Internal error", body = crate::errors::ErrorBody)
    )
)]
pub async fn delete_value(
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.kv.delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}
