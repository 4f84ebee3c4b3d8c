//! Record handlers, one invocation point per consistency policy
//!
//! Malformed or missing parameters are rejected by the extractors with
//! 400 before any policy runs. `NotFound` maps to 404; every other core
//! error surfaces as a 500 with a generic message, details go to the log.

use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use syncache_core::ports::RecordStore;
use syncache_core::CoordinatorError;
use syncache_types::Record;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct WriteResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    error: String,
}

type HandlerError = (StatusCode, Json<ErrorBody>);

fn reject(operation: &str, e: CoordinatorError) -> HandlerError {
    if e.is_not_found() {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: "record not found".to_string(),
            }),
        );
    }
    tracing::error!("{} failed: {}", operation, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: format!("{} failed", operation),
        }),
    )
}

fn ok() -> Json<WriteResponse> {
    Json(WriteResponse {
        message: "update success",
    })
}

/// `GET /records/:id` — cache-aside read.
pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Record>, HandlerError> {
    let record = state
        .cache_aside
        .read(id)
        .await
        .map_err(|e| reject("read", e))?;
    Ok(Json(record))
}

/// `GET /records/:id/raw` — direct store read, bypassing the cache.
pub async fn read_raw(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Record>, HandlerError> {
    let record = state
        .db
        .get(id)
        .await
        .map_err(|e| reject("store read", e))?
        .ok_or_else(|| reject("store read", CoordinatorError::NotFound(id)))?;
    Ok(Json(record))
}

/// `POST /records` — create a row with a caller-assigned id.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<Record>), HandlerError> {
    let record = state
        .db
        .create_record(req.id, &req.name)
        .await
        .map_err(|e| reject("create", e))?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `POST /records/:id/invalidate` — write-invalidate policy.
pub async fn write_invalidate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<WriteRequest>,
) -> Result<Json<WriteResponse>, HandlerError> {
    state
        .write_invalidate
        .write(id, &req.name)
        .await
        .map_err(|e| reject("write-invalidate", e))?;
    Ok(ok())
}

/// `POST /records/:id/double-write` — double-write saga.
pub async fn double_write(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<WriteRequest>,
) -> Result<Json<WriteResponse>, HandlerError> {
    state
        .double_write
        .write(id, &req.name)
        .await
        .map_err(|e| reject("double-write", e))?;
    Ok(ok())
}

/// `POST /records/:id/delayed-delete` — delayed double-delete policy. The
/// returned deletion handle is dropped, which leaves the timer armed.
pub async fn delayed_double_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<WriteRequest>,
) -> Result<Json<WriteResponse>, HandlerError> {
    state
        .delayed_double_delete
        .write(id, &req.name)
        .await
        .map_err(|e| reject("delayed-double-delete", e))?;
    Ok(ok())
}

/// `POST /records/:id/async` — queue-driven asynchronous update.
pub async fn async_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<WriteRequest>,
) -> Result<Json<WriteResponse>, HandlerError> {
    state
        .async_queue
        .write(id, &req.name)
        .await
        .map_err(|e| reject("async update", e))?;
    Ok(ok())
}
