use crate::errors::AppError;
use crate::models::{InsertResponse, StatsResponse};
use crate::state::AppState;
use crate::stats::build_stats;
use crate::storage::persist_data;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;
use tracing::info;

pub async fn insert_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<InsertResponse>), AppError> {
    authorize(&state, &headers)?;
    validate_table(&table)?;

    let rows = match payload {
        Value::Array(rows) => rows,
        row @ Value::Object(_) => vec![row],
        _ => return Err(AppError::bad_request("body must be a JSON object or array of objects")),
    };
    if !rows.iter().all(Value::is_object) {
        return Err(AppError::bad_request("every row must be a JSON object"));
    }

    let inserted = rows.len();
    let mut data = state.data.lock().await;
    let previous_len = data.tables.get(&table).map(Vec::len);
    data.tables.entry(table.clone()).or_default().extend(rows);
    if let Err(err) = persist_data(&state.data_path, &data).await {
        // a failed write must not leave rows behind for a retried insert to duplicate
        match previous_len {
            Some(len) => {
                if let Some(rows) = data.tables.get_mut(&table) {
                    rows.truncate(len);
                }
            }
            None => {
                data.tables.remove(&table);
            }
        }
        return Err(err);
    }

    info!(%table, inserted, "rows inserted");
    Ok((StatusCode::CREATED, Json(InsertResponse { table, inserted })))
}

pub async fn list_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<Value>>, AppError> {
    authorize(&state, &headers)?;
    validate_table(&table)?;

    let data = state.data.lock().await;
    Ok(Json(data.tables.get(&table).cloned().unwrap_or_default()))
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(build_stats(&data, &state.events_table)))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = state.api_key.as_deref() else {
        return Ok(());
    };
    let supplied = headers.get("apikey").and_then(|value| value.to_str().ok());
    if supplied == Some(expected) {
        Ok(())
    } else {
        Err(AppError::unauthorized("invalid or missing apikey"))
    }
}

pub fn validate_table(table: &str) -> Result<(), AppError> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::bad_request("table name must match [a-z0-9_]+"))
    }
}
