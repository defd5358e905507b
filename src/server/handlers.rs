//! Request handlers for the JSON API.

use super::error::ApiError;
use super::AppState;
use crate::backup::BackupRecord;
use crate::constants::{BACKUP_LOCAL_DISPLAY_FORMAT, UNKNOWN_COUNT_MARKER};
use crate::ops::parse_entries_payload;
use crate::store::{Entry, WriteOutcome};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

/// One row of the backup listing as the browser UI expects it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupListing {
    pub filename: String,
    pub kind: Option<&'static str>,
    pub size: u64,
    /// Entry count, or `"?"` when the file doesn't parse
    pub count: Value,
    pub entry_count: Option<usize>,
    pub created: String,
    pub created_local: String,
}

impl From<BackupRecord> for BackupListing {
    fn from(record: BackupRecord) -> Self {
        let count = match record.entry_count {
            Some(n) => json!(n),
            None => json!(UNKNOWN_COUNT_MARKER),
        };
        Self {
            kind: record.kind.map(|k| k.prefix()),
            size: record.size,
            count,
            entry_count: record.entry_count,
            created: record.created_at.to_rfc3339(),
            created_local: record
                .created_at
                .format(BACKUP_LOCAL_DISPLAY_FORMAT)
                .to_string(),
            filename: record.filename,
        }
    }
}

fn success(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "success": true, "message": message.into() }))
}

pub async fn load_data(State(state): State<AppState>) -> Result<Json<Vec<Entry>>, ApiError> {
    let entries = state.run(|wiki| wiki.load()).await?;
    Ok(Json(entries))
}

/// Replaces the store. The body is validated before anything is touched.
///
/// Parsing runs with the operation on the blocking pool, since bodies may be
/// up to the request size limit.
pub async fn save_data(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let outcome = state
        .run(move |wiki| {
            let entries = parse_entries_payload(&body)?;
            debug!(entries = entries.len(), "Save requested");
            wiki.save(&entries)
        })
        .await?;
    Ok(success(save_message(&outcome)))
}

fn save_message(outcome: &WriteOutcome) -> String {
    let mut message = format!("Saved {} entries", outcome.entries);
    if let Some(backup) = &outcome.backup {
        message.push_str(&format!(" (previous data kept as {})", backup.filename));
    }
    if !outcome.pruned.is_empty() {
        message.push_str(&format!(
            "; removed {} old backup(s): {}",
            outcome.pruned.len(),
            outcome.pruned.join(", ")
        ));
    }
    message
}

pub async fn list_backups(
    State(state): State<AppState>,
) -> Result<Json<Vec<BackupListing>>, ApiError> {
    let records = state.run(|wiki| wiki.list_backups()).await?;
    Ok(Json(records.into_iter().map(BackupListing::from).collect()))
}

pub async fn manual_backup(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let record = state.run(|wiki| wiki.manual_backup()).await?;
    Ok(success(format!("Created backup {}", record.filename)))
}

pub async fn restore_backup(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<Vec<Entry>>, ApiError> {
    let report = state.run(move |wiki| wiki.restore(&filename)).await?;
    Ok(Json(report.entries))
}

pub async fn merge_backup(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let report = state.run(move |wiki| wiki.merge(&filename)).await?;
    Ok(Json(json!({
        "success": true,
        "merged": report.merged,
        "addedCount": report.added_count,
    })))
}

pub async fn delete_backup(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let message = format!("Deleted backup {}", filename);
    state.run(move |wiki| wiki.delete_backup(&filename)).await?;
    Ok(success(message))
}
