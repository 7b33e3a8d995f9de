//! Group endpoints: CSV upload, listing, deletion.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::api::ApiError;
use crate::db;
use crate::services;
use crate::AppState;

/// Response for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub group_id: Uuid,
}

/// POST /api/groups/upload
///
/// Multipart upload with one `file` field. Empty payloads and filenames
/// without a `.csv` extension are rejected before the pipeline runs.
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
            file = Some((file_name, bytes.to_vec()));
            break;
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| ApiError::bad_request("Missing 'file' field"))?;

    if bytes.is_empty() {
        return Err(ApiError::bad_request("File is empty"));
    }
    if !file_name.ends_with(".csv") {
        return Err(ApiError::bad_request("File is not a csv file"));
    }

    info!("Upload received: '{}' ({} bytes)", file_name, bytes.len());
    let group_id =
        services::ingest_group(&state.db, &state.classifier, bytes, &file_name).await?;

    Ok(Json(UploadResponse { group_id }))
}

/// GET /api/groups
///
/// Group listing read model: id, name, creation date, and review count,
/// without the review bodies.
pub async fn list_groups(
    State(state): State<AppState>,
) -> Result<Json<Vec<db::GroupSummary>>, ApiError> {
    let groups = db::groups::list_groups(&state.db).await?;
    Ok(Json(groups))
}

/// DELETE /api/groups/:group_id
///
/// Deletes the group; the store cascades the delete to its reviews.
pub async fn delete_group(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    db::groups::delete_group(&state.db, group_id).await?;
    info!("Deleted group {}", group_id);
    Ok(Json(serde_json::json!({ "deleted": group_id })))
}
