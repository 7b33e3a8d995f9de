//! Review endpoints: reads, aggregates, CSV export, single-text parsing.

use std::collections::HashMap;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use reva_common::{Label, Review};

use crate::api::ApiError;
use crate::codec;
use crate::db;
use crate::services;
use crate::AppState;

/// `count` query parameter shared by the list endpoints. Zero or negative
/// (the default) means "all".
#[derive(Debug, Deserialize)]
pub struct CountQuery {
    #[serde(default)]
    pub count: i64,
}

/// GET /api/reviews/:group_id?count=N
///
/// Reviews of one group in upload order, optionally truncated.
pub async fn get_by_group(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
    Query(query): Query<CountQuery>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = db::reviews::reviews_by_group(&state.db, group_id, query.count).await?;
    Ok(Json(reviews))
}

/// GET /api/reviews/by-title/:title?count=N
///
/// Case-insensitive substring filter over review text, across all groups.
pub async fn get_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
    Query(query): Query<CountQuery>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = db::reviews::reviews_by_title(&state.db, &title, query.count).await?;
    Ok(Json(reviews))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub group_id: Uuid,
}

/// GET /api/reviews/export-stream?group_id=U
///
/// Streams the group's reviews as a CSV attachment, one flushed row at a
/// time. Fixed column order `Id,Text,Label,Src,Confidence`; embedded quotes
/// are doubled per standard CSV quoting.
pub async fn export_stream(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let reviews = db::reviews::reviews_by_group(&state.db, query.group_id, 0).await?;

    let stream = async_stream::stream! {
        yield Ok::<_, std::convert::Infallible>(codec::EXPORT_HEADER.to_string());
        for review in reviews {
            yield Ok(codec::export_row(&review));
        }
    };

    Response::builder()
        .header(header::CONTENT_TYPE, "text/csv")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=reviews.csv",
        )
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError {
            status: axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            message: e.to_string(),
        })
}

/// GET /api/reviews/review-count
pub async fn review_count(State(state): State<AppState>) -> Result<Json<i64>, ApiError> {
    let count = db::reviews::total_review_count(&state.db).await?;
    Ok(Json(count))
}

#[derive(Debug, Deserialize)]
pub struct LabelCountQuery {
    pub label: String,
    pub group_id: Option<Uuid>,
}

/// GET /api/reviews/label-count?label=L[&group_id=U]
pub async fn label_count(
    State(state): State<AppState>,
    Query(query): Query<LabelCountQuery>,
) -> Result<Json<i64>, ApiError> {
    let label = Label::parse(&query.label).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let count = match query.group_id {
        Some(group_id) => db::reviews::label_count_in_group(&state.db, group_id, label).await?,
        None => db::reviews::label_count(&state.db, label).await?,
    };
    Ok(Json(count))
}

#[derive(Debug, Deserialize)]
pub struct PercentQuery {
    /// Weight applied to neutral reviews; 0 counts positives only.
    #[serde(default)]
    pub neutral_coeff: f64,
    pub group_id: Option<Uuid>,
}

/// GET /api/reviews/percent-positive?neutral_coeff=C[&group_id=U]
///
/// `100 * (positive + coeff * neutral) / total`; 0 when nothing is stored.
pub async fn percent_positive(
    State(state): State<AppState>,
    Query(query): Query<PercentQuery>,
) -> Result<Json<f64>, ApiError> {
    let percent = match query.group_id {
        Some(group_id) => {
            db::reviews::percent_positive_in_group(&state.db, group_id, query.neutral_coeff)
                .await?
        }
        None => db::reviews::percent_positive(&state.db, query.neutral_coeff).await?,
    };
    Ok(Json(percent))
}

#[derive(Debug, Deserialize)]
pub struct SourceQuery {
    pub group_id: Uuid,
}

/// GET /api/reviews/source-percentages?group_id=U
///
/// Map from each source present in the group to its percent of positive
/// reviews. Sources with zero reviews never appear.
pub async fn source_percentages(
    State(state): State<AppState>,
    Query(query): Query<SourceQuery>,
) -> Result<Json<HashMap<String, f64>>, ApiError> {
    let map = db::reviews::positive_percent_by_source(&state.db, query.group_id).await?;
    Ok(Json(map))
}

/// POST /api/reviews/parse-one
///
/// Plain-text body; runs the classification pipeline for a single text and
/// returns the labeled review without persisting it.
pub async fn parse_one(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<Review>, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::bad_request("Text is empty"));
    }
    let review = services::parse_one(&state.classifier, &body).await?;
    Ok(Json(review))
}
