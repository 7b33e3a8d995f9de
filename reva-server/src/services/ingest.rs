//! Ingestion pipeline
//!
//! One upload runs strictly classify -> parse -> validate -> persist, with no
//! fan-out across rows and no retries. Any stage failure fails the whole
//! batch; a group is never persisted partially. Label resolution is strict:
//! a single unrecognized token rejects the entire upload rather than being
//! defaulted away, so classifier regressions stay visible.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use reva_common::model::UnknownLabel;
use reva_common::{Label, Review, ReviewGroup};

use crate::codec::{self, CsvError};
use crate::db;
use crate::services::classifier::{ClassifierClient, ClassifierError};

/// Ingestion failures, tagged by the stage that produced them.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("Classifier response unreadable: {0}")]
    Csv(#[from] CsvError),

    /// The classifier answered but its output held zero data rows.
    #[error("Classifier returned no usable rows")]
    EmptyResult,

    #[error("Row {row}: {source}")]
    UnknownLabel { row: i64, source: UnknownLabel },

    #[error("Row {row}: {message}")]
    InvalidRecord { row: i64, message: String },

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error(transparent)]
    Db(reva_common::Error),
}

/// Run the full ingestion pipeline for one uploaded CSV and persist the
/// result as a new group. Returns the new group's id.
pub async fn ingest_group(
    pool: &SqlitePool,
    classifier: &ClassifierClient,
    csv_bytes: Vec<u8>,
    file_name: &str,
) -> Result<Uuid, IngestError> {
    let labeled = classifier.classify(csv_bytes, file_name).await?;
    let records = codec::parse_classified(&labeled)?;
    if records.is_empty() {
        return Err(IngestError::EmptyResult);
    }

    let group_id = Uuid::new_v4();
    let mut reviews = Vec::with_capacity(records.len());
    for record in &records {
        let label = Label::parse(&record.label).map_err(|source| IngestError::UnknownLabel {
            row: record.row_index,
            source,
        })?;
        let review = Review::new(
            Uuid::new_v4(),
            record.text.clone(),
            label,
            record.source.clone(),
            record.confidence,
            group_id,
            record.row_index,
        )
        .map_err(|e| IngestError::InvalidRecord {
            row: record.row_index,
            message: e.to_string(),
        })?;
        reviews.push(review);
    }

    let group = ReviewGroup::new(group_id, file_name.to_string(), Utc::now(), reviews)
        .map_err(|e| IngestError::Invalid(e.to_string()))?;

    db::groups::insert_group(pool, &group)
        .await
        .map_err(IngestError::Db)?;

    info!(
        "Ingested group {} ('{}') with {} reviews",
        group.id, group.name, group.review_count
    );
    Ok(group.id)
}

/// Classify a single free-standing text and return the labeled review
/// without persisting it. The review carries a nil group id.
pub async fn parse_one(
    classifier: &ClassifierClient,
    text: &str,
) -> Result<Review, IngestError> {
    let payload = codec::wrap_single(text);
    let labeled = classifier.classify(payload, "single.csv").await?;
    let records = codec::parse_classified(&labeled)?;

    let record = records.first().ok_or(IngestError::EmptyResult)?;
    let label = Label::parse(&record.label).map_err(|source| IngestError::UnknownLabel {
        row: record.row_index,
        source,
    })?;

    Review::new(
        Uuid::new_v4(),
        record.text.clone(),
        label,
        record.source.clone(),
        record.confidence,
        Uuid::nil(),
        record.row_index,
    )
    .map_err(|e| IngestError::InvalidRecord {
        row: record.row_index,
        message: e.to_string(),
    })
}
