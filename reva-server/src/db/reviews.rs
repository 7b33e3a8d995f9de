//! Review reads, counting aggregates, and low-level inserts.

use std::collections::HashMap;

use reva_common::{Error, Label, Result, Review};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::parse_guid;

fn review_from_row(row: &SqliteRow) -> Result<Review> {
    let label_raw: &str = row.get("label");
    let label = Label::parse(label_raw)
        .map_err(|e| Error::CorruptData(format!("bad label token: {}", e)))?;
    Ok(Review {
        id: parse_guid(row.get("guid"))?,
        text: row.get("text"),
        label,
        source: row.get("source"),
        confidence: row.get("confidence"),
        group_id: parse_guid(row.get("group_id"))?,
        sequence_index: row.get("seq_index"),
    })
}

/// Reviews of one group in upload order. A non-positive `limit` means all;
/// a positive one truncates to the first `limit` in sequence order.
pub async fn reviews_by_group(
    pool: &SqlitePool,
    group_id: Uuid,
    limit: i64,
) -> Result<Vec<Review>> {
    // SQLite treats a negative LIMIT as "no limit"
    let effective_limit = if limit > 0 { limit } else { -1 };

    let rows = sqlx::query(
        "SELECT guid, group_id, seq_index, text, label, source, confidence
         FROM reviews WHERE group_id = ?
         ORDER BY seq_index ASC
         LIMIT ?",
    )
    .bind(group_id.to_string())
    .bind(effective_limit)
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        return Err(Error::NotFound(
            "No reviews found for the specified group".to_string(),
        ));
    }

    rows.iter().map(review_from_row).collect()
}

/// Case-insensitive substring match over review text across all groups,
/// ordered by review id. A non-positive `limit` means all.
pub async fn reviews_by_title(
    pool: &SqlitePool,
    title: &str,
    limit: i64,
) -> Result<Vec<Review>> {
    let effective_limit = if limit > 0 { limit } else { -1 };

    // instr() rather than LIKE so that '%' and '_' in the needle stay literal
    let rows = sqlx::query(
        "SELECT guid, group_id, seq_index, text, label, source, confidence
         FROM reviews WHERE instr(lower(text), lower(?)) > 0
         ORDER BY guid ASC
         LIMIT ?",
    )
    .bind(title)
    .bind(effective_limit)
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        return Err(Error::NotFound(format!(
            "No reviews matching '{}'",
            title
        )));
    }

    rows.iter().map(review_from_row).collect()
}

/// Total number of stored reviews across all groups.
pub async fn total_review_count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Number of stored reviews carrying the given label.
pub async fn label_count(pool: &SqlitePool, label: Label) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE label = ?")
        .bind(label.as_str())
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Number of reviews carrying the given label within one group.
pub async fn label_count_in_group(
    pool: &SqlitePool,
    group_id: Uuid,
    label: Label,
) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE group_id = ? AND label = ?")
            .bind(group_id.to_string())
            .bind(label.as_str())
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// `100 * (positive + coeff * neutral) / total` over all stored reviews.
/// Zero stored reviews is a defined case and yields 0.
pub async fn percent_positive(pool: &SqlitePool, neutral_coefficient: f64) -> Result<f64> {
    let (positive, neutral, total): (i64, i64, i64) = sqlx::query_as(
        "SELECT
            COALESCE(SUM(CASE WHEN label = 'Positive' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN label = 'Neutral' THEN 1 ELSE 0 END), 0),
            COUNT(*)
         FROM reviews",
    )
    .fetch_one(pool)
    .await?;
    Ok(weighted_percent(positive, neutral, total, neutral_coefficient))
}

/// Same as [`percent_positive`], scoped to one group.
pub async fn percent_positive_in_group(
    pool: &SqlitePool,
    group_id: Uuid,
    neutral_coefficient: f64,
) -> Result<f64> {
    let (positive, neutral, total): (i64, i64, i64) = sqlx::query_as(
        "SELECT
            COALESCE(SUM(CASE WHEN label = 'Positive' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN label = 'Neutral' THEN 1 ELSE 0 END), 0),
            COUNT(*)
         FROM reviews WHERE group_id = ?",
    )
    .bind(group_id.to_string())
    .fetch_one(pool)
    .await?;
    Ok(weighted_percent(positive, neutral, total, neutral_coefficient))
}

fn weighted_percent(positive: i64, neutral: i64, total: i64, coeff: f64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * (positive as f64 + coeff * neutral as f64) / total as f64
}

/// Per-source percent of positive reviews within one group. Only sources
/// that actually occur in the group appear in the map, so no entry is ever
/// a 0-of-0 artifact.
pub async fn positive_percent_by_source(
    pool: &SqlitePool,
    group_id: Uuid,
) -> Result<HashMap<String, f64>> {
    let rows: Vec<(String, i64, i64)> = sqlx::query_as(
        "SELECT
            source,
            COALESCE(SUM(CASE WHEN label = 'Positive' THEN 1 ELSE 0 END), 0),
            COUNT(*)
         FROM reviews WHERE group_id = ?
         GROUP BY source",
    )
    .bind(group_id.to_string())
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        return Err(Error::NotFound(
            "No reviews found for the specified group".to_string(),
        ));
    }

    Ok(rows
        .into_iter()
        .map(|(source, positive, total)| {
            (source, 100.0 * positive as f64 / total as f64)
        })
        .collect())
}

/// Insert a single review. Fails when the store reports zero rows affected.
pub async fn insert_review(pool: &SqlitePool, review: &Review) -> Result<()> {
    let affected = sqlx::query(
        "INSERT INTO reviews (guid, group_id, seq_index, text, label, source, confidence)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(review.id.to_string())
    .bind(review.group_id.to_string())
    .bind(review.sequence_index)
    .bind(&review.text)
    .bind(review.label.as_str())
    .bind(&review.source)
    .bind(review.confidence)
    .execute(pool)
    .await?
    .rows_affected();

    if affected == 0 {
        return Err(Error::Internal("Failed to save the review".to_string()));
    }
    Ok(())
}

/// Bulk insert outside the batch-ingestion path, one transaction.
pub async fn insert_reviews(pool: &SqlitePool, reviews: &[Review]) -> Result<()> {
    let mut tx = pool.begin().await?;
    let mut affected = 0;
    for review in reviews {
        affected += sqlx::query(
            "INSERT INTO reviews (guid, group_id, seq_index, text, label, source, confidence)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(review.id.to_string())
        .bind(review.group_id.to_string())
        .bind(review.sequence_index)
        .bind(&review.text)
        .bind(review.label.as_str())
        .bind(&review.source)
        .bind(review.confidence)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }
    if affected == 0 {
        return Err(Error::Internal("Failed to save the reviews".to_string()));
    }
    tx.commit().await?;
    Ok(())
}
