//! Group persistence: batch insert, lightweight listing, cascade delete.

use reva_common::{Error, Result, ReviewGroup};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_guid, parse_timestamp};

/// Group listing read model: everything except the review bodies.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub id: Uuid,
    pub name: String,
    pub date: DateTime<Utc>,
    pub review_count: i64,
}

/// Insert a group and its full review collection as one transaction.
/// Failure of any part rolls back the whole batch.
pub async fn insert_group(pool: &SqlitePool, group: &ReviewGroup) -> Result<()> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        "INSERT INTO review_groups (guid, name, created_at, review_count)
         VALUES (?, ?, ?, ?)",
    )
    .bind(group.id.to_string())
    .bind(&group.name)
    .bind(group.date.to_rfc3339())
    .bind(group.review_count)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if inserted == 0 {
        return Err(Error::Internal("Failed to save the group".to_string()));
    }

    for review in &group.reviews {
        let inserted = sqlx::query(
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
        if inserted == 0 {
            return Err(Error::Internal("Failed to save the review".to_string()));
        }
    }

    tx.commit().await?;
    Ok(())
}

/// All groups without their review collections, for list views.
pub async fn list_groups(pool: &SqlitePool) -> Result<Vec<GroupSummary>> {
    let rows = sqlx::query(
        "SELECT guid, name, created_at, review_count FROM review_groups ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        return Err(Error::NotFound("No groups found".to_string()));
    }

    rows.iter()
        .map(|row| {
            Ok(GroupSummary {
                id: parse_guid(row.get("guid"))?,
                name: row.get("name"),
                date: parse_timestamp(row.get("created_at"))?,
                review_count: row.get("review_count"),
            })
        })
        .collect()
}

/// Delete a group; the schema cascades the delete to its reviews.
pub async fn delete_group(pool: &SqlitePool, group_id: Uuid) -> Result<()> {
    let affected = sqlx::query("DELETE FROM review_groups WHERE guid = ?")
        .bind(group_id.to_string())
        .execute(pool)
        .await?
        .rows_affected();

    if affected == 0 {
        return Err(Error::NotFound(format!("No group with id {}", group_id)));
    }
    Ok(())
}
