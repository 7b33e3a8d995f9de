//! Storage layer: group and review persistence plus aggregation queries.
//!
//! Read operations report an empty result set as `Error::NotFound` rather
//! than an empty success, so "no data" stays observable to callers. The
//! percentage aggregates are the exception: they are defined over zero rows
//! and return 0 instead.

pub mod groups;
pub mod reviews;

pub use groups::GroupSummary;

use chrono::{DateTime, Utc};
use reva_common::{Error, Result};
use uuid::Uuid;

/// Parse a stored guid column. Corrupt rows surface as typed errors
/// instead of panics.
pub(crate) fn parse_guid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| Error::CorruptData(format!("bad guid '{}'", raw)))
}

/// Parse a stored RFC 3339 timestamp column.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::CorruptData(format!("bad timestamp '{}'", raw)))
}
