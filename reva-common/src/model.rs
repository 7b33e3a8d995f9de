//! Domain model: sentiment labels, reviews, and review groups.
//!
//! All invariants are enforced at construction time through smart
//! constructors returning `Result`; the types carry no setters and are
//! immutable once built.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum visible (trimmed) length of a review text.
pub const MIN_TEXT_LEN: usize = 5;

/// Maximum length of a group name (matches the persisted column bound).
pub const MAX_GROUP_NAME_LEN: usize = 200;

/// A label token the classifier produced that is not part of the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown label '{0}'")]
pub struct UnknownLabel(pub String);

/// Sentiment classification outcome. Closed set; anything else the
/// classifier emits is an error, never silently coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Positive,
    Neutral,
    Negative,
}

impl Label {
    /// Decode a classifier label token.
    pub fn parse(token: &str) -> std::result::Result<Label, UnknownLabel> {
        match token {
            "Positive" => Ok(Label::Positive),
            "Neutral" => Ok(Label::Neutral),
            "Negative" => Ok(Label::Negative),
            other => Err(UnknownLabel(other.to_string())),
        }
    }

    /// Canonical token used in storage and CSV export.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Positive => "Positive",
            Label::Neutral => "Neutral",
            Label::Negative => "Negative",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified unit of text. Belongs to exactly one group and is
/// immutable after ingestion; deletion happens only via the owning group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub text: String,
    pub label: Label,
    /// Free-text origin tag; may be empty.
    pub source: String,
    /// Classifier confidence. Expected in [0,1] but stored as received;
    /// out-of-range values are unusual telemetry, not an error.
    pub confidence: f64,
    pub group_id: Uuid,
    /// Original row position in the uploaded file; preserves upload order.
    pub sequence_index: i64,
}

impl Review {
    /// Validating constructor. Text must have at least [`MIN_TEXT_LEN`]
    /// visible characters; whitespace does not count.
    pub fn new(
        id: Uuid,
        text: String,
        label: Label,
        source: String,
        confidence: f64,
        group_id: Uuid,
        sequence_index: i64,
    ) -> Result<Review> {
        validate_text(&text)?;
        Ok(Review {
            id,
            text,
            label,
            source,
            confidence,
            group_id,
            sequence_index,
        })
    }
}

fn validate_text(text: &str) -> Result<()> {
    let visible = text.trim();
    if visible.is_empty() {
        return Err(Error::InvalidInput("Text cannot be empty".to_string()));
    }
    if visible.chars().count() < MIN_TEXT_LEN {
        return Err(Error::InvalidInput(format!(
            "Text must be at least {} characters",
            MIN_TEXT_LEN
        )));
    }
    Ok(())
}

/// One ingestion batch: the reviews from a single uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewGroup {
    pub id: Uuid,
    /// Originating filename.
    pub name: String,
    pub date: DateTime<Utc>,
    /// Reviews ordered by `sequence_index`.
    pub reviews: Vec<Review>,
    /// Cached count; equals `reviews.len()` whenever both are materialized.
    pub review_count: i64,
}

impl ReviewGroup {
    /// Validating constructor. The review collection is taken as-is;
    /// callers build it in sequence order during ingestion.
    pub fn new(
        id: Uuid,
        name: String,
        date: DateTime<Utc>,
        reviews: Vec<Review>,
    ) -> Result<ReviewGroup> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("Group name cannot be empty".to_string()));
        }
        if name.chars().count() > MAX_GROUP_NAME_LEN {
            return Err(Error::InvalidInput(format!(
                "Group name must be at most {} characters",
                MAX_GROUP_NAME_LEN
            )));
        }
        if date > Utc::now() {
            return Err(Error::InvalidInput(
                "Group date cannot be in the future".to_string(),
            ));
        }
        let review_count = reviews.len() as i64;
        Ok(ReviewGroup {
            id,
            name,
            date,
            reviews,
            review_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn review_with_text(text: &str) -> Result<Review> {
        Review::new(
            Uuid::new_v4(),
            text.to_string(),
            Label::Positive,
            "web".to_string(),
            0.9,
            Uuid::new_v4(),
            0,
        )
    }

    #[test]
    fn label_parse_accepts_closed_set() {
        assert_eq!(Label::parse("Positive"), Ok(Label::Positive));
        assert_eq!(Label::parse("Neutral"), Ok(Label::Neutral));
        assert_eq!(Label::parse("Negative"), Ok(Label::Negative));
    }

    #[test]
    fn label_parse_rejects_unknown_tokens() {
        assert_eq!(
            Label::parse("positive"),
            Err(UnknownLabel("positive".to_string()))
        );
        assert!(Label::parse("").is_err());
        assert!(Label::parse("Mixed").is_err());
    }

    #[test]
    fn review_text_of_exactly_five_chars_is_valid() {
        assert!(review_with_text("great").is_ok());
    }

    #[test]
    fn review_text_of_four_chars_is_invalid() {
        assert!(review_with_text("good").is_err());
    }

    #[test]
    fn review_text_whitespace_only_is_invalid() {
        assert!(review_with_text("     ").is_err());
        assert!(review_with_text("\t\n  \r\n").is_err());
    }

    #[test]
    fn review_text_whitespace_padding_does_not_count() {
        // 4 visible chars padded out to more than 5 total
        assert!(review_with_text("  good  ").is_err());
        assert!(review_with_text("  great  ").is_ok());
    }

    #[test]
    fn out_of_range_confidence_is_accepted() {
        let r = Review::new(
            Uuid::new_v4(),
            "plenty of text".to_string(),
            Label::Neutral,
            String::new(),
            1.7,
            Uuid::new_v4(),
            3,
        );
        assert!(r.is_ok());
    }

    #[test]
    fn group_date_in_future_is_invalid() {
        let g = ReviewGroup::new(
            Uuid::new_v4(),
            "reviews.csv".to_string(),
            Utc::now() + Duration::hours(1),
            vec![],
        );
        assert!(g.is_err());
    }

    #[test]
    fn group_name_bounds() {
        assert!(ReviewGroup::new(Uuid::new_v4(), "  ".to_string(), Utc::now(), vec![]).is_err());
        let long = "x".repeat(MAX_GROUP_NAME_LEN + 1);
        assert!(ReviewGroup::new(Uuid::new_v4(), long, Utc::now(), vec![]).is_err());
        let max = "x".repeat(MAX_GROUP_NAME_LEN);
        assert!(ReviewGroup::new(Uuid::new_v4(), max, Utc::now(), vec![]).is_ok());
    }

    #[test]
    fn group_review_count_matches_collection() {
        let gid = Uuid::new_v4();
        let reviews: Vec<Review> = (0..3)
            .map(|i| {
                Review::new(
                    Uuid::new_v4(),
                    format!("review number {}", i),
                    Label::Negative,
                    String::new(),
                    0.5,
                    gid,
                    i,
                )
                .unwrap()
            })
            .collect();
        let g = ReviewGroup::new(gid, "batch.csv".to_string(), Utc::now(), reviews).unwrap();
        assert_eq!(g.review_count, 3);
    }
}
