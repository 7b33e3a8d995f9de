//! CSV codec for the review schema.
//!
//! Pure functions over bytes; all I/O stays with the callers. The classifier
//! round trip uses the `{ID, text, src, labels, confidence}` column set, the
//! export path uses the fixed `Id,Text,Label,Src,Confidence` order. The
//! `labels` column is carried as an opaque string here; resolving it against
//! the closed label set happens at domain conversion, not at parse time.

use reva_common::Review;
use thiserror::Error;

/// One parsed row of a classified CSV, before domain conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// File-declared ordinal (the `ID` column), else the 0-based row position.
    pub row_index: i64,
    pub text: String,
    pub source: String,
    /// Opaque label token; decoded later by `Label::parse`.
    pub label: String,
    pub confidence: f64,
}

/// CSV codec errors. Any single bad row fails the whole parse; there is no
/// partial-record recovery.
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("CSV read error: {0}")]
    Malformed(#[from] csv::Error),

    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Row {row}: invalid {field} value '{value}'")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
    },
}

/// Column positions resolved from the header row.
struct Columns {
    id: Option<usize>,
    text: usize,
    src: Option<usize>,
    labels: usize,
    confidence: usize,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Columns, CsvError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Ok(Columns {
            // ID and src survive the classifier round trip only when the
            // uploaded file carried them, so both are optional on read-back.
            id: find("ID"),
            text: find("text").ok_or(CsvError::MissingColumn("text"))?,
            src: find("src"),
            labels: find("labels").ok_or(CsvError::MissingColumn("labels"))?,
            confidence: find("confidence").ok_or(CsvError::MissingColumn("confidence"))?,
        })
    }
}

/// Parse a classified CSV payload into raw records, in file order.
///
/// All-or-nothing: a header mismatch, ragged row, or unreadable field fails
/// the entire parse.
pub fn parse_classified(bytes: &[u8]) -> Result<Vec<RawRecord>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let columns = Columns::resolve(reader.headers()?)?;

    let mut records = Vec::new();
    for (ordinal, row) in reader.records().enumerate() {
        let row = row?;

        let row_index = match columns.id {
            Some(idx) => {
                let raw = row.get(idx).unwrap_or_default();
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| CsvError::InvalidField {
                        row: ordinal,
                        field: "ID",
                        value: raw.to_string(),
                    })?
            }
            None => ordinal as i64,
        };

        let confidence_raw = row.get(columns.confidence).unwrap_or_default();
        let confidence =
            confidence_raw
                .trim()
                .parse::<f64>()
                .map_err(|_| CsvError::InvalidField {
                    row: ordinal,
                    field: "confidence",
                    value: confidence_raw.to_string(),
                })?;

        records.push(RawRecord {
            row_index,
            text: row.get(columns.text).unwrap_or_default().to_string(),
            source: columns
                .src
                .and_then(|idx| row.get(idx))
                .unwrap_or_default()
                .to_string(),
            label: row.get(columns.labels).unwrap_or_default().to_string(),
            confidence,
        });
    }

    Ok(records)
}

/// Wrap a single text as a one-row upload CSV for the classifier.
pub fn wrap_single(text: &str) -> Vec<u8> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    // Writes cannot fail on a Vec sink
    let _ = writer.write_record(["ID", "text", "src"]);
    let _ = writer.write_record(["0", text, ""]);
    writer.into_inner().unwrap_or_default()
}

/// Header line of the export format.
pub const EXPORT_HEADER: &str = "Id,Text,Label,Src,Confidence\n";

/// Serialize one review as an export CSV line, RFC 4180 quoting included
/// (embedded quotes are doubled).
pub fn export_row(review: &Review) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let _ = writer.write_record([
        review.id.to_string().as_str(),
        review.text.as_str(),
        review.label.as_str(),
        review.source.as_str(),
        review.confidence.to_string().as_str(),
    ]);
    String::from_utf8(writer.into_inner().unwrap_or_default()).unwrap_or_default()
}
