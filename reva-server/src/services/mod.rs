//! Service layer: classifier round trip and the ingestion pipeline

pub mod classifier;
pub mod ingest;

pub use classifier::{ClassifierClient, ClassifierError};
pub use ingest::{ingest_group, parse_one, IngestError};
