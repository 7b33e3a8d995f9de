//! # REVA Common Library
//!
//! Shared code for the REVA review-analysis service:
//! - Domain model (Label, Review, ReviewGroup) with construction-time invariants
//! - Error and result types
//! - Configuration loading
//! - Database initialization

pub mod config;
pub mod db;
pub mod error;
pub mod model;

pub use error::{Error, Result};
pub use model::{Label, Review, ReviewGroup};
