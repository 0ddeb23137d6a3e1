//! Mashup Generator - search YouTube for an artist's songs, trim and
//! concatenate the downloaded audio, archive the result, and email it to a
//! recipient.
//!
//! The pipeline runs one request at a time, start to finish: acquire,
//! compose, package, deliver, clean up. Each stage either succeeds or fails
//! the whole run; there are no retries.

pub mod acquire;
pub mod cli;
pub mod compose;
pub mod config;
pub mod deliver;
pub mod package;
pub mod pipeline;
pub mod request;
pub mod utils;
pub mod workspace;

pub use acquire::{DownloadedAsset, MediaAcquirer, SourceFormat};
pub use config::Config;
pub use pipeline::{MashupPipeline, RunOutcome, Stage};
pub use request::MashupRequest;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the mashup pipeline
#[derive(thiserror::Error, Debug)]
pub enum MashupError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Audio acquisition failed: {0}")]
    Acquisition(String),

    #[error("Audio composition failed: {0}")]
    Composition(String),

    #[error("Packaging failed: {0}")]
    Packaging(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}
