//! # Error Types
//!
//! Errors raised by the windowing engine and its surrounding glue.
//!
//! ## Overview
//!
//! - [`WindowError`]: the only error the engine itself raises. An ingestion whose
//!   timestamp precedes the watermark is rejected with [`WindowError::OutOfOrder`]
//!   and leaves every piece of engine state unchanged.
//! - [`ConfigError`]: invalid or unreadable engine configuration.
//! - [`LoadError`]: failures while reading fragment files.
//!
//! A reporter that declines a window is not an error: the engine logs it, counts
//! it in [`EngineStats`](crate::engine::EngineStats) and keeps the content
//! buffered for the next close attempt.

use crate::time::Timestamp;
use thiserror::Error;

/// Error returned by [`WindowingEngine::ingest`](crate::engine::WindowingEngine::ingest).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
  /// The element's timestamp is earlier than the highest timestamp admitted so far.
  #[error("out of order element: timestamp {timestamp} precedes watermark {watermark}")]
  OutOfOrder {
    /// Timestamp of the rejected element.
    timestamp: Timestamp,
    /// Watermark at the time of rejection.
    watermark: Timestamp,
  },
  /// The engine task behind a [`runner::EngineHandle`](crate::runner::EngineHandle) has stopped.
  #[error("engine task stopped")]
  EngineStopped,
}

/// Result type for window operations.
pub type WindowResult<T> = Result<T, WindowError>;

/// Error type for configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
  /// Window size must be strictly positive.
  #[error("invalid window size {0}: must be > 0")]
  InvalidWindowSize(i64),
  /// A required option was not supplied.
  #[error("missing required option: {0}")]
  Missing(&'static str),
  /// Policy parameters are inconsistent.
  #[error("invalid policy: {0}")]
  InvalidPolicy(String),
  /// Configuration file could not be read.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  /// Configuration could not be parsed.
  #[error("parse error: {0}")]
  Parse(#[from] serde_json::Error),
}

/// Error type for fragment and dataset loading.
#[derive(Error, Debug)]
pub enum LoadError {
  /// Underlying file could not be read.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  /// A JSON line could not be decoded.
  #[error("line {line}: {source}")]
  Json {
    /// One-based line number.
    line: usize,
    /// Decoder error.
    #[source]
    source: serde_json::Error,
  },
  /// A CSV record could not be decoded.
  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),
  /// A CSV record is missing a required column.
  #[error("record {record}: missing column {column}")]
  MissingColumn {
    /// Zero-based record index (header excluded).
    record: usize,
    /// Zero-based column index.
    column: usize,
  },
}
