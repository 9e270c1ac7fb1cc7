//! Error types for the HazelDB client SDK.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("Invalid field path '{path}': {reason}")]
  InvalidFieldPath { path: String, reason: String },

  #[error("Invalid projection for field '{field}': {message}")]
  InvalidProjection { field: String, message: String },

  #[error("Cursor has not fetched a page yet; iterate at least once before reading {0}")]
  CursorNotStarted(&'static str),

  #[error("{metadata} was not requested; enable {flag} before running the query")]
  MetadataNotRequested {
    metadata: &'static str,
    flag: &'static str,
  },

  #[error("Connection error: {0}")]
  Connection(String),

  #[error("Serialization error: {0}")]
  Serialization(String),

  #[error("Server error: {0}")]
  Server(String),

  #[error("Protocol error: {0}")]
  Protocol(String),
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self {
    Self::Serialization(e.to_string())
  }
}

impl From<reqwest::Error> for Error {
  fn from(e: reqwest::Error) -> Self {
    Self::Connection(e.to_string())
  }
}

pub type Result<T> = std::result::Result<T, Error>;
