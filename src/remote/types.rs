//! Types for talking to the remote content endpoint

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque token naming one version of the remote document (an `ETag` value).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Validator(String);

impl Validator {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Get the validator as a string for storage and comparison
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Validator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for Validator {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

impl From<String> for Validator {
	fn from(value: String) -> Self {
		Self(value)
	}
}

/// Body and validator returned by a full content download.
#[derive(Debug, Clone)]
pub struct FetchedContent {
	/// Raw response body, expected to be a JSON object.
	pub body: Vec<u8>,
	/// The `ETag` sent with the body, if any.
	pub validator: Option<Validator>,
}

/// Error types for remote content requests
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
	#[error("HTTP error: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("Unexpected status {status} from {url}")]
	Status { status: u16, url: String },

	#[error("Invalid validator header: {0}")]
	InvalidHeader(String),
}

impl RemoteError {
	/// Whether the failure was the request timeout firing.
	pub fn is_timeout(&self) -> bool {
		matches!(self, RemoteError::HttpError(e) if e.is_timeout())
	}
}
