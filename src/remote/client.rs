//!
//! HTTP client for the published content endpoint.
//!
//! The endpoint supports two requests against the same URL: a `HEAD` probe that returns only the
//! current `ETag`, and a `GET` returning the document body together with its `ETag`. All methods
//! are async and designed for use with Tokio.

use super::types::*;
use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, ETAG, HeaderMap};
use std::time::Duration;
use tracing::debug;

/// Transport used by the sync engine to reach the content endpoint.
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
	/// Issue a metadata-only request and return the current validator.
	async fn probe(&self, url: &str) -> Result<Option<Validator>, RemoteError>;

	/// Download the full document, bypassing intermediate caches.
	async fn fetch(&self, url: &str) -> Result<FetchedContent, RemoteError>;
}

/// `reqwest` backed content source
#[derive(Clone)]
pub struct HttpContentSource {
	/// The underlying HTTP client, configured with the request timeout.
	http_client: Client,
}

impl HttpContentSource {
	/// Create a new content source.
	///
	/// # Arguments
	/// * `timeout` - Upper bound for each request, including reading the body.
	///
	/// # Returns
	/// A new `HttpContentSource`, or a `RemoteError` if the client cannot be built.
	pub fn new(timeout: Duration) -> Result<Self, RemoteError> {
		let http_client = Client::builder().timeout(timeout).build()?;
		Ok(Self { http_client })
	}

	/// Wrap an already configured client.
	pub fn with_client(http_client: Client) -> Self {
		Self { http_client }
	}

	fn validator_from(headers: &HeaderMap) -> Result<Option<Validator>, RemoteError> {
		match headers.get(ETAG) {
			Some(value) => {
				let tag = value
					.to_str()
					.map_err(|e| RemoteError::InvalidHeader(e.to_string()))?;
				Ok(Some(Validator::new(tag)))
			}
			None => Ok(None),
		}
	}
}

#[async_trait::async_trait]
impl ContentSource for HttpContentSource {
	async fn probe(&self, url: &str) -> Result<Option<Validator>, RemoteError> {
		let response = self.http_client.head(url).send().await?;

		if !response.status().is_success() {
			return Err(RemoteError::Status {
				status: response.status().as_u16(),
				url: url.to_string(),
			});
		}

		let validator = Self::validator_from(response.headers())?;
		debug!("Probe of {} returned validator {:?}", url, validator);
		Ok(validator)
	}

	async fn fetch(&self, url: &str) -> Result<FetchedContent, RemoteError> {
		let response = self
			.http_client
			.get(url)
			.header(CACHE_CONTROL, "no-cache")
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(RemoteError::Status {
				status: response.status().as_u16(),
				url: url.to_string(),
			});
		}

		let validator = Self::validator_from(response.headers())?;
		let body = response.bytes().await?.to_vec();

		debug!(
			"Fetched {} bytes from {} (validator {:?})",
			body.len(),
			url,
			validator
		);
		Ok(FetchedContent { body, validator })
	}
}
