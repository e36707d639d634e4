//! Transport configuration with Profitbase defaults.

// std
use std::collections::BTreeMap;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
// self
use crate::{_prelude::*, error::InitializationError};

/// Transport settings applied when building a client.
///
/// Defaults: 5s connect timeout, 10s overall timeout, and JSON `Accept`/`Content-Type`
/// headers. Every `with_*` call overrides the matching default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportConfig {
	base_url: Url,
	connect_timeout: Duration,
	timeout: Duration,
	headers: BTreeMap<String, String>,
	user_agent: Option<String>,
}
impl TransportConfig {
	/// Default connect timeout.
	pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
	/// Default overall request timeout.
	pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

	/// Creates a configuration for `base_endpoint`, which is normalised to end with `/`.
	pub fn new(base_endpoint: &str) -> Result<Self, InitializationError> {
		Ok(Self {
			base_url: normalize_base_url(base_endpoint)?,
			connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
			timeout: Self::DEFAULT_TIMEOUT,
			headers: [("accept", "application/json"), ("content-type", "application/json")]
				.into_iter()
				.map(|(name, value)| (name.to_owned(), value.to_owned()))
				.collect(),
			user_agent: None,
		})
	}

	/// Overrides the connect timeout.
	pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
		self.connect_timeout = timeout;

		self
	}

	/// Overrides the overall request timeout.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Adds or replaces a default header (names are case-insensitive).
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Sets the `User-Agent` sent with every request.
	pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
		self.user_agent = Some(agent.into());

		self
	}

	/// Normalised base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Connect timeout.
	pub fn connect_timeout(&self) -> Duration {
		self.connect_timeout
	}

	/// Overall request timeout.
	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Default headers keyed by lower-cased name.
	pub fn headers(&self) -> &BTreeMap<String, String> {
		&self.headers
	}

	/// Custom user agent, if any.
	pub fn user_agent(&self) -> Option<&str> {
		self.user_agent.as_deref()
	}

	#[cfg(feature = "reqwest")]
	pub(crate) fn header_map(&self) -> Result<HeaderMap, InitializationError> {
		let mut map = HeaderMap::with_capacity(self.headers.len());

		for (name, value) in &self.headers {
			let invalid = || InitializationError::InvalidHeader { name: name.clone() };
			let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
			let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;

			map.insert(header_name, header_value);
		}

		Ok(map)
	}
}

/// Parses `endpoint` and guarantees a trailing `/` so relative paths append to it.
pub fn normalize_base_url(endpoint: &str) -> Result<Url, InitializationError> {
	let normalized = format!("{}/", endpoint.trim_end_matches('/'));

	Url::parse(&normalized).map_err(|source| InitializationError::InvalidBaseUrl {
		endpoint: endpoint.to_owned(),
		source,
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn base_url_always_ends_with_slash() {
		for endpoint in
			["https://pb.example.com/api/v4/json", "https://pb.example.com/api/v4/json///"]
		{
			let url = normalize_base_url(endpoint).expect("Endpoint should parse.");

			assert_eq!(url.as_str(), "https://pb.example.com/api/v4/json/");
		}
	}

	#[test]
	fn invalid_base_url_is_rejected() {
		let err = normalize_base_url("not a url").expect_err("Relative endpoint should fail.");

		assert!(matches!(err, InitializationError::InvalidBaseUrl { .. }));
	}

	#[test]
	fn defaults_match_profitbase_expectations() {
		let config = TransportConfig::new("https://pb.example.com/api/v4/json")
			.expect("Endpoint should parse.");

		assert_eq!(config.connect_timeout(), Duration::from_secs(5));
		assert_eq!(config.timeout(), Duration::from_secs(10));
		assert_eq!(config.headers().get("accept").map(String::as_str), Some("application/json"));
		assert_eq!(
			config.headers().get("content-type").map(String::as_str),
			Some("application/json")
		);
		assert_eq!(config.user_agent(), None);
	}

	#[test]
	fn overrides_win_over_defaults() {
		let config = TransportConfig::new("https://pb.example.com")
			.expect("Endpoint should parse.")
			.with_timeout(Duration::from_secs(30))
			.with_header("Accept", "application/hal+json")
			.with_header("X-Trace", "on")
			.with_user_agent("crm-sync/1.0");

		assert_eq!(config.timeout(), Duration::from_secs(30));
		assert_eq!(config.connect_timeout(), TransportConfig::DEFAULT_CONNECT_TIMEOUT);
		assert_eq!(
			config.headers().get("accept").map(String::as_str),
			Some("application/hal+json")
		);
		assert_eq!(config.headers().len(), 3);
		assert_eq!(config.user_agent(), Some("crm-sync/1.0"));
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn invalid_header_names_fail_to_build() {
		let config = TransportConfig::new("https://pb.example.com")
			.expect("Endpoint should parse.")
			.with_header("bad header", "x");
		let err = config.header_map().expect_err("Header names with spaces are invalid.");

		assert!(matches!(err, InitializationError::InvalidHeader { name } if name == "bad header"));
	}
}
