//! Client-level error types shared by construction, authentication, and request dispatch.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The transport could not be built; raised only while constructing a client.
	#[error(transparent)]
	Initialization(#[from] InitializationError),
	/// Obtaining an access token failed.
	#[error(transparent)]
	TokenRequest(#[from] TokenRequestError),
	/// A request could not be completed.
	#[error(transparent)]
	Runtime(#[from] RuntimeError),
}

/// Failures raised while building the underlying transport.
#[derive(Debug, ThisError)]
pub enum InitializationError {
	/// HTTP client could not be constructed.
	#[error("Failed to initialize HTTP client.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base endpoint cannot be parsed as an absolute URL.
	#[error("Base endpoint `{endpoint}` is not a valid URL.")]
	InvalidBaseUrl {
		/// Endpoint as supplied by the caller.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A default header name or value is not valid HTTP.
	#[error("Default header `{name}` is invalid.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
}
impl InitializationError {
	/// Wraps a transport's builder failure inside [`InitializationError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for InitializationError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised while obtaining an access token from the authentication endpoint.
#[derive(Debug, ThisError)]
pub enum TokenRequestError {
	/// Authentication endpoint answered with anything but `200 OK`.
	#[error("Access token request failed with status {status}.")]
	UnexpectedStatus {
		/// HTTP status code returned by the endpoint.
		status: u16,
	},
	/// Authentication endpoint returned a body that is not valid JSON.
	#[error("Access token response is not valid JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code returned by the endpoint.
		status: u16,
	},
	/// Authentication endpoint returned JSON without a usable `access_token`.
	#[error("Access token response does not contain an access token.")]
	MissingAccessToken,
	/// Transport failed while calling the authentication endpoint.
	#[error("Failed to obtain access token from Profitbase API.")]
	Transport {
		/// Underlying transport failure.
		#[source]
		source: TransportError,
	},
}

/// Failures raised by the request orchestrator.
#[derive(Debug, ThisError)]
pub enum RuntimeError {
	/// Access token expired and obtaining a new one failed.
	#[error("Failed to refresh access token.")]
	RefreshFailed {
		/// Reason the refresh failed.
		#[source]
		source: TokenRequestError,
	},
	/// Access token was reported expired again right after a refresh.
	#[error("Access token expired and refresh failed.")]
	TokenExpiredAfterRetry,
	/// Transport failed while dispatching a request.
	#[error("Unexpected error occurred during HTTP request.")]
	Unexpected {
		/// Underlying transport failure.
		#[source]
		source: TransportError,
	},
}

/// Transport-level failures (network, IO, request assembly).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the Profitbase API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request path cannot be joined onto the base URL.
	#[error("Request path `{path}` cannot be resolved against the base URL.")]
	InvalidPath {
		/// Path as requested.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Body(#[from] serde_json::Error),
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the Profitbase API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn runtime_errors_keep_their_cause() {
		let err = Error::from(RuntimeError::RefreshFailed {
			source: TokenRequestError::UnexpectedStatus { status: 401 },
		});

		assert_eq!(err.to_string(), "Failed to refresh access token.");

		let source = err.source().expect("Refresh failure should expose its cause.");

		assert_eq!(source.to_string(), "Access token request failed with status 401.");
	}

	#[test]
	fn network_errors_wrap_the_original_fault() {
		let err = RuntimeError::Unexpected {
			source: TransportError::network(std::io::Error::other("connection reset")),
		};
		let transport = err.source().expect("Runtime error should expose the transport error.");
		let root = transport.source().expect("Transport error should expose the network error.");

		assert_eq!(root.to_string(), "connection reset");
	}
}
