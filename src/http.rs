//! Transport primitives for Profitbase API calls.
//!
//! The client depends on HTTP only through [`Transport`]: a single `send` operation that
//! receives a method, a path relative to the API base URL, an already-encoded query string,
//! and an optional JSON body. Implementations must hand back every HTTP status as a
//! [`TransportResponse`] and reserve errors for failures where no response exists.

// crates.io
#[cfg(feature = "reqwest")] use reqwest::Method as ReqwestMethod;
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")]
use crate::{config::TransportConfig, error::InitializationError};

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks able to execute Profitbase requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared behind an
/// [`Arc`], and must not turn non-2xx statuses into errors.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and returns the raw response.
	fn send(&self, request: TransportRequest) -> TransportFuture<'_>;
}

/// HTTP methods used by the Profitbase API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical upper-case method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for ReqwestMethod {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => ReqwestMethod::GET,
			Method::Post => ReqwestMethod::POST,
			Method::Put => ReqwestMethod::PUT,
			Method::Patch => ReqwestMethod::PATCH,
			Method::Delete => ReqwestMethod::DELETE,
		}
	}
}

/// Fully prepared request handed to a [`Transport`].
#[derive(Clone, Debug, PartialEq)]
pub struct TransportRequest {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the API base URL.
	pub path: String,
	/// Encoded query string without the leading `?`.
	pub query: Option<String>,
	/// JSON payload.
	pub body: Option<serde_json::Value>,
}

/// Raw HTTP response returned by a [`Transport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
	status: u16,
	headers: Vec<(String, String)>,
	body: Vec<u8>,
}
impl TransportResponse {
	/// Assembles a response from its parts; header names are stored lower-cased.
	pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
		let headers =
			headers.into_iter().map(|(name, value)| (name.to_ascii_lowercase(), value)).collect();

		Self { status, headers, body }
	}

	/// HTTP status code.
	pub fn status(&self) -> u16 {
		self.status
	}

	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// All headers in the order received.
	pub fn headers(&self) -> &[(String, String)] {
		&self.headers
	}

	/// First value of the header called `name` (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(existing, _)| existing.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Raw body bytes.
	pub fn body(&self) -> &[u8] {
		&self.body
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Deserializes the body as JSON, reporting the path of the first mismatch.
	pub fn json<T>(&self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
	}

	/// Consumes the response, returning the body bytes.
	pub fn into_body(self) -> Vec<u8> {
		self.body
	}
}

/// [`Transport`] backed by a shared [`ReqwestClient`] and a fixed base URL.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	base_url: Url,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a reqwest client from `config`.
	pub fn new(config: &TransportConfig) -> Result<Self, InitializationError> {
		let client = ReqwestClient::builder()
			.connect_timeout(config.connect_timeout())
			.timeout(config.timeout())
			.default_headers(config.header_map()?);
		let client = match config.user_agent() {
			Some(agent) => client.user_agent(agent),
			None => client,
		};

		Ok(Self::with_client(client.build()?, config.base_url().clone()))
	}

	/// Wraps an existing reqwest [`ReqwestClient`]; `base_url` should end with `/`.
	pub fn with_client(client: ReqwestClient, base_url: Url) -> Self {
		Self { client, base_url }
	}

	/// Base URL every request path is resolved against.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Resolves `request` into an absolute URL.
	pub fn resolve(&self, request: &TransportRequest) -> Result<Url, TransportError> {
		let mut url = self
			.base_url
			.join(request.path.trim_start_matches('/'))
			.map_err(|source| TransportError::InvalidPath { path: request.path.clone(), source })?;

		url.set_query(request.query.as_deref());

		Ok(url)
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let url = self.resolve(&request)?;
			let mut builder = self.client.request(request.method.into(), url);

			if let Some(body) = &request.body {
				builder = builder.body(serde_json::to_vec(body)?);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect();
			let body = response.bytes().await?.to_vec();

			Ok(TransportResponse::new(status, headers, body))
		})
	}
}
