//! Authenticated request lifecycle.
//!
//! [`Client`] owns the transport, the [`Session`], and the [`ThrottleGate`]. Every call to
//! [`Client::send`] walks the same path: wait at the gate, build the wire request with the
//! current access token, dispatch it, and record the dispatch time. A `403 Forbidden` answer
//! means the access token expired; the client refreshes it once and repeats the request.
//! A second `403` on the repeated request, or a failed refresh, is fatal. Every other status,
//! including 4xx/5xx, is returned to the caller untouched.

mod endpoints;

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	error::{RuntimeError, TokenRequestError, TransportError},
	http::{Method, Transport, TransportRequest, TransportResponse},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	query::{QueryParams, build_query_string},
	session::{AUTHENTICATION_PATH, AccessToken, ApiKey, AuthenticationRequest, Session},
	throttle::ThrottleGate,
};
#[cfg(feature = "reqwest")]
use crate::{config::TransportConfig, http::ReqwestTransport};

/// Status code Profitbase uses to signal an expired access token.
pub const TOKEN_EXPIRED_STATUS: u16 = 403;
/// Query parameter carrying the access token.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// JSON object sent as a request body.
pub type Body = Map<String, Value>;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ProfitbaseClient = Client<ReqwestTransport>;

/// Method, path, query, and body of one logical API call.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestSpec {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the API base URL.
	pub path: String,
	/// Query parameters; the access token is added at dispatch time.
	pub query: QueryParams,
	/// JSON body; omitted from the wire when empty.
	pub body: Body,
}
impl RequestSpec {
	/// Creates a spec without query parameters or body.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), query: QueryParams::new(), body: Body::new() }
	}

	/// Shorthand for a `GET` spec.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Shorthand for a `POST` spec.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Shorthand for a `PUT` spec.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	/// Shorthand for a `PATCH` spec.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::Patch, path)
	}

	/// Merges `query` over the current parameters; incoming keys win.
	pub fn with_query(mut self, query: QueryParams) -> Self {
		self.query.merge(query);

		self
	}

	/// Merges `body` over the current body; incoming keys win.
	pub fn with_body(mut self, body: Body) -> Self {
		self.body.extend(body);

		self
	}
}

/// Result of a single dispatch, before retry handling.
#[derive(Debug)]
enum AttemptOutcome {
	Completed(TransportResponse),
	Expired,
	Fault(TransportError),
}

/// Profitbase API client.
///
/// Construction authenticates immediately, so a `Client` always holds an access token.
/// Methods take `&self`; the session and gate use interior locks, but request spacing is
/// only guaranteed for sequential use of one client.
pub struct Client<T>
where
	T: ?Sized + Transport,
{
	transport: Arc<T>,
	session: Session,
	throttle: ThrottleGate,
}
impl<T> Client<T>
where
	T: ?Sized + Transport,
{
	/// Creates a client over `transport` and performs the initial authentication.
	///
	/// Fails with [`Error::TokenRequest`](crate::error::Error::TokenRequest) when no access
	/// token can be obtained.
	pub async fn with_transport(
		api_key: impl Into<String>,
		transport: impl Into<Arc<T>>,
	) -> Result<Self> {
		let client = Self {
			transport: transport.into(),
			session: Session::new(ApiKey::new(api_key)),
			throttle: ThrottleGate::default(),
		};

		client.refresh().await?;

		Ok(client)
	}

	/// Credential state of this client.
	pub fn session(&self) -> &Session {
		&self.session
	}

	/// Snapshot of the current access token.
	pub fn access_token(&self) -> Option<AccessToken> {
		self.session.access_token()
	}

	/// Currently configured minimum spacing between requests.
	pub fn min_request_interval(&self) -> Duration {
		self.throttle.min_interval()
	}

	/// Sets the minimum spacing between requests; [`Duration::ZERO`] disables throttling.
	pub fn set_min_request_interval(&self, interval: Duration) {
		self.throttle.set_min_interval(interval);
	}

	/// Posts `api_key` to the authentication endpoint and returns the raw response.
	///
	/// The status is not interpreted; use [`Client::refresh`] to store a new token.
	pub async fn authenticate(&self, api_key: &str) -> Result<TransportResponse> {
		self.dispatch_authentication(api_key)
			.await
			.map_err(|source| RuntimeError::Unexpected { source }.into())
	}

	/// Authenticates with `api_key` and extracts the access token from the response.
	pub async fn fetch_access_token(
		&self,
		api_key: &str,
	) -> Result<AccessToken, TokenRequestError> {
		let response = self
			.dispatch_authentication(api_key)
			.await
			.map_err(|source| TokenRequestError::Transport { source })?;

		AccessToken::from_response(&response)
	}

	/// Obtains a new access token with the session's API key and stores it.
	pub async fn refresh(&self) -> Result<()> {
		self.refresh_access_token().await?;

		Ok(())
	}

	/// Sends `spec` with automatic token refresh on expiry.
	pub async fn request(&self, spec: &RequestSpec) -> Result<TransportResponse> {
		self.send(spec, false).await
	}

	/// Sends `spec`; when `is_retry` is set an expired token is fatal instead of triggering a
	/// refresh.
	pub async fn send(&self, spec: &RequestSpec, is_retry: bool) -> Result<TransportResponse> {
		const KIND: OperationKind = OperationKind::Request;

		let span = OperationSpan::new(KIND, "send");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span.instrument(self.send_with_refresh(spec, is_retry)).await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(err) => {
				obs::trace_failure(KIND, err);
				obs::record_operation_outcome(KIND, OperationOutcome::Failure);
			},
		}

		result
	}

	/// Builds the wire request for `spec` using the current access token.
	///
	/// The token overwrites any caller-supplied `access_token` parameter; the query and body
	/// are omitted when empty.
	pub fn build_request(&self, spec: &RequestSpec) -> TransportRequest {
		let mut query = spec.query.clone();

		if let Some(token) = self.session.access_token() {
			query.insert(ACCESS_TOKEN_PARAM, token.expose());
		}

		TransportRequest {
			method: spec.method,
			path: spec.path.clone(),
			query: (!query.is_empty()).then(|| build_query_string(&query)),
			body: (!spec.body.is_empty()).then(|| Value::Object(spec.body.clone())),
		}
	}

	async fn send_with_refresh(
		&self,
		spec: &RequestSpec,
		mut is_retry: bool,
	) -> Result<TransportResponse> {
		loop {
			match self.attempt(spec, is_retry).await {
				AttemptOutcome::Completed(response) => return Ok(response),
				AttemptOutcome::Fault(source) =>
					return Err(RuntimeError::Unexpected { source }.into()),
				AttemptOutcome::Expired => {
					obs::record_operation_outcome(
						OperationKind::Request,
						OperationOutcome::Expired,
					);

					if is_retry {
						return Err(RuntimeError::TokenExpiredAfterRetry.into());
					}

					self.refresh_access_token()
						.await
						.map_err(|source| RuntimeError::RefreshFailed { source })?;

					is_retry = true;
				},
			}
		}
	}

	async fn attempt(&self, spec: &RequestSpec, is_retry: bool) -> AttemptOutcome {
		self.throttle.wait().await;

		let request = self.build_request(spec);

		obs::trace_dispatch(&request, is_retry);

		match self.dispatch(request).await {
			Ok(response) if response.status() == TOKEN_EXPIRED_STATUS => {
				obs::trace_token_expired(spec.method, &spec.path, is_retry);

				AttemptOutcome::Expired
			},
			Ok(response) => AttemptOutcome::Completed(response),
			Err(err) => AttemptOutcome::Fault(err),
		}
	}

	async fn refresh_access_token(&self) -> Result<AccessToken, TokenRequestError> {
		const KIND: OperationKind = OperationKind::Refresh;

		let span = OperationSpan::new(KIND, "refresh_access_token");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result: Result<AccessToken, TokenRequestError> = span
			.instrument(async move {
				let _refresh = self.session.refresh_guard().lock().await;
				let token = self.fetch_access_token(self.session.api_key().expose()).await?;

				obs::trace_token_refreshed(token.obtained_at());
				self.session.replace_access_token(token.clone());

				Ok(token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(err) => {
				obs::trace_failure(KIND, err);
				obs::record_operation_outcome(KIND, OperationOutcome::Failure);
			},
		}

		result
	}

	async fn dispatch_authentication(
		&self,
		api_key: &str,
	) -> Result<TransportResponse, TransportError> {
		const KIND: OperationKind = OperationKind::Authenticate;

		let span = OperationSpan::new(KIND, "authenticate");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result: Result<TransportResponse, TransportError> = span
			.instrument(async move {
				let body = serde_json::to_value(AuthenticationRequest::new(api_key))?;

				self.throttle.wait().await;
				self.dispatch(TransportRequest {
					method: Method::Post,
					path: AUTHENTICATION_PATH.into(),
					query: None,
					body: Some(body),
				})
				.await
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}

	async fn dispatch(
		&self,
		request: TransportRequest,
	) -> Result<TransportResponse, TransportError> {
		let result = self.transport.send(request).await;

		self.throttle.record();

		result
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestTransport> {
	/// Builds the default reqwest transport from `config` and authenticates.
	///
	/// Fails with [`Error::Initialization`](crate::error::Error::Initialization) when the
	/// transport cannot be built and with
	/// [`Error::TokenRequest`](crate::error::Error::TokenRequest) when authentication fails.
	pub async fn create(api_key: impl Into<String>, config: TransportConfig) -> Result<Self> {
		let transport = ReqwestTransport::new(&config)?;

		Self::with_transport(api_key, transport).await
	}

	/// [`Client::create`] with the default transport settings for `base_endpoint`.
	pub async fn connect(api_key: impl Into<String>, base_endpoint: &str) -> Result<Self> {
		Self::create(api_key, TransportConfig::new(base_endpoint)?).await
	}
}
impl<T> Debug for Client<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("authenticated", &self.session.is_authenticated())
			.field("min_request_interval", &self.throttle.min_interval())
			.finish()
	}
}
