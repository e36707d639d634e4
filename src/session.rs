//! Credential and access-token state owned by a client.
//!
//! A [`Session`] holds the API key for its whole lifetime and the access token obtained by
//! the most recent successful authentication. The token is replaced wholesale on refresh;
//! requests already dispatched keep the token they were built with.

// self
use crate::{_prelude::*, error::TokenRequestError, http::TransportResponse};

/// Path of the authentication endpoint, relative to the API base URL.
pub const AUTHENTICATION_PATH: &str = "authentication";
/// Application-type tag sent with every authentication request.
pub const APPLICATION_TYPE: &str = "api-app";

/// Redacted Profitbase API key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);
impl ApiKey {
	/// Wraps a raw API key.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner key. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for ApiKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ApiKey").field(&"<redacted>").finish()
	}
}

/// Bearer access token issued by the authentication endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
	secret: String,
	obtained_at: OffsetDateTime,
}
impl AccessToken {
	/// Wraps a token value; empty values are rejected.
	pub fn new(secret: impl Into<String>) -> Option<Self> {
		let secret = secret.into();

		if secret.is_empty() {
			return None;
		}

		Some(Self { secret, obtained_at: OffsetDateTime::now_utc() })
	}

	/// Extracts the token from an authentication response.
	///
	/// Anything other than `200 OK` carrying a JSON object with a non-empty `access_token`
	/// string is rejected.
	pub fn from_response(response: &TransportResponse) -> Result<Self, TokenRequestError> {
		let status = response.status();

		if status != 200 {
			return Err(TokenRequestError::UnexpectedStatus { status });
		}

		let payload = response
			.json::<AuthenticationPayload>()
			.map_err(|source| TokenRequestError::MalformedResponse { source, status })?;

		payload.access_token.and_then(Self::new).ok_or(TokenRequestError::MissingAccessToken)
	}

	/// Returns the raw token. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.secret
	}

	/// Wall-clock instant the token was received.
	pub fn obtained_at(&self) -> OffsetDateTime {
		self.obtained_at
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("secret", &"<redacted>")
			.field("obtained_at", &self.obtained_at)
			.finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Body posted to the authentication endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct AuthenticationRequest<'a> {
	credentials: Credentials<'a>,
	#[serde(rename = "type")]
	kind: &'static str,
}
impl<'a> AuthenticationRequest<'a> {
	pub(crate) fn new(api_key: &'a str) -> Self {
		Self { credentials: Credentials { pb_api_key: api_key }, kind: APPLICATION_TYPE }
	}
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
	pb_api_key: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthenticationPayload {
	#[serde(default)]
	access_token: Option<String>,
}

/// Per-client credential state.
///
/// Only the refresh path writes the token; the refresh guard serialises concurrent
/// refreshes so each one replaces the token as a whole.
#[derive(Debug)]
pub struct Session {
	api_key: ApiKey,
	access_token: RwLock<Option<AccessToken>>,
	refresh_guard: AsyncMutex<()>,
}
impl Session {
	/// Creates a session that has not authenticated yet.
	pub fn new(api_key: ApiKey) -> Self {
		Self { api_key, access_token: RwLock::new(None), refresh_guard: AsyncMutex::new(()) }
	}

	/// API key used for every authentication.
	pub fn api_key(&self) -> &ApiKey {
		&self.api_key
	}

	/// Snapshot of the current access token, if one was obtained.
	pub fn access_token(&self) -> Option<AccessToken> {
		self.access_token.read().clone()
	}

	/// Whether an access token has been obtained.
	pub fn is_authenticated(&self) -> bool {
		self.access_token.read().is_some()
	}

	pub(crate) fn replace_access_token(&self, token: AccessToken) {
		*self.access_token.write() = Some(token);
	}

	pub(crate) fn refresh_guard(&self) -> &AsyncMutex<()> {
		&self.refresh_guard
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> TransportResponse {
		TransportResponse::new(status, Vec::new(), body.as_bytes().to_vec())
	}

	#[test]
	fn secret_formatters_redact() {
		let key = ApiKey::new("pb-secret");
		let token = AccessToken::new("t1").expect("Non-empty token should be accepted.");

		assert_eq!(format!("{key:?}"), "ApiKey(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
		assert!(!format!("{token:?}").contains("t1"));
	}

	#[test]
	fn authentication_body_carries_key_and_type() {
		let body = serde_json::to_value(AuthenticationRequest::new("pb-key"))
			.expect("Authentication request should serialize.");

		assert_eq!(
			body,
			serde_json::json!({ "credentials": { "pb_api_key": "pb-key" }, "type": "api-app" })
		);
	}

	#[test]
	fn token_is_read_from_successful_response() {
		let token = AccessToken::from_response(&response(200, r#"{"access_token":"t1"}"#))
			.expect("Valid authentication response should yield a token.");

		assert_eq!(token.expose(), "t1");
	}

	#[test]
	fn token_records_when_it_was_obtained() {
		let before = OffsetDateTime::now_utc();
		let token = AccessToken::from_response(&response(200, r#"{"access_token":"t1"}"#))
			.expect("Valid authentication response should yield a token.");
		let after = OffsetDateTime::now_utc();

		assert!(before <= token.obtained_at() && token.obtained_at() <= after);
		assert!(format!("{token:?}").contains("obtained_at"));
	}

	#[test]
	fn non_200_status_is_rejected() {
		let err = AccessToken::from_response(&response(201, r#"{"access_token":"t1"}"#))
			.expect_err("Only 200 responses carry a usable token.");

		assert!(matches!(err, TokenRequestError::UnexpectedStatus { status: 201 }));
	}

	#[test]
	fn malformed_json_is_rejected() {
		let err = AccessToken::from_response(&response(200, "{invalid json}"))
			.expect_err("Malformed JSON should be rejected.");

		assert!(matches!(err, TokenRequestError::MalformedResponse { status: 200, .. }));
	}

	#[test]
	fn missing_or_empty_token_is_rejected() {
		for body in [r#"{"token":"t1"}"#, r#"{"access_token":""}"#, r#"{"access_token":null}"#] {
			let err = AccessToken::from_response(&response(200, body))
				.expect_err("Responses without a usable token should be rejected.");

			assert!(matches!(err, TokenRequestError::MissingAccessToken), "{body}");
		}
	}

	#[test]
	fn session_replaces_token_wholesale() {
		let session = Session::new(ApiKey::new("pb-key"));

		assert!(!session.is_authenticated());

		session.replace_access_token(AccessToken::new("t1").expect("Token should be valid."));
		session.replace_access_token(AccessToken::new("t2").expect("Token should be valid."));

		assert_eq!(
			session.access_token().map(|token| token.expose().to_owned()),
			Some("t2".into())
		);
	}
}
