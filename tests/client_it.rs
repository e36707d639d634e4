// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use profitbase_client::{
	Client, QueryParams, RequestSpec, TransportConfig,
	client::{Body, ProfitbaseClient},
	error::{Error, InitializationError, RuntimeError, TokenRequestError},
};

const API_KEY: &str = "app-key";
const API_PREFIX: &str = "/api/v4/json";

fn api_path(path: &str) -> String {
	format!("{API_PREFIX}/{path}")
}

async fn mock_authentication<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path(api_path("authentication"))
				.header("content-type", "application/json")
				.json_body(json!({ "credentials": { "pb_api_key": API_KEY }, "type": "api-app" }));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "access_token": token }));
		})
		.await
}

async fn connect(server: &MockServer) -> ProfitbaseClient {
	let client = Client::connect(API_KEY, &server.url(API_PREFIX))
		.await
		.expect("Client should authenticate against the mock server.");

	client.set_min_request_interval(Duration::ZERO);

	client
}

#[tokio::test]
async fn connect_authenticates_and_signs_requests() {
	let server = MockServer::start_async().await;
	let auth = mock_authentication(&server, "t1").await;
	let houses = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(api_path("house"))
				.query_param("projectId", "7")
				.query_param("access_token", "t1");
			then.status(200).json_body(json!({ "data": [{ "id": 1 }] }));
		})
		.await;
	let client = connect(&server).await;
	let response = client
		.houses(QueryParams::new().with("projectId", 7))
		.await
		.expect("House listing should succeed.");
	let body: Value = response.json().expect("Body should be JSON.");

	assert_eq!(response.status(), 200);
	assert_eq!(body["data"][0]["id"], 1);

	auth.assert_calls_async(1).await;
	houses.assert_calls_async(1).await;
}

#[tokio::test]
async fn construction_fails_without_a_token() {
	let cases =
		[(500, "Internal Server Error"), (200, "{invalid json}"), (200, r#"{"token":"t1"}"#)];

	for (status, body) in cases {
		let server = MockServer::start_async().await;

		server
			.mock_async(|when, then| {
				when.method(POST).path(api_path("authentication"));
				then.status(status).body(body);
			})
			.await;

		let err = Client::connect(API_KEY, &server.url(API_PREFIX))
			.await
			.expect_err("Construction must fail without an access token.");

		assert!(matches!(err, Error::TokenRequest(_)), "{err:?}");
	}
}

#[tokio::test]
async fn construction_reports_the_authentication_status() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path(api_path("authentication"));
			then.status(401).json_body(json!({ "error": "Invalid API key" }));
		})
		.await;

	let err = Client::connect(API_KEY, &server.url(API_PREFIX))
		.await
		.expect_err("Rejected keys must fail construction.");

	assert!(matches!(
		err,
		Error::TokenRequest(TokenRequestError::UnexpectedStatus { status: 401 })
	));
}

#[tokio::test]
async fn invalid_base_endpoint_is_an_initialization_error() {
	let err = Client::connect(API_KEY, "not a url")
		.await
		.expect_err("Relative endpoints cannot be used as a base.");

	assert!(matches!(err, Error::Initialization(InitializationError::InvalidBaseUrl { .. })));
}

#[tokio::test]
async fn expired_token_is_refreshed_once() {
	let server = MockServer::start_async().await;
	let first_auth = mock_authentication(&server, "t1").await;
	let expired = server
		.mock_async(|when, then| {
			when.method(GET).path(api_path("projects")).query_param("access_token", "t1");
			then.status(403).json_body(json!({ "error": "Token expired" }));
		})
		.await;
	let fresh = server
		.mock_async(|when, then| {
			when.method(GET).path(api_path("projects")).query_param("access_token", "t2");
			then.status(200).json_body(json!({ "data": "success after retry" }));
		})
		.await;
	let client = connect(&server).await;

	first_auth.delete_async().await;

	let second_auth = mock_authentication(&server, "t2").await;
	let response = client.projects(None, QueryParams::new()).await.expect("Retry should succeed.");
	let body: Value = response.json().expect("Body should be JSON.");

	assert_eq!(body, json!({ "data": "success after retry" }));
	assert_eq!(client.access_token().map(|t| t.expose().to_owned()), Some("t2".into()));

	second_auth.assert_calls_async(1).await;
	expired.assert_calls_async(1).await;
	fresh.assert_calls_async(1).await;
}

#[tokio::test]
async fn second_expiry_is_fatal() {
	let server = MockServer::start_async().await;
	let auth = mock_authentication(&server, "t1").await;
	let forbidden = server
		.mock_async(|when, then| {
			when.method(GET).path(api_path("user/info"));
			then.status(403).json_body(json!({ "error": "Token expired" }));
		})
		.await;
	let client = connect(&server).await;
	let err = client.user_info(QueryParams::new()).await.expect_err("Second 403 must be fatal.");

	assert!(matches!(err, Error::Runtime(RuntimeError::TokenExpiredAfterRetry)));
	assert_eq!(err.to_string(), "Access token expired and refresh failed.");

	auth.assert_calls_async(2).await;
	forbidden.assert_calls_async(2).await;
}

#[tokio::test]
async fn failed_refresh_surfaces_as_runtime_error() {
	let server = MockServer::start_async().await;
	let first_auth = mock_authentication(&server, "t1").await;
	let forbidden = server
		.mock_async(|when, then| {
			when.method(GET).path(api_path("plan"));
			then.status(403).json_body(json!({ "error": "Forbidden" }));
		})
		.await;
	let client = connect(&server).await;

	first_auth.delete_async().await;
	server
		.mock_async(|when, then| {
			when.method(POST).path(api_path("authentication"));
			then.status(401).json_body(json!({ "error": "Invalid API key" }));
		})
		.await;

	let err = client.plans(QueryParams::new()).await.expect_err("Refresh failure must surface.");

	assert_eq!(err.to_string(), "Failed to refresh access token.");
	assert!(matches!(
		err,
		Error::Runtime(RuntimeError::RefreshFailed {
			source: TokenRequestError::UnexpectedStatus { status: 401 }
		})
	));

	forbidden.assert_calls_async(1).await;
}

#[tokio::test]
async fn error_statuses_other_than_403_are_returned() {
	let server = MockServer::start_async().await;
	let auth = mock_authentication(&server, "t1").await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(api_path("render"));
			then.status(500).json_body(json!({ "error": "Server Error" }));
		})
		.await;

	let client = connect(&server).await;
	let response =
		client.renders(Some(3), QueryParams::new()).await.expect("A 500 is not a client error.");

	assert_eq!(response.status(), 500);
	assert_eq!(response.text(), r#"{"error":"Server Error"}"#);

	auth.assert_calls_async(1).await;
}

#[tokio::test]
async fn body_endpoints_send_merged_json() {
	let server = MockServer::start_async().await;

	mock_authentication(&server, "t1").await;

	let reserve = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(api_path("queue-reserve"))
				.query_param("access_token", "t1")
				.header("content-type", "application/json")
				.json_body(json!({ "propertyId": 11, "dealId": 500, "comment": "vip" }));
			then.status(201).json_body(json!({ "id": 99 }));
		})
		.await;
	let client = connect(&server).await;
	let extra = Body::from_iter([("comment".to_owned(), json!("vip"))]);
	let response = client
		.queue_reserve_create(11, 500, extra, QueryParams::new())
		.await
		.expect("Queue reservation should succeed.");

	assert_eq!(response.status(), 201);

	reserve.assert_calls_async(1).await;
}

#[tokio::test]
async fn generic_request_reaches_arbitrary_paths() {
	let server = MockServer::start_async().await;

	mock_authentication(&server, "t1").await;

	let history = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(api_path("property/history/5"))
				.query_param("limit", "10")
				.query_param("access_token", "t1");
			then.status(200).json_body(json!({ "data": [] }));
		})
		.await;
	let config = TransportConfig::new(&server.url(API_PREFIX))
		.expect("Mock endpoint should parse.")
		.with_user_agent("profitbase-client-tests");
	let client = Client::create(API_KEY, config).await.expect("Client should authenticate.");

	client.set_min_request_interval(Duration::ZERO);
	let spec =
		RequestSpec::get("/property/history/5").with_query(QueryParams::new().with("limit", 10));

	client
		.request(&spec)
		.await
		.expect("Generic request should succeed.");

	history.assert_calls_async(1).await;
}
