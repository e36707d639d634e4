//! Demonstrates authenticating against a (mocked) Profitbase account, listing projects, and
//! recovering transparently from an expired access token.

// std
use std::time::Duration;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use profitbase_client::{Client, QueryParams, TransportConfig};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let first_auth = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v4/json/authentication");
			then.status(200).json_body(json!({ "access_token": "demo-token-1" }));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v4/json/projects")
				.query_param("access_token", "demo-token-1");
			then.status(403).json_body(json!({ "error": "Token expired" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v4/json/projects")
				.query_param("access_token", "demo-token-2");
			then.status(200).json_body(json!({
				"data": [{ "id": 1, "title": "Riverside" }, { "id": 2, "title": "Old Town" }]
			}));
		})
		.await;

	let config = TransportConfig::new(&server.url("/api/v4/json"))?
		.with_timeout(Duration::from_secs(5))
		.with_user_agent("profitbase-demo/0.1");
	let client = Client::create("demo-api-key", config).await?;

	let obtained_at = client.access_token().map(|token| token.obtained_at());

	println!("Authenticated; token obtained at {obtained_at:?}.");

	first_auth.delete_async().await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v4/json/authentication");
			then.status(200).json_body(json!({ "access_token": "demo-token-2" }));
		})
		.await;

	client.set_min_request_interval(Duration::from_millis(200));

	let response = client.projects(Some(false), QueryParams::new()).await?;
	let projects: Value = response.json()?;

	for project in projects["data"].as_array().into_iter().flatten() {
		println!("Project #{}: {}.", project["id"], project["title"]);
	}

	Ok(())
}
