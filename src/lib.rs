//! Async Profitbase API client: authenticates with an API key, spaces outgoing requests with a
//! throttle gate, and transparently refreshes an expired access token once per call.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod query;
pub mod session;
pub mod throttle;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// self
	use crate::{
		client::Client,
		error::TransportError,
		http::{Transport, TransportFuture, TransportRequest, TransportResponse},
	};

	/// One scripted reply handed out by [`ScriptedTransport`].
	#[derive(Debug)]
	pub enum ScriptedReply {
		/// Respond with the given status and JSON body.
		Json(u16, serde_json::Value),
		/// Respond with the given status and raw body text.
		Raw(u16, &'static str),
		/// Fail at the transport level.
		Fault(&'static str),
	}

	/// Request observed by [`ScriptedTransport`], captured together with the (paused-aware)
	/// instant it was sent.
	#[derive(Clone, Debug)]
	pub struct RecordedRequest {
		/// Request as handed to the transport.
		pub request: TransportRequest,
		/// Instant the transport received the request.
		pub sent_at: tokio::time::Instant,
	}

	/// In-memory transport replaying a fixed sequence of replies and recording every request.
	#[derive(Debug, Default)]
	pub struct ScriptedTransport {
		replies: Mutex<VecDeque<ScriptedReply>>,
		requests: Mutex<Vec<RecordedRequest>>,
	}
	impl ScriptedTransport {
		/// Creates a transport that answers with `replies` in order.
		pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
			Self {
				replies: Mutex::new(replies.into_iter().collect()),
				requests: Default::default(),
			}
		}

		/// Convenience reply carrying a successful authentication payload.
		pub fn token(token: &str) -> ScriptedReply {
			ScriptedReply::Json(200, serde_json::json!({ "access_token": token }))
		}

		/// Returns every request observed so far.
		pub fn requests(&self) -> Vec<RecordedRequest> {
			self.requests.lock().clone()
		}

		/// Returns how many scripted replies were not consumed.
		pub fn remaining(&self) -> usize {
			self.replies.lock().len()
		}
	}
	impl Transport for ScriptedTransport {
		fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
			Box::pin(async move {
				self.requests
					.lock()
					.push(RecordedRequest { request, sent_at: tokio::time::Instant::now() });

				let reply = self.replies.lock().pop_front();

				match reply {
					Some(ScriptedReply::Json(status, body)) => Ok(TransportResponse::new(
						status,
						vec![("content-type".into(), "application/json".into())],
						body.to_string().into_bytes(),
					)),
					Some(ScriptedReply::Raw(status, body)) =>
						Ok(TransportResponse::new(status, Vec::new(), body.as_bytes().to_vec())),
					Some(ScriptedReply::Fault(message)) =>
						Err(TransportError::network(std::io::Error::other(message))),
					None => Err(TransportError::network(std::io::Error::other(
						"Scripted transport ran out of replies.",
					))),
				}
			})
		}
	}

	/// Builds a [`Client`] over a [`ScriptedTransport`] seeded with `replies`.
	///
	/// The first reply must answer the initial authentication request.
	pub async fn build_scripted_client(
		replies: impl IntoIterator<Item = ScriptedReply>,
	) -> (Result<Client<ScriptedTransport>>, Arc<ScriptedTransport>) {
		let transport = Arc::new(ScriptedTransport::new(replies));
		let client = Client::with_transport("test-key", transport.clone()).await;

		(client, transport)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::Result;
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

pub use client::{Client, RequestSpec};
pub use config::TransportConfig;
pub use query::{QueryParams, QueryValue, Scalar, build_query_string};
