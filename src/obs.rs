//! Instrumentation for the authenticate, refresh, and request paths of [`Client`].
//!
//! Each path is labeled with an [`OperationKind`]:
//!
//! - `authenticate`: one POST to the authentication endpoint, from construction, a refresh, or
//!   a direct [`Client::authenticate`] call.
//! - `refresh`: a token replacement, either explicit or triggered by a `403`.
//! - `request`: one logical API call, covering its retry when the token expired.
//!
//! Outcomes are `attempt` on entry, then `success` or `failure`. A request also counts
//! `expired` for every `403` it receives, at most twice per call.
//!
//! With the `tracing` feature these run inside `profitbase_client.operation` spans carrying the
//! `operation` label and a `stage` naming the client method, with events for throttle sleeps,
//! dispatches, expiries, and refreshes. Access tokens and API keys never reach a field. With
//! the `metrics` feature the outcomes feed `profitbase_client_operation_total`. Without either
//! feature every helper compiles to nothing.
//!
//! [`Client`]: crate::client::Client
//! [`Client::authenticate`]: crate::client::Client::authenticate

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Client operations observed by the instrumentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Call to the authentication endpoint.
	Authenticate,
	/// Token refresh after an expiry signal or an explicit call.
	Refresh,
	/// Regular API request.
	Request,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::Authenticate => "authenticate",
			OperationKind::Refresh => "refresh",
			OperationKind::Request => "request",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Upstream reported the access token as expired.
	Expired,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
			OperationOutcome::Expired => "expired",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
