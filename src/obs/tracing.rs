// self
use crate::{
	_prelude::*,
	http::{Method, TransportRequest},
	obs::OperationKind,
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OperationKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"profitbase_client.operation",
				operation = kind.as_str(),
				stage
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Notes that the throttle gate is about to sleep.
pub fn trace_throttle_wait(interval: Duration) {
	#[cfg(feature = "tracing")]
	tracing::debug!(interval_ms = interval.as_millis() as u64, "throttling outbound request");
	#[cfg(not(feature = "tracing"))]
	let _ = interval;
}

/// Notes a request about to hit the transport.
pub fn trace_dispatch(request: &TransportRequest, is_retry: bool) {
	#[cfg(feature = "tracing")]
	tracing::debug!(
		method = request.method.as_str(),
		path = %request.path,
		is_retry,
		"dispatching request"
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (request, is_retry);
}

/// Notes that upstream rejected the access token.
pub fn trace_token_expired(method: Method, path: &str, is_retry: bool) {
	#[cfg(feature = "tracing")]
	tracing::warn!(method = method.as_str(), path, is_retry, "access token rejected as expired");
	#[cfg(not(feature = "tracing"))]
	let _ = (method, path, is_retry);
}

/// Notes that a new access token replaced the previous one; only its issue time is recorded.
pub fn trace_token_refreshed(obtained_at: OffsetDateTime) {
	#[cfg(feature = "tracing")]
	tracing::debug!(obtained_at = obtained_at.unix_timestamp(), "access token refreshed");
	#[cfg(not(feature = "tracing"))]
	let _ = obtained_at;
}

/// Notes a failed operation together with its error chain head.
pub fn trace_failure(kind: OperationKind, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(operation = kind.as_str(), error = %error, "operation failed");
	#[cfg(not(feature = "tracing"))]
	let _ = (kind, error);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn helpers_noop_without_subscriber() {
		let request = TransportRequest {
			method: Method::Get,
			path: "house".into(),
			query: None,
			body: None,
		};

		trace_throttle_wait(Duration::from_secs(1));
		trace_dispatch(&request, false);
		trace_token_expired(Method::Get, "house", true);
		trace_token_refreshed(OffsetDateTime::UNIX_EPOCH);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = OperationSpan::new(OperationKind::Refresh, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
