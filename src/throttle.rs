//! Minimum spacing between outbound requests.
//!
//! The gate remembers when the last request returned. If the next request starts before
//! the configured interval has elapsed, it waits the *full* interval rather than the
//! remainder, so two requests are always at least one interval apart. Waiting is
//! non-blocking (`tokio::time::sleep`).

// crates.io
use tokio::time::{self, Instant};
// self
use crate::_prelude::*;

/// Interval applied when none is configured.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Throttle gate shared by every request of one client.
///
/// The check and the wait are not atomic: concurrent callers may pass the gate together.
#[derive(Debug)]
pub struct ThrottleGate {
	min_interval: Mutex<Duration>,
	last_request_at: Mutex<Option<Instant>>,
}
impl ThrottleGate {
	/// Creates a gate with the given interval; [`Duration::ZERO`] disables throttling.
	pub fn new(min_interval: Duration) -> Self {
		Self { min_interval: Mutex::new(min_interval), last_request_at: Mutex::new(None) }
	}

	/// Currently configured interval.
	pub fn min_interval(&self) -> Duration {
		*self.min_interval.lock()
	}

	/// Replaces the interval; [`Duration::ZERO`] disables throttling.
	pub fn set_min_interval(&self, interval: Duration) {
		*self.min_interval.lock() = interval;
	}

	/// Instant the last request returned, if any.
	pub fn last_request_at(&self) -> Option<Instant> {
		*self.last_request_at.lock()
	}

	/// Whether a request may start right now without waiting.
	pub fn is_request_allowed(&self) -> bool {
		match self.last_request_at() {
			None => true,
			Some(last) => last.elapsed() >= self.min_interval(),
		}
	}

	/// Waits the configured interval when the previous request was too recent.
	///
	/// Returns the time slept, if any.
	pub async fn wait(&self) -> Option<Duration> {
		if self.is_request_allowed() {
			return None;
		}

		let interval = self.min_interval();

		crate::obs::trace_throttle_wait(interval);
		time::sleep(interval).await;

		Some(interval)
	}

	/// Marks "now" as the moment the last request returned.
	pub fn record(&self) {
		*self.last_request_at.lock() = Some(Instant::now());
	}
}
impl Default for ThrottleGate {
	fn default() -> Self {
		Self::new(DEFAULT_MIN_INTERVAL)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn first_request_passes_immediately() {
		let gate = ThrottleGate::default();
		let start = Instant::now();

		assert_eq!(gate.wait().await, None);
		assert_eq!(start.elapsed(), Duration::ZERO);
	}

	#[tokio::test(start_paused = true)]
	async fn recent_request_waits_full_interval() {
		let gate = ThrottleGate::default();

		gate.record();
		time::advance(Duration::from_millis(900)).await;

		let start = Instant::now();

		assert_eq!(gate.wait().await, Some(DEFAULT_MIN_INTERVAL));
		assert!(start.elapsed() >= DEFAULT_MIN_INTERVAL);
	}

	#[tokio::test(start_paused = true)]
	async fn elapsed_interval_skips_wait() {
		let gate = ThrottleGate::new(Duration::from_secs(2));

		gate.record();
		time::advance(Duration::from_secs(2)).await;

		assert!(gate.is_request_allowed());
		assert_eq!(gate.wait().await, None);
	}

	#[tokio::test(start_paused = true)]
	async fn zero_interval_disables_throttling() {
		let gate = ThrottleGate::default();

		gate.set_min_interval(Duration::ZERO);
		gate.record();

		let start = Instant::now();

		assert_eq!(gate.wait().await, None);
		assert_eq!(start.elapsed(), Duration::ZERO);
	}

	#[tokio::test(start_paused = true)]
	async fn record_moves_the_last_request_forward() {
		let gate = ThrottleGate::default();

		assert!(gate.last_request_at().is_none());

		gate.record();

		let first = gate.last_request_at().expect("Recorded instant should be stored.");

		time::advance(Duration::from_millis(10)).await;
		gate.record();

		assert!(gate.last_request_at().expect("Recorded instant should be stored.") > first);
	}
}
