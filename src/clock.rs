//! Local clock source and the measured offset against the provider clock.

// std
use std::sync::atomic::{AtomicI64, Ordering};
// self
use crate::{_prelude::*, error::MalformedResponseError};

/// Source of local unix time used when stamping signed requests.
pub trait Clock
where
	Self: 'static + Send + Sync,
{
	/// Returns the current unix timestamp in whole seconds.
	fn now_unix(&self) -> i64;
}

/// Wall clock backed by [`OffsetDateTime::now_utc`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now_unix(&self) -> i64 {
		OffsetDateTime::now_utc().unix_timestamp()
	}
}

/// Clock pinned to a caller-controlled unix timestamp; handy for deterministic signatures.
#[derive(Debug, Default)]
pub struct FixedClock(AtomicI64);
impl FixedClock {
	/// Creates a clock frozen at `now`.
	pub fn at(now: i64) -> Self {
		Self(AtomicI64::new(now))
	}

	/// Moves the clock to `now`.
	pub fn set(&self, now: i64) {
		self.0.store(now, Ordering::Release);
	}
}
impl Clock for FixedClock {
	fn now_unix(&self) -> i64 {
		self.0.load(Ordering::Acquire)
	}
}

/// Seconds the local clock runs ahead of the provider (`local - provider`).
///
/// Zero until a synchronization overwrites it; every synchronization replaces the previous
/// measurement.
#[derive(Debug, Default)]
pub struct ClockOffset(AtomicI64);
impl ClockOffset {
	/// Returns the current offset.
	pub fn get(&self) -> i64 {
		self.0.load(Ordering::Acquire)
	}

	/// Overwrites the offset.
	pub fn set(&self, delta: i64) {
		self.0.store(delta, Ordering::Release);
	}

	/// Records a measurement and returns the resulting offset.
	pub fn measure(&self, local: i64, provider: i64) -> i64 {
		let delta = local.saturating_sub(provider);

		self.set(delta);

		delta
	}

	/// Translates a local timestamp onto the provider clock.
	pub fn provider_time(&self, local: i64) -> i64 {
		local.saturating_sub(self.get())
	}
}

/// Parses the server time body (`1700000000` as plain text or JSON).
pub(crate) fn parse_server_time(status: u16, body: &[u8]) -> Result<i64, MalformedResponseError> {
	let text = String::from_utf8_lossy(body);
	let trimmed = text.trim();

	trimmed
		.parse::<i64>()
		.ok()
		.or_else(|| serde_json::from_str::<i64>(trimmed).ok())
		.ok_or_else(|| MalformedResponseError::ServerTime { body: trimmed.to_owned(), status })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn offset_defaults_to_zero() {
		let offset = ClockOffset::default();

		assert_eq!(offset.get(), 0);
		assert_eq!(offset.provider_time(1_700_000_000), 1_700_000_000);
	}

	#[test]
	fn measurement_overwrites_previous_offset() {
		let offset = ClockOffset::default();

		assert_eq!(offset.measure(1_700_000_100, 1_700_000_000), 100);
		assert_eq!(offset.provider_time(1_700_000_200), 1_700_000_100);
		assert_eq!(offset.measure(1_700_000_000, 1_700_000_030), -30);
		assert_eq!(offset.get(), -30);
	}

	#[test]
	fn server_time_accepts_text_and_rejects_garbage() {
		assert_eq!(parse_server_time(200, b"1700000000\n").ok(), Some(1_700_000_000));
		assert_eq!(parse_server_time(200, b" 42 ").ok(), Some(42));

		let err = parse_server_time(200, b"\"soon\"").expect_err("Non-integers should fail.");

		assert!(matches!(err, MalformedResponseError::ServerTime { status: 200, .. }));
	}

	#[test]
	fn fixed_clock_moves_only_when_told() {
		let clock = FixedClock::at(10);

		assert_eq!(clock.now_unix(), 10);

		clock.set(25);

		assert_eq!(clock.now_unix(), 25);
	}

	#[test]
	fn system_clock_is_after_2020() {
		assert!(SystemClock.now_unix() > 1_577_836_800);
	}
}
