//! Optional observability helpers for provider calls.
//!
//! # Feature Flags
//!
//! - `tracing`: every network operation runs in an `ovh_signer.call` span carrying `call`,
//!   `stage` (HTTP verb or call site) and `endpoint`. Failed calls fill in `status` and
//!   `api_code` when the provider answered.
//! - `metrics`: `ovh_signer_call_total{call,outcome}` counts attempts and outcomes, and
//!   `ovh_signer_call_error_total{call,error}` counts failures by [`Error::category`].

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Network operations performed by the signing client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Unauthenticated server time lookup.
	TimeSync,
	/// Unsigned consumer-key request.
	CredentialRequest,
	/// Signed API call.
	Signed,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::TimeSync => "time_sync",
			CallKind::CredentialRequest => "credential_request",
			CallKind::Signed => "signed",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a call span and records attempt and outcome counters around it.
pub(crate) async fn observe<T, Fut>(
	kind: CallKind,
	stage: &'static str,
	endpoint: &str,
	fut: Fut,
) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = CallSpan::new(kind, stage, endpoint);

	record_call_outcome(kind, CallOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_call_outcome(kind, CallOutcome::Success),
		Err(e) => {
			span.record_error(e);
			record_call_outcome(kind, CallOutcome::Failure);
			record_call_error(kind, e);
		},
	}

	result
}
