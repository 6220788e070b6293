// self
use crate::{
	_prelude::*,
	obs::{CallKind, CallOutcome},
};

/// Counter incremented once per attempt and once per outcome.
pub const CALL_TOTAL: &str = "ovh_signer_call_total";
/// Counter incremented per failed call, labeled by [`Error::category`].
pub const CALL_ERROR_TOTAL: &str = "ovh_signer_call_error_total";

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(CALL_TOTAL, "call" => kind.as_str(), "outcome" => outcome.as_str())
		.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Records which failure class ended a call.
pub fn record_call_error(kind: CallKind, err: &Error) {
	#[cfg(feature = "metrics")]
	metrics::counter!(CALL_ERROR_TOTAL, "call" => kind.as_str(), "error" => err.category())
		.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, err);
}
