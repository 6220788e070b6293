// self
use crate::{_prelude::*, obs::CallKind};

/// Future type returned by [`CallSpan::instrument`]; a plain passthrough without `tracing`.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Future type returned by [`CallSpan::instrument`]; a plain passthrough without `tracing`.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// Span wrapped around one provider call.
///
/// Fields: `call`, `stage`, and `endpoint` at creation; `status` and `api_code` once a failed call
/// reports them.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Opens a span for `kind` at `stage` against the resolved `endpoint` base URL.
	pub fn new(kind: CallKind, stage: &'static str, endpoint: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"ovh_signer.call",
				call = kind.as_str(),
				stage,
				endpoint,
				status = tracing::field::Empty,
				api_code = tracing::field::Empty,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage, endpoint);

			Self {}
		}
	}

	/// Records the HTTP status and provider error code carried by `err`, when present.
	pub fn record_error(&self, err: &Error) {
		#[cfg(feature = "tracing")]
		{
			if let Some(status) = err.status() {
				self.span.record("status", status);
			}
			if let Some(code) = err.api_code() {
				self.span.record("api_code", code);
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = err;
		}
	}

	/// Attaches the span to `fut` without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
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
