use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{ProviderKind, SourceDescriptor};
use crate::engine::error::{HostError, ResolveError};
use crate::engine::host::{CallOutput, HostFunction, HostRegistry, HostValue};
use crate::engine::http::looks_like_url;

/// Outcome of classifying a descriptor.
///
/// Carries the callable handle and the probe output for function kinds so the
/// probe's result can serve the first resolution instead of a second call.
pub struct Classification {
	pub kind: ProviderKind,
	/// The error that forced [`ProviderKind::Error`], if any.
	pub failure: Option<ResolveError>,
	pub(crate) function: Option<Arc<dyn HostFunction>>,
	pub(crate) probe: Option<CallOutput>,
}

impl Classification {
	fn of(kind: ProviderKind) -> Self {
		Self {
			kind,
			failure: None,
			function: None,
			probe: None,
		}
	}

	fn failed(descriptor: &str, reason: impl Into<String>) -> Self {
		Self {
			failure: Some(ResolveError::Classification {
				descriptor: descriptor.to_string(),
				reason: reason.into(),
			}),
			..Self::of(ProviderKind::Error)
		}
	}
}

impl fmt::Debug for Classification {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Classification")
			.field("kind", &self.kind)
			.field("failure", &self.failure)
			.field("probe", &self.probe)
			.finish_non_exhaustive()
	}
}

/// Determine the provider kind of `descriptor`.
///
/// Checks run in a fixed order and the first match wins. A descriptor naming a
/// host function is probed once with no arguments to learn whether it answers
/// with a future; that call is part of classification.
pub fn classify(descriptor: &SourceDescriptor, host: &HostRegistry) -> Classification {
	let classification = match descriptor {
		SourceDescriptor::Inline => Classification::of(ProviderKind::InlineMarkup),
		SourceDescriptor::Function(name) => classify_declared_function(name, host),
		SourceDescriptor::Options(text) => classify_options(text, host),
	};
	debug!(%descriptor, kind = %classification.kind, "classified options source");
	classification
}

fn classify_options(text: &str, host: &HostRegistry) -> Classification {
	if text.trim().is_empty() {
		return Classification::of(ProviderKind::InlineMarkup);
	}
	if is_json_array(text) {
		return Classification::of(ProviderKind::JsonLiteral);
	}
	if looks_like_url(text) {
		return Classification::of(ProviderKind::RemoteUrl);
	}

	match host.global(text) {
		Some(HostValue::Function(function)) => match probe_call(function.as_ref()) {
			Ok(Ok(probe)) => {
				let kind = if probe.is_pending() {
					ProviderKind::PromiseFn
				} else {
					ProviderKind::SyncFn
				};
				Classification {
					kind,
					failure: None,
					function: Some(function),
					probe: Some(probe),
				}
			}
			Ok(Err(err)) => Classification::failed(text, format!("probe call raised: {err}")),
			Err(_) => Classification::failed(text, "probe call panicked"),
		},
		Some(HostValue::Object(value)) if value.is_object() || value.is_array() => {
			Classification::of(ProviderKind::GlobalRef)
		}
		_ if host.element(text).is_some() => Classification::of(ProviderKind::ElementRef),
		_ => Classification::of(ProviderKind::Unknown),
	}
}

/// Invoke `function` with no arguments, catching a panic as a failed probe.
fn probe_call(
	function: &dyn HostFunction,
) -> std::thread::Result<Result<CallOutput, HostError>> {
	panic::catch_unwind(AssertUnwindSafe(|| function.call(None)))
}

fn classify_declared_function(name: &str, host: &HostRegistry) -> Classification {
	match host.global(name) {
		Some(HostValue::Function(function)) => Classification {
			function: Some(function),
			..Classification::of(ProviderKind::PromiseFn)
		},
		Some(HostValue::Object(_)) => Classification::failed(name, "not a function"),
		None => Classification::of(ProviderKind::Unknown),
	}
}

fn is_json_array(text: &str) -> bool {
	matches!(serde_json::from_str::<Value>(text), Ok(Value::Array(_)))
}
