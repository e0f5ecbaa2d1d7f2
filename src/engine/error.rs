use std::time::Duration;

use thiserror::Error;

use super::source::ProviderKind;

/// Failures raised while turning an options source into items.
///
/// None of these cross the widget boundary: the coordinator converts them into
/// an error load state and forwards them to the diagnostic sink.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
	/// The descriptor matched no known kind, or the classification probe raised.
	#[error("could not classify options source '{descriptor}': {reason}")]
	Classification { descriptor: String, reason: String },

	/// Markup or JSON could not be interpreted.
	#[error("failed to parse {what}: {message}")]
	Parse { what: &'static str, message: String },

	/// The remote request failed or returned an unusable response.
	#[error("request to {url} failed: {message}")]
	Transport { url: String, message: String },

	/// A host callable raised or its future rejected.
	#[error("options provider '{name}' failed: {message}")]
	ProviderInvocation { name: String, message: String },

	/// Resolution was attempted for a kind that cannot produce items.
	#[error("unsupported options kind: {kind}")]
	UnsupportedKind { kind: ProviderKind },

	/// The resolution did not settle within the configured limit.
	#[error("options did not resolve within {}ms", after.as_millis())]
	Timeout { after: Duration },
}

impl ResolveError {
	pub fn parse(what: &'static str, message: impl Into<String>) -> Self {
		Self::Parse {
			what,
			message: message.into(),
		}
	}

	pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Transport {
			url: url.into(),
			message: message.into(),
		}
	}

	pub fn invocation(name: impl Into<String>, error: &HostError) -> Self {
		Self::ProviderInvocation {
			name: name.into(),
			message: error.to_string(),
		}
	}
}

/// Error raised by a host-supplied callable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HostError {
	message: String,
}

impl HostError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}

	pub fn message(&self) -> &str {
		&self.message
	}
}

impl From<&str> for HostError {
	fn from(message: &str) -> Self {
		Self::new(message)
	}
}

impl From<String> for HostError {
	fn from(message: String) -> Self {
		Self::new(message)
	}
}
