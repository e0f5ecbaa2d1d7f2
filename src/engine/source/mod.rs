//! Options sources: what the host hands the widget and how it is interpreted.

mod classify;
mod provider;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use classify::{Classification, classify};
pub use provider::{Collaborators, OptionsProvider};
pub(crate) use provider::ProviderSettings;

/// How an options source is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
	/// Option markup supplied with the widget itself.
	InlineMarkup,
	/// A JSON array literal.
	JsonLiteral,
	/// An absolute or root-relative URL answering with JSON.
	RemoteUrl,
	/// A host callable returning a future.
	PromiseFn,
	/// A host callable returning its value directly.
	SyncFn,
	/// A host-global object holding the options.
	GlobalRef,
	/// The id of an element containing `<option>` children.
	ElementRef,
	Unknown,
	Error,
}

impl ProviderKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::InlineMarkup => "inline-markup",
			Self::JsonLiteral => "json-literal",
			Self::RemoteUrl => "remote-url",
			Self::PromiseFn => "promise-fn",
			Self::SyncFn => "sync-fn",
			Self::GlobalRef => "global-ref",
			Self::ElementRef => "element-ref",
			Self::Unknown => "unknown",
			Self::Error => "error",
		}
	}

	/// Whether resolution can produce items for this kind.
	pub fn is_resolvable(self) -> bool {
		!matches!(self, Self::Unknown | Self::Error)
	}
}

impl fmt::Display for ProviderKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The raw source reference supplied by the host.
///
/// The kind is derived by [`classify`], except for [`SourceDescriptor::Function`]
/// which the host declares explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceDescriptor {
	/// No source attribute: the widget's own markup lists the options.
	#[default]
	Inline,
	/// An `options` attribute value to classify.
	Options(String),
	/// An `options-fn` attribute naming a promise-returning host callable.
	Function(String),
}

impl SourceDescriptor {
	/// Build a descriptor from an optional `options` attribute.
	pub fn from_attribute(raw: Option<&str>) -> Self {
		match raw {
			Some(text) if !text.trim().is_empty() => Self::Options(text.to_string()),
			_ => Self::Inline,
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			Self::Inline => "",
			Self::Options(text) | Self::Function(text) => text,
		}
	}
}

impl fmt::Display for SourceDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Inline => f.write_str("<inline markup>"),
			Self::Options(text) => f.write_str(text),
			Self::Function(name) => write!(f, "{name}()"),
		}
	}
}
