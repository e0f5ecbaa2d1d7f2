use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::Url;
use serde_json::{Map, Value};
use tracing::debug;

use super::{Classification, ProviderKind, SourceDescriptor};
use crate::engine::error::{HostError, ResolveError};
use crate::engine::filter::filter_items;
use crate::engine::host::{CallOutput, HostFunction, HostRegistry, HostValue};
use crate::engine::http::{HttpClient, parse_header_map, request_url};
use crate::engine::item::{Item, items_from_json, items_from_json_str};
use crate::engine::markup::MarkupParser;

/// Host collaborators shared by every resolution of a widget.
#[derive(Clone)]
pub struct Collaborators {
	pub host: HostRegistry,
	pub markup: Arc<dyn MarkupParser>,
	pub http: Arc<dyn HttpClient>,
	/// Base against which root-relative URLs are resolved.
	pub base_url: Url,
}

impl fmt::Debug for Collaborators {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Collaborators")
			.field("host", &self.host)
			.field("base_url", &self.base_url.as_str())
			.finish_non_exhaustive()
	}
}

/// Per-widget settings that shape how a provider resolves.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProviderSettings {
	pub inline_markup: String,
	pub search_param: Option<String>,
	pub http_headers: Option<String>,
}

/// A classified options source, ready to resolve.
///
/// One variant per resolvable [`ProviderKind`], each carrying what it needs.
pub enum OptionsProvider {
	InlineMarkup {
		markup: String,
	},
	JsonLiteral {
		source: String,
	},
	RemoteUrl {
		location: String,
		headers: Option<String>,
		search_param: Option<String>,
	},
	Callable {
		kind: ProviderKind,
		name: String,
		function: Arc<dyn HostFunction>,
		search_param: Option<String>,
		probe: Mutex<Option<CallOutput>>,
	},
	GlobalRef {
		name: String,
	},
	ElementRef {
		id: String,
	},
	Unsupported {
		kind: ProviderKind,
	},
}

impl OptionsProvider {
	pub(crate) fn build(
		descriptor: &SourceDescriptor,
		classification: Classification,
		settings: &ProviderSettings,
	) -> Self {
		let text = descriptor.as_str().to_string();
		match classification.kind {
			ProviderKind::InlineMarkup => Self::InlineMarkup {
				markup: settings.inline_markup.clone(),
			},
			ProviderKind::JsonLiteral => Self::JsonLiteral { source: text },
			ProviderKind::RemoteUrl => Self::RemoteUrl {
				location: text,
				headers: settings.http_headers.clone(),
				search_param: settings.search_param.clone(),
			},
			kind @ (ProviderKind::PromiseFn | ProviderKind::SyncFn) => {
				match classification.function {
					Some(function) => Self::Callable {
						kind,
						name: text,
						function,
						search_param: settings.search_param.clone(),
						probe: Mutex::new(classification.probe),
					},
					None => Self::Unsupported {
						kind: ProviderKind::Error,
					},
				}
			}
			ProviderKind::GlobalRef => Self::GlobalRef { name: text },
			ProviderKind::ElementRef => Self::ElementRef { id: text },
			kind @ (ProviderKind::Unknown | ProviderKind::Error) => Self::Unsupported { kind },
		}
	}

	pub fn kind(&self) -> ProviderKind {
		match self {
			Self::InlineMarkup { .. } => ProviderKind::InlineMarkup,
			Self::JsonLiteral { .. } => ProviderKind::JsonLiteral,
			Self::RemoteUrl { .. } => ProviderKind::RemoteUrl,
			Self::Callable { kind, .. } | Self::Unsupported { kind } => *kind,
			Self::GlobalRef { .. } => ProviderKind::GlobalRef,
			Self::ElementRef { .. } => ProviderKind::ElementRef,
		}
	}

	/// Resolve the source into items matching `term`.
	pub async fn resolve(
		&self,
		term: &str,
		collaborators: &Collaborators,
	) -> Result<Vec<Item>, ResolveError> {
		match self {
			Self::InlineMarkup { markup } => {
				let items = collaborators.markup.parse_options(markup)?;
				Ok(filter_items(items, term))
			}
			Self::JsonLiteral { source } => Ok(filter_items(items_from_json_str(source)?, term)),
			Self::RemoteUrl {
				location,
				headers,
				search_param,
			} => {
				let headers = match headers {
					Some(raw) => parse_header_map(raw)?,
					None => Vec::new(),
				};
				let url = request_url(
					&collaborators.base_url,
					location,
					search_param.as_deref(),
					term,
				)?;
				let items = items_from_json(collaborators.http.get_json(&url, &headers).await?)?;
				if server_side_search(search_param.as_deref(), term) {
					Ok(items)
				} else {
					Ok(filter_items(items, term))
				}
			}
			Self::Callable {
				name,
				function,
				search_param,
				..
			} => {
				let args = call_arguments(search_param.as_deref(), term);
				// The probe only ever stands in for the first resolution.
				let output = match (args, self.take_probe()) {
					(None, Some(probe)) => {
						debug!(%name, "reusing classification probe result");
						probe
					}
					(args, _) => function
						.call(args)
						.map_err(|err| ResolveError::invocation(name, &err))?,
				};
				let value = output
					.settle()
					.await
					.map_err(|err| ResolveError::invocation(name, &err))?;
				Ok(filter_items(items_from_json(value)?, term))
			}
			Self::GlobalRef { name } => match collaborators.host.global(name) {
				Some(HostValue::Object(value)) => Ok(filter_items(items_from_json(value)?, term)),
				Some(HostValue::Function(_)) => Err(ResolveError::invocation(
					name,
					&HostError::new("global is now a function"),
				)),
				None => Err(ResolveError::invocation(
					name,
					&HostError::new("global is no longer defined"),
				)),
			},
			Self::ElementRef { id } => match collaborators.host.element(id) {
				Some(markup) => {
					let items = collaborators.markup.parse_options(&markup)?;
					Ok(filter_items(items, term))
				}
				None => Err(ResolveError::invocation(
					id,
					&HostError::new("element no longer exists"),
				)),
			},
			Self::Unsupported { kind } => Err(ResolveError::UnsupportedKind { kind: *kind }),
		}
	}

	fn take_probe(&self) -> Option<CallOutput> {
		match self {
			Self::Callable { probe, .. } => probe
				.lock()
				.unwrap_or_else(PoisonError::into_inner)
				.take(),
			_ => None,
		}
	}
}

impl fmt::Debug for OptionsProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OptionsProvider")
			.field("kind", &self.kind())
			.finish_non_exhaustive()
	}
}

fn server_side_search(search_param: Option<&str>, term: &str) -> bool {
	search_param.is_some_and(|param| !param.is_empty()) && !term.is_empty()
}

fn call_arguments(search_param: Option<&str>, term: &str) -> Option<Value> {
	let param = search_param.filter(|_| server_side_search(search_param, term))?;
	let mut args = Map::new();
	args.insert(param.to_string(), Value::String(term.to_string()));
	Some(Value::Object(args))
}

#[cfg(test)]
mod tests;
