use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use select_list::{
	HostRegistry, Item, LoadState, ProviderKind, SelectList, TracingSink, WidgetConfig, async_fn,
	sync_fn,
};

use crate::settings::ResolvedConfig;

/// What one widget resolution produced.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ResolvedOptions {
	pub kind: ProviderKind,
	pub state: LoadState,
	pub items: Vec<Item>,
	pub selected: Vec<String>,
	pub error: Option<String>,
}

/// Coordinates building a widget and driving it to a settled option list.
pub(crate) struct ResolveWorkflow {
	widget: SelectList,
	search: Option<String>,
}

impl ResolveWorkflow {
	pub(crate) fn from_config(config: ResolvedConfig) -> Result<Self> {
		let ResolvedConfig {
			widget,
			markup,
			globals,
			elements,
			search,
		} = config;

		let widget = WidgetFactory::new(widget)
			.with_markup(markup.as_deref())?
			.with_globals(globals.as_deref())?
			.with_elements(elements.as_deref())?
			.finish()?;

		Ok(Self { widget, search })
	}

	/// Load the options, apply the search term if any, and report the result.
	pub(crate) async fn run(mut self) -> Result<ResolvedOptions> {
		self.widget.connect();
		self.widget.settle().await;

		if let Some(term) = self.search.take() {
			debug!(%term, "applying search term");
			self.widget.open_menu();
			self.widget.input_search(term);
			self.widget.settle().await;
		}

		let widget = &self.widget;
		Ok(ResolvedOptions {
			kind: widget.kind(),
			state: widget.load_state(),
			items: widget.items().to_vec(),
			selected: widget.selected_values(),
			error: widget.last_error().map(ToString::to_string),
		})
	}
}

/// Helper for translating resolved configuration into a configured widget.
struct WidgetFactory {
	config: WidgetConfig,
	host: HostRegistry,
}

impl WidgetFactory {
	fn new(config: WidgetConfig) -> Self {
		Self {
			config,
			host: HostRegistry::new(),
		}
	}

	fn with_markup(mut self, path: Option<&Path>) -> Result<Self> {
		if let Some(path) = path {
			self.config.inner_markup = fs::read_to_string(path)
				.with_context(|| format!("failed to read markup file {}", path.display()))?;
		}
		Ok(self)
	}

	fn with_globals(mut self, path: Option<&Path>) -> Result<Self> {
		if let Some(path) = path {
			self.host = register_globals(self.host, read_json_object(path)?)?;
		}
		Ok(self)
	}

	fn with_elements(self, path: Option<&Path>) -> Result<Self> {
		let Some(path) = path else {
			return Ok(self);
		};
		for (id, markup) in read_json_object(path)? {
			let Value::String(markup) = markup else {
				bail!("element '{id}' must map to a markup string");
			};
			self.host.register_element(id, markup);
		}
		Ok(self)
	}

	fn finish(self) -> Result<SelectList> {
		SelectList::builder(self.config)
			.with_host(self.host)
			.with_diagnostics(Arc::new(TracingSink))
			.build()
			.context("failed to build the widget")
	}
}

fn read_json_object(path: &Path) -> Result<serde_json::Map<String, Value>> {
	let text = fs::read_to_string(path)
		.with_context(|| format!("failed to read {}", path.display()))?;
	let document: Value = serde_json::from_str(&text)
		.with_context(|| format!("{} is not valid JSON", path.display()))?;
	match document {
		Value::Object(entries) => Ok(entries),
		_ => bail!("{} must contain a JSON object", path.display()),
	}
}

/// Register each entry as a global object.
///
/// A key written `name()` registers a function answering with the value
/// directly; `async name()` registers one answering with a future.
fn register_globals(
	host: HostRegistry,
	entries: serde_json::Map<String, Value>,
) -> Result<HostRegistry> {
	for (key, value) in entries {
		let Some(signature) = key.strip_suffix("()") else {
			host.register_object(key, value);
			continue;
		};
		match signature.strip_prefix("async ") {
			Some(name) => {
				let name = name.trim();
				if name.is_empty() {
					bail!("global function '{key}' has no name");
				}
				host.register_function(
					name,
					async_fn(move |_| std::future::ready(Ok(value.clone()))),
				);
			}
			None => {
				let name = signature.trim();
				if name.is_empty() {
					bail!("global function '{key}' has no name");
				}
				host.register_function(name, sync_fn(move |_| Ok(value.clone())));
			}
		}
	}
	Ok(host)
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use tempfile::tempdir;

	use select_list::engine::HostValue;
	use select_list::{SourceDescriptor, WidgetVariant};

	use super::*;

	fn resolved(widget: WidgetConfig) -> ResolvedConfig {
		ResolvedConfig {
			widget,
			markup: None,
			globals: None,
			elements: None,
			search: None,
		}
	}

	fn entries(value: Value) -> serde_json::Map<String, Value> {
		match value {
			Value::Object(entries) => entries,
			_ => unreachable!(),
		}
	}

	#[test]
	fn globals_register_objects_and_functions() {
		let host = register_globals(
			HostRegistry::new(),
			entries(json!({
				"colors": ["red"],
				"load()": ["a"],
				"async fetch()": ["b"],
			})),
		)
		.unwrap();

		assert!(matches!(host.global("colors"), Some(HostValue::Object(_))));
		assert!(matches!(host.global("load"), Some(HostValue::Function(_))));
		assert!(matches!(host.global("fetch"), Some(HostValue::Function(_))));
		assert!(register_globals(HostRegistry::new(), entries(json!({ "()": [] }))).is_err());
	}

	#[tokio::test]
	async fn searches_json_literal() {
		let mut config = resolved(
			WidgetConfig::default()
				.with_options(r#"[{"value":"1","label":"Option 1"},{"value":"2","label":"Option 2"}]"#)
				.with_searchable(true)
				.with_value("1"),
		);
		config.search = Some("2".into());

		let outcome = ResolveWorkflow::from_config(config).unwrap().run().await.unwrap();
		assert_eq!(outcome.kind, ProviderKind::JsonLiteral);
		assert_eq!(outcome.state, LoadState::Loaded);
		assert_eq!(outcome.items, vec![Item::new("2", "Option 2")]);
		assert_eq!(outcome.selected, vec!["1"]);
		assert!(outcome.error.is_none());
	}

	#[tokio::test]
	async fn resolves_async_function_from_globals_file() {
		let dir = tempdir().unwrap();
		let globals = dir.path().join("globals.json");
		fs::write(&globals, r#"{"async fetchOptions()": [{"value": "x", "label": "Ex"}]}"#).unwrap();

		let mut config = resolved(
			WidgetConfig::new(WidgetVariant::Async)
				.with_source(SourceDescriptor::Function("fetchOptions".into())),
		);
		config.globals = Some(globals);

		let outcome = ResolveWorkflow::from_config(config).unwrap().run().await.unwrap();
		assert_eq!(outcome.kind, ProviderKind::PromiseFn);
		assert_eq!(outcome.items, vec![Item::new("x", "Ex")]);
	}

	#[tokio::test]
	async fn resolves_element_and_inline_markup() {
		let dir = tempdir().unwrap();
		let elements = dir.path().join("elements.json");
		fs::write(&elements, r#"{"fruit": "<option value=\"a\">Apple</option>"}"#).unwrap();
		let markup = dir.path().join("markup.html");
		fs::write(&markup, "<option>Inline</option>").unwrap();

		let mut config = resolved(WidgetConfig::default().with_options("fruit"));
		config.elements = Some(elements);
		let outcome = ResolveWorkflow::from_config(config).unwrap().run().await.unwrap();
		assert_eq!(outcome.kind, ProviderKind::ElementRef);
		assert_eq!(outcome.items, vec![Item::new("a", "Apple")]);

		let mut config = resolved(WidgetConfig::default());
		config.markup = Some(markup);
		let outcome = ResolveWorkflow::from_config(config).unwrap().run().await.unwrap();
		assert_eq!(outcome.kind, ProviderKind::InlineMarkup);
		assert_eq!(outcome.items, vec![Item::literal("Inline")]);
	}

	#[tokio::test]
	async fn unknown_source_reports_error() {
		let config = resolved(WidgetConfig::default().with_options("missingGlobal"));
		let outcome = ResolveWorkflow::from_config(config).unwrap().run().await.unwrap();
		assert_eq!(outcome.kind, ProviderKind::Unknown);
		assert_eq!(outcome.state, LoadState::Error);
		assert!(outcome.error.is_some());
	}

	#[test]
	fn rejects_non_object_files() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("globals.json");
		fs::write(&path, "[1, 2]").unwrap();
		assert!(read_json_object(&path).is_err());
	}
}
