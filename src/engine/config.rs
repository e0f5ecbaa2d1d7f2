//! Per-instance widget configuration.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Url;
use tracing::warn;

use super::debounce::DEFAULT_SEARCH_DELAY;
use super::http::DEFAULT_REQUEST_TIMEOUT;
use super::source::SourceDescriptor;

pub const DEFAULT_PLACEHOLDER: &str = "Select...";
pub const DEFAULT_BASE_URL: &str = "http://localhost/";

/// The two element flavours sharing the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WidgetVariant {
	/// `select-list`: reads its source from the `options` attribute.
	#[default]
	Standard,
	/// `select-list-async`: reads a function name from `options-fn`.
	Async,
}

impl WidgetVariant {
	pub fn tag_name(self) -> &'static str {
		match self {
			Self::Standard => "select-list",
			Self::Async => "select-list-async",
		}
	}
}

/// Recognized configuration surface of one widget instance.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
	pub variant: WidgetVariant,
	pub source: SourceDescriptor,
	/// Option markup placed inside the widget, used by inline sources.
	pub inner_markup: String,
	pub multiple: bool,
	pub searchable: bool,
	pub disabled: bool,
	pub placeholder: String,
	pub debug: bool,
	pub search_delay: Duration,
	pub search_param: Option<String>,
	/// Raw JSON object of headers sent with remote requests.
	pub http_headers: Option<String>,
	pub loading_class: Option<String>,
	/// Comma-separated values to preselect.
	pub value: Option<String>,
	pub base_url: Url,
	pub resolve_timeout: Option<Duration>,
}

impl Default for WidgetConfig {
	fn default() -> Self {
		Self {
			variant: WidgetVariant::Standard,
			source: SourceDescriptor::Inline,
			inner_markup: String::new(),
			multiple: false,
			searchable: false,
			disabled: false,
			placeholder: DEFAULT_PLACEHOLDER.to_string(),
			debug: false,
			search_delay: DEFAULT_SEARCH_DELAY,
			search_param: None,
			http_headers: None,
			loading_class: None,
			value: None,
			base_url: default_base_url(),
			resolve_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
		}
	}
}

impl WidgetConfig {
	pub fn new(variant: WidgetVariant) -> Self {
		Self {
			variant,
			..Self::default()
		}
	}

	/// Read configuration from element attributes.
	///
	/// Boolean attributes are true when present, whatever their value.
	/// Unparsable numbers fall back to defaults.
	pub fn from_attributes(variant: WidgetVariant, attributes: &HashMap<String, String>) -> Self {
		let get = |name: &str| attributes.get(name).map(String::as_str);
		let get_any = |names: &[&str]| names.iter().find_map(|&name| get(name));
		let non_empty = |value: Option<&str>| -> Option<String> {
			value
				.map(str::trim)
				.filter(|value| !value.is_empty())
				.map(str::to_string)
		};

		let source = match variant {
			WidgetVariant::Standard => SourceDescriptor::from_attribute(get("options")),
			WidgetVariant::Async => match non_empty(get("options-fn")) {
				Some(name) => SourceDescriptor::Function(name),
				None => SourceDescriptor::Inline,
			},
		};

		let mut config = Self {
			variant,
			source,
			multiple: get("multiple").is_some(),
			searchable: get("searchable").is_some(),
			disabled: get("disabled").is_some(),
			debug: get("debug").is_some(),
			placeholder: non_empty(get("placeholder"))
				.unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string()),
			search_delay: parse_delay(get_any(&["search-delay", "search-delay-ms"])),
			search_param: non_empty(get("options-search-param")),
			http_headers: non_empty(get("url-http-headers")),
			loading_class: non_empty(get_any(&["loading-class", "loading-indicator-class"])),
			value: get("value").map(str::to_string),
			..Self::new(variant)
		};

		if let Some(base) = get("base-url") {
			match Url::parse(base) {
				Ok(url) => config.base_url = url,
				Err(err) => warn!(base, %err, "ignoring invalid base-url attribute"),
			}
		}

		config
	}

	pub fn with_source(mut self, source: SourceDescriptor) -> Self {
		self.source = source;
		self
	}

	pub fn with_options(self, options: impl Into<String>) -> Self {
		let options = options.into();
		self.with_source(SourceDescriptor::from_attribute(Some(&options)))
	}

	pub fn with_inner_markup(mut self, markup: impl Into<String>) -> Self {
		self.inner_markup = markup.into();
		self
	}

	pub fn with_multiple(mut self, multiple: bool) -> Self {
		self.multiple = multiple;
		self
	}

	pub fn with_searchable(mut self, searchable: bool) -> Self {
		self.searchable = searchable;
		self
	}

	pub fn with_disabled(mut self, disabled: bool) -> Self {
		self.disabled = disabled;
		self
	}

	pub fn with_debug(mut self, debug: bool) -> Self {
		self.debug = debug;
		self
	}

	pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
		self.placeholder = placeholder.into();
		self
	}

	pub fn with_search_delay(mut self, delay: Duration) -> Self {
		self.search_delay = delay;
		self
	}

	pub fn with_search_param(mut self, param: impl Into<String>) -> Self {
		self.search_param = Some(param.into());
		self
	}

	pub fn with_http_headers(mut self, headers: impl Into<String>) -> Self {
		self.http_headers = Some(headers.into());
		self
	}

	pub fn with_loading_class(mut self, class: impl Into<String>) -> Self {
		self.loading_class = Some(class.into());
		self
	}

	pub fn with_value(mut self, value: impl Into<String>) -> Self {
		self.value = Some(value.into());
		self
	}

	pub fn with_base_url(mut self, base_url: Url) -> Self {
		self.base_url = base_url;
		self
	}

	pub fn with_resolve_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.resolve_timeout = timeout;
		self
	}

	/// Label of the clear control for the current mode.
	pub fn clear_label(&self) -> &'static str {
		if self.multiple { "Clear All" } else { "Clear" }
	}
}

/// Read the leading decimal digits of `raw` as milliseconds, so `"50ms"` is
/// 50 ms. Input without leading digits falls back to the default.
fn parse_delay(raw: Option<&str>) -> Duration {
	raw.and_then(|value| {
		let value = value.trim_start();
		let value = value.strip_prefix('+').unwrap_or(value);
		let end = value
			.find(|ch: char| !ch.is_ascii_digit())
			.unwrap_or(value.len());
		value[..end].parse::<u64>().ok()
	})
	.map(Duration::from_millis)
	.unwrap_or(DEFAULT_SEARCH_DELAY)
}

pub(crate) fn default_base_url() -> Url {
	Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}
