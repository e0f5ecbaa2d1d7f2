use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use config::{Config, ConfigError, File};
use reqwest::Url;
use serde::Deserialize;

use select_list::app_dirs;
use select_list::engine::config::DEFAULT_BASE_URL;
use select_list::{SourceDescriptor, WidgetConfig, WidgetVariant};

use crate::cli::CliArgs;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
	source: SourceSection,
	widget: WidgetSection,
	search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SourceSection {
	variant: Option<String>,
	options: Option<String>,
	options_fn: Option<String>,
	markup: Option<PathBuf>,
	globals: Option<PathBuf>,
	elements: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct WidgetSection {
	multiple: Option<bool>,
	searchable: Option<bool>,
	debug: Option<bool>,
	placeholder: Option<String>,
	search_delay_ms: Option<u64>,
	search_param: Option<String>,
	http_headers: Option<String>,
	loading_class: Option<String>,
	value: Option<String>,
	base_url: Option<String>,
	timeout_ms: Option<u64>,
}

/// Everything the workflow needs, with defaults applied.
pub struct ResolvedConfig {
	pub widget: WidgetConfig,
	pub markup: Option<PathBuf>,
	pub globals: Option<PathBuf>,
	pub elements: Option<PathBuf>,
	pub search: Option<String>,
}

impl ResolvedConfig {
	pub fn print_summary(&self) {
		let widget = &self.widget;
		println!("Effective configuration:");
		println!("  Variant: {}", widget.variant.tag_name());
		println!("  Source: {}", widget.source);
		if let Some(path) = &self.markup {
			println!("  Markup file: {}", path.display());
		}
		if let Some(path) = &self.globals {
			println!("  Globals file: {}", path.display());
		}
		if let Some(path) = &self.elements {
			println!("  Elements file: {}", path.display());
		}
		println!("  Multiple: {}", bool_to_word(widget.multiple));
		println!("  Debug: {}", bool_to_word(widget.debug));
		println!("  Placeholder: {}", widget.placeholder);
		println!("  Search delay: {} ms", widget.search_delay.as_millis());
		println!(
			"  Search param: {}",
			widget.search_param.as_deref().unwrap_or("(none)")
		);
		if let Some(headers) = &widget.http_headers {
			println!("  HTTP headers: {headers}");
		}
		println!("  Base URL: {}", widget.base_url);
		match widget.resolve_timeout {
			Some(timeout) => println!("  Timeout: {} ms", timeout.as_millis()),
			None => println!("  Timeout: none"),
		}
		if let Some(value) = &widget.value {
			println!("  Value: {value}");
		}
		if let Some(search) = &self.search {
			println!("  Search: {search}");
		}
	}
}

pub fn load(cli: &CliArgs) -> Result<ResolvedConfig> {
	let builder = build_config(cli)?;
	let mut raw: RawConfig = builder
		.try_deserialize()
		.map_err(|err| anyhow!("failed to deserialize configuration: {err}"))?;
	raw.apply_cli_overrides(cli);
	raw.resolve()
}

fn build_config(cli: &CliArgs) -> Result<Config> {
	let mut builder = Config::builder();

	if !cli.no_config {
		for path in default_config_files() {
			builder = builder.add_source(File::from(path).required(false));
		}
	}

	for path in &cli.config {
		builder = builder.add_source(File::from(path.clone()).required(true));
	}

	builder = builder.add_source(
		config::Environment::with_prefix("select_list")
			.separator("__")
			.try_parsing(true),
	);

	builder.build().map_err(|err| match err {
		ConfigError::Frozen => anyhow!("configuration builder is frozen"),
		other => other.into(),
	})
}

fn default_config_files() -> Vec<PathBuf> {
	let mut files = Vec::new();

	if let Ok(dir) = app_dirs::get_config_dir() {
		files.push(dir.join("config.toml"));
	}

	if let Ok(current_dir) = env::current_dir() {
		files.push(current_dir.join(".select-list.toml"));
		files.push(current_dir.join("select-list.toml"));
	}

	files
}

impl RawConfig {
	fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		if let Some(variant) = cli.variant {
			self.source.variant = Some(variant.as_str().to_string());
		}
		// A source given on the command line replaces whichever one the files chose.
		if let Some(options) = cli.options.clone() {
			self.source.options = Some(options);
			self.source.options_fn = None;
		}
		if let Some(name) = cli.options_fn.clone() {
			self.source.options_fn = Some(name);
			self.source.options = None;
		}
		if let Some(path) = cli.markup.clone() {
			self.source.markup = Some(path);
		}
		if let Some(path) = cli.globals.clone() {
			self.source.globals = Some(path);
		}
		if let Some(path) = cli.elements.clone() {
			self.source.elements = Some(path);
		}

		if let Some(search) = cli.search.clone() {
			self.search = Some(search);
		}
		if let Some(param) = cli.search_param.clone() {
			self.widget.search_param = Some(param);
		}
		if let Some(headers) = cli.headers.clone() {
			self.widget.http_headers = Some(headers);
		}
		if let Some(base) = cli.base_url.clone() {
			self.widget.base_url = Some(base);
		}
		if let Some(value) = cli.timeout_ms {
			self.widget.timeout_ms = Some(value);
		}
		if let Some(value) = cli.value.clone() {
			self.widget.value = Some(value);
		}
		if let Some(value) = cli.multiple {
			self.widget.multiple = Some(value);
		}
		if let Some(value) = cli.debug {
			self.widget.debug = Some(value);
		}
	}

	fn resolve(self) -> Result<ResolvedConfig> {
		let RawConfig {
			source,
			widget,
			search,
		} = self;

		let variant = match source.variant.as_deref() {
			Some(raw) => parse_variant(raw)?,
			None if source.options_fn.is_some() => WidgetVariant::Async,
			None => WidgetVariant::Standard,
		};

		let descriptor = match variant {
			WidgetVariant::Standard => {
				if source.options_fn.is_some() {
					bail!("options_fn requires the async variant");
				}
				SourceDescriptor::from_attribute(source.options.as_deref())
			}
			WidgetVariant::Async => {
				if source.options.is_some() {
					bail!("the async variant reads options_fn, not options");
				}
				match non_empty(source.options_fn) {
					Some(name) => SourceDescriptor::Function(name),
					None => SourceDescriptor::Inline,
				}
			}
		};

		let base_url = match widget.base_url.as_deref() {
			Some(raw) => {
				Url::parse(raw).with_context(|| format!("invalid base URL '{raw}'"))?
			}
			None => Url::parse(DEFAULT_BASE_URL).context("invalid default base URL")?,
		};

		let mut config = WidgetConfig::new(variant)
			.with_source(descriptor)
			.with_multiple(widget.multiple.unwrap_or(false))
			.with_searchable(widget.searchable.unwrap_or(true))
			.with_debug(widget.debug.unwrap_or(false))
			.with_base_url(base_url);
		if let Some(placeholder) = non_empty(widget.placeholder) {
			config = config.with_placeholder(placeholder);
		}
		if let Some(delay) = widget.search_delay_ms {
			config = config.with_search_delay(Duration::from_millis(delay));
		}
		if let Some(param) = non_empty(widget.search_param) {
			config = config.with_search_param(param);
		}
		if let Some(headers) = non_empty(widget.http_headers) {
			config = config.with_http_headers(headers);
		}
		if let Some(class) = non_empty(widget.loading_class) {
			config = config.with_loading_class(class);
		}
		if let Some(value) = widget.value {
			config = config.with_value(value);
		}
		if let Some(timeout) = widget.timeout_ms {
			config = config.with_resolve_timeout(
				(timeout > 0).then(|| Duration::from_millis(timeout)),
			);
		}

		Ok(ResolvedConfig {
			widget: config,
			markup: source.markup,
			globals: source.globals,
			elements: source.elements,
			search: non_empty(search),
		})
	}
}

fn parse_variant(value: &str) -> Result<WidgetVariant> {
	match value.trim().to_ascii_lowercase().as_str() {
		"standard" | "select-list" => Ok(WidgetVariant::Standard),
		"async" | "select-list-async" => Ok(WidgetVariant::Async),
		other => bail!("unknown widget variant '{other}'"),
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|value| !value.trim().is_empty())
}

fn bool_to_word(value: bool) -> &'static str {
	if value { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
	use std::fs;

	use clap::Parser;
	use tempfile::tempdir;

	use super::*;

	fn cli(args: &[&str]) -> CliArgs {
		let mut argv = vec!["select-list", "--no-config"];
		argv.extend_from_slice(args);
		CliArgs::try_parse_from(argv).expect("parses")
	}

	#[test]
	fn defaults_without_files_or_flags() {
		let resolved = load(&cli(&[])).expect("loads");
		let widget = resolved.widget;
		assert_eq!(widget.variant, WidgetVariant::Standard);
		assert_eq!(widget.source, SourceDescriptor::Inline);
		assert_eq!(widget.base_url.as_str(), DEFAULT_BASE_URL);
		assert!(!widget.multiple);
		assert!(resolved.search.is_none());
	}

	#[test]
	fn file_values_are_overridden_by_flags() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("select-list.toml");
		fs::write(
			&path,
			r#"
search = "from-file"

[source]
options = "/api/options"

[widget]
multiple = true
search_param = "search"
search_delay_ms = 50
timeout_ms = 0
"#,
		)
		.unwrap();

		let resolved = load(&cli(&[
			"--config",
			path.to_str().unwrap(),
			"--search",
			"opt",
			"--multiple",
			"false",
		]))
		.expect("loads");

		let widget = resolved.widget;
		assert_eq!(widget.source, SourceDescriptor::Options("/api/options".into()));
		assert_eq!(widget.search_param.as_deref(), Some("search"));
		assert_eq!(widget.search_delay, Duration::from_millis(50));
		assert_eq!(widget.resolve_timeout, None);
		assert!(!widget.multiple);
		assert_eq!(resolved.search.as_deref(), Some("opt"));
	}

	#[test]
	fn options_fn_selects_async_variant() {
		let resolved = load(&cli(&["--options-fn", "fetchOptions"])).expect("loads");
		assert_eq!(resolved.widget.variant, WidgetVariant::Async);
		assert_eq!(
			resolved.widget.source,
			SourceDescriptor::Function("fetchOptions".into())
		);
	}

	#[test]
	fn flag_source_replaces_file_source() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("config.toml");
		fs::write(&path, "[source]\noptions_fn = \"fromFile\"\n").unwrap();

		let resolved = load(&cli(&["-c", path.to_str().unwrap(), "--options", "[1,2]"]))
			.expect("loads");
		assert_eq!(resolved.widget.variant, WidgetVariant::Standard);
		assert_eq!(resolved.widget.source, SourceDescriptor::Options("[1,2]".into()));
	}

	#[test]
	fn rejects_invalid_values() {
		assert!(load(&cli(&["--base-url", "not a url"])).is_err());
		assert!(load(&cli(&["--variant", "async", "--options", "[]"])).is_err());
	}

	#[test]
	fn missing_explicit_config_file_is_an_error() {
		let dir = tempdir().unwrap();
		let missing = dir.path().join("absent.toml");
		assert!(load(&cli(&["--config", missing.to_str().unwrap()])).is_err());
	}
}
