use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, ColorChoice, Parser};

use super::options::{OutputFormat, VariantArg};
use super::styles::{cli_styles, long_version};

/// Command-line arguments accepted by the `select-list` binary.
#[derive(Parser, Debug)]
#[command(
	name = "select-list",
	version,
	long_version = long_version(),
	about = "Resolve a select-list options source and print the result",
	color = ColorChoice::Auto,
	styles = cli_styles()
)]
pub(crate) struct CliArgs {
	#[arg(
		short,
		long = "config",
		value_name = "FILE",
		env = "SELECT_LIST_CONFIG",
		action = ArgAction::Append,
		help = "Additional configuration file to merge (default: none)"
	)]
	pub(crate) config: Vec<PathBuf>,
	#[arg(
		short = 'n',
		long = "no-config",
		help = "Skip loading default configuration files (default: disabled)"
	)]
	pub(crate) no_config: bool,
	#[arg(
		long = "variant",
		value_enum,
		help = "Widget flavour to emulate (default: standard, or async with --options-fn)"
	)]
	pub(crate) variant: Option<VariantArg>,
	#[arg(
		long,
		value_name = "DESCRIPTOR",
		conflicts_with = "options_fn",
		help = "Options source: JSON array, URL, global name, or element id (default: inline markup)"
	)]
	pub(crate) options: Option<String>,
	#[arg(
		long = "options-fn",
		value_name = "NAME",
		help = "Name of a global function answering with options (implies the async variant)"
	)]
	pub(crate) options_fn: Option<String>,
	#[arg(
		short = 'm',
		long,
		value_name = "FILE",
		help = "Read inline option markup from a file (default: none)"
	)]
	pub(crate) markup: Option<PathBuf>,
	#[arg(
		short = 'g',
		long,
		value_name = "FILE",
		help = "JSON object whose entries become global objects (default: none)"
	)]
	pub(crate) globals: Option<PathBuf>,
	#[arg(
		short = 'e',
		long,
		value_name = "FILE",
		help = "JSON object mapping element ids to option markup (default: none)"
	)]
	pub(crate) elements: Option<PathBuf>,
	#[arg(
		short = 's',
		long,
		value_name = "TERM",
		help = "Search term applied after the initial load (default: empty)"
	)]
	pub(crate) search: Option<String>,
	#[arg(
		long = "search-param",
		value_name = "NAME",
		help = "Query parameter or argument key carrying the search term (default: none)"
	)]
	pub(crate) search_param: Option<String>,
	#[arg(
		long,
		value_name = "JSON",
		help = "JSON object of HTTP headers sent with remote requests (default: none)"
	)]
	pub(crate) headers: Option<String>,
	#[arg(
		long = "base-url",
		value_name = "URL",
		help = "Base for root-relative URLs (default: http://localhost/)"
	)]
	pub(crate) base_url: Option<String>,
	#[arg(
		long = "timeout-ms",
		value_name = "MILLIS",
		help = "Abandon a resolution after this long; 0 disables (default: 30000)"
	)]
	pub(crate) timeout_ms: Option<u64>,
	#[arg(
		short = 'v',
		long,
		value_name = "CSV",
		help = "Comma-separated values to preselect (default: none)"
	)]
	pub(crate) value: Option<String>,
	#[arg(
		short = 'M',
		long,
		value_parser = BoolishValueParser::new(),
		num_args = 0..=1,
		default_missing_value = "true",
		help = "Allow several selected values (default: disabled)"
	)]
	pub(crate) multiple: Option<bool>,
	#[arg(
		short = 'd',
		long,
		value_parser = BoolishValueParser::new(),
		num_args = 0..=1,
		default_missing_value = "true",
		help = "Report swallowed errors and log at debug level (default: disabled)"
	)]
	pub(crate) debug: Option<bool>,
	#[arg(
		short = 'p',
		long = "print-config",
		help = "Print the resolved configuration before running (default: disabled)"
	)]
	pub(crate) print_config: bool,
	#[arg(
		short = 'o',
		long = "output",
		value_enum,
		default_value_t = OutputFormat::Plain,
		help = "Choose how to print the result"
	)]
	pub(crate) output: OutputFormat,
}
