use clap::ValueEnum;

/// Widget flavours selectable from the CLI.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum VariantArg {
	Standard,
	Async,
}

impl VariantArg {
	/// Return the identifier consumed by configuration loading.
	pub(crate) fn as_str(self) -> &'static str {
		match self {
			VariantArg::Standard => "standard",
			VariantArg::Async => "async",
		}
	}
}

/// Output formats supported by the CLI utility.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
	Plain,
	Json,
}
