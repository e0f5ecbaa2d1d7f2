//! Tracing subscriber setup for the `select-list` binary.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVE: &str = "warn";

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug` for this
/// crate and `warn` for everything else. Calling this twice is harmless.
pub fn initialize(verbose: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new(format!("{DEFAULT_DIRECTIVE},select_list=debug"))
		} else {
			EnvFilter::new(DEFAULT_DIRECTIVE)
		}
	});

	let _ = fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.try_init();
}
