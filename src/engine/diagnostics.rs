use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::error;

/// Receives errors the widget swallows. Only consulted in debug mode.
pub trait DiagnosticSink: Send + Sync {
	fn report(&self, message: &str, error: &dyn Error);
}

/// Forwards diagnostics to `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
	fn report(&self, message: &str, err: &dyn Error) {
		error!(error = %err, "{message}");
	}
}

/// Keeps diagnostics in memory for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
	entries: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn entries(&self) -> Vec<String> {
		self.entries
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}
}

impl DiagnosticSink for RecordingSink {
	fn report(&self, message: &str, error: &dyn Error) {
		self.entries
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(format!("{message}: {error}"));
	}
}
