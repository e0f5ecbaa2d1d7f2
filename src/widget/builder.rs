use std::sync::Arc;

use crate::engine::{
	DiagnosticSink, HostRegistry, HttpClient, MarkupParser, OptionTagParser, ReqwestClient,
	ResolveError, TracingSink, WidgetConfig,
};

use super::SelectList;
use super::observer::{NullObserver, WidgetObserver};

/// Configures the collaborators of a [`SelectList`] before it is created.
///
/// Anything left unset falls back to the stock implementation: the regex
/// option-tag parser, a reqwest client, tracing diagnostics, and an observer
/// that ignores notifications.
pub struct SelectListBuilder {
	config: WidgetConfig,
	host: HostRegistry,
	markup: Option<Arc<dyn MarkupParser>>,
	http: Option<Arc<dyn HttpClient>>,
	observer: Option<Box<dyn WidgetObserver>>,
	diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl SelectListBuilder {
	pub fn new(config: WidgetConfig) -> Self {
		Self {
			config,
			host: HostRegistry::default(),
			markup: None,
			http: None,
			observer: None,
			diagnostics: None,
		}
	}

	pub fn with_host(mut self, host: HostRegistry) -> Self {
		self.host = host;
		self
	}

	pub fn with_markup_parser(mut self, markup: Arc<dyn MarkupParser>) -> Self {
		self.markup = Some(markup);
		self
	}

	pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
		self.http = Some(http);
		self
	}

	pub fn with_observer(mut self, observer: impl WidgetObserver + 'static) -> Self {
		self.observer = Some(Box::new(observer));
		self
	}

	pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
		self.diagnostics = Some(diagnostics);
		self
	}

	/// Classify the configured source and assemble the widget.
	///
	/// Nothing is resolved yet; call [`SelectList::connect`] from inside a
	/// tokio runtime to load the initial options.
	pub fn build(self) -> Result<SelectList, ResolveError> {
		let http = match self.http {
			Some(http) => http,
			None => Arc::new(ReqwestClient::new(self.config.resolve_timeout)?),
		};
		let markup = self
			.markup
			.unwrap_or_else(|| Arc::new(OptionTagParser::default()));
		let observer = self.observer.unwrap_or_else(|| Box::new(NullObserver));
		let diagnostics = self.diagnostics.unwrap_or_else(|| Arc::new(TracingSink));

		Ok(SelectList::assemble(
			self.config,
			self.host,
			markup,
			http,
			observer,
			diagnostics,
		))
	}
}
