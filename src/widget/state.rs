use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::engine::source::ProviderSettings;
use crate::engine::{
	Applied, Collaborators, DiagnosticSink, HighlightNavigator, HostRegistry, HttpClient, Item,
	LoadState, MarkupParser, OptionsProvider, ProviderKind, ResolutionCoordinator, ResolveError,
	SearchDebouncer, SelectionChange, SelectionMode, SelectionStore, SourceDescriptor,
	WidgetConfig, classify,
};

use super::MenuState;
use super::builder::SelectListBuilder;
use super::observer::{OptionsView, WidgetObserver};

/// One select-list widget instance.
///
/// Owns every piece of per-instance state. Selection and highlight changes
/// apply synchronously; option loading happens on background tasks whose
/// results are folded in by [`Self::poll`], [`Self::tick`], or
/// [`Self::settle`].
pub struct SelectList {
	config: WidgetConfig,
	provider: Arc<OptionsProvider>,
	collaborators: Arc<Collaborators>,
	coordinator: ResolutionCoordinator,
	selection: SelectionStore,
	highlight: HighlightNavigator,
	debouncer: SearchDebouncer,
	menu: MenuState,
	search_term: String,
	/// Term of the most recent dispatch.
	requested_term: Option<String>,
	/// Values waiting for the first successful load.
	pending_values: Option<String>,
	observer: Box<dyn WidgetObserver>,
	diagnostics: Arc<dyn DiagnosticSink>,
}

impl SelectList {
	pub fn builder(config: WidgetConfig) -> SelectListBuilder {
		SelectListBuilder::new(config)
	}

	pub(super) fn assemble(
		config: WidgetConfig,
		host: HostRegistry,
		markup: Arc<dyn MarkupParser>,
		http: Arc<dyn HttpClient>,
		observer: Box<dyn WidgetObserver>,
		diagnostics: Arc<dyn DiagnosticSink>,
	) -> Self {
		let collaborators = Arc::new(Collaborators {
			host,
			markup,
			http,
			base_url: config.base_url.clone(),
		});
		let pending_values = config
			.value
			.clone()
			.filter(|value| !value.trim().is_empty());

		let mut widget = Self {
			provider: Arc::new(OptionsProvider::Unsupported {
				kind: ProviderKind::Unknown,
			}),
			coordinator: ResolutionCoordinator::new(config.resolve_timeout),
			selection: SelectionStore::new(SelectionMode::from_multiple(config.multiple)),
			highlight: HighlightNavigator::default(),
			debouncer: SearchDebouncer::new(config.search_delay),
			menu: MenuState::Closed,
			search_term: String::new(),
			requested_term: None,
			pending_values,
			observer,
			diagnostics,
			collaborators,
			config,
		};
		widget.provider = Arc::new(widget.classify_source());
		widget
	}

	pub fn config(&self) -> &WidgetConfig {
		&self.config
	}

	pub fn kind(&self) -> ProviderKind {
		self.provider.kind()
	}

	pub fn load_state(&self) -> LoadState {
		self.coordinator.state()
	}

	pub fn last_error(&self) -> Option<&ResolveError> {
		self.coordinator.last_error()
	}

	/// Currently displayed items, already filtered by the last resolved term.
	pub fn items(&self) -> &[Item] {
		self.coordinator.items()
	}

	pub fn options_view(&self) -> OptionsView<'_> {
		OptionsView {
			items: self.coordinator.items(),
			highlighted: self.highlight.current(),
			selection: &self.selection,
			state: self.coordinator.state(),
		}
	}

	pub fn selection(&self) -> &SelectionStore {
		&self.selection
	}

	pub fn selected_values(&self) -> Vec<String> {
		self.selection.values()
	}

	pub fn highlighted(&self) -> Option<usize> {
		self.highlight.current()
	}

	pub fn highlighted_item(&self) -> Option<&Item> {
		self.highlight
			.current()
			.and_then(|index| self.coordinator.items().get(index))
	}

	pub fn menu(&self) -> MenuState {
		self.menu
	}

	pub fn is_open(&self) -> bool {
		self.menu.is_open()
	}

	pub fn search_term(&self) -> &str {
		&self.search_term
	}

	pub fn placeholder(&self) -> &str {
		&self.config.placeholder
	}

	pub fn clear_label(&self) -> &'static str {
		self.config.clear_label()
	}

	/// The configured loading class, only while a resolution is in flight.
	pub fn loading_class(&self) -> Option<&str> {
		if self.coordinator.is_loading() {
			self.config.loading_class.as_deref()
		} else {
			None
		}
	}

	// Resolution

	/// Load the initial option list with an empty search term.
	pub fn connect(&mut self) {
		self.debouncer.cancel();
		self.resolve(String::new());
	}

	/// Reclassify the source and reload, keeping the current search term.
	///
	/// Call after changing symbols in the host registry.
	pub fn refresh(&mut self) {
		self.debouncer.cancel();
		self.provider = Arc::new(self.classify_source());
		let term = self.search_term.clone();
		self.resolve(term);
	}

	pub fn set_source(&mut self, source: SourceDescriptor) {
		if source == self.config.source {
			return;
		}
		self.config.source = source;
		self.refresh();
	}

	pub fn set_inner_markup(&mut self, markup: impl Into<String>) {
		self.config.inner_markup = markup.into();
		if self.kind() == ProviderKind::InlineMarkup {
			self.refresh();
		}
	}

	pub fn set_search_param(&mut self, param: Option<String>) {
		if param == self.config.search_param {
			return;
		}
		self.config.search_param = param;
		self.refresh();
	}

	pub fn set_http_headers(&mut self, headers: Option<String>) {
		if headers == self.config.http_headers {
			return;
		}
		self.config.http_headers = headers;
		self.refresh();
	}

	/// Record a keystroke in the search input.
	///
	/// Ignored unless the widget is searchable and enabled. Resolution waits
	/// for the configured quiet period.
	pub fn input_search(&mut self, term: impl Into<String>) {
		if !self.config.searchable || self.config.disabled {
			return;
		}
		let term = term.into();
		self.search_term.clone_from(&term);
		if let Some(term) = self.debouncer.on_term_changed(term, Instant::now()) {
			self.resolve(term);
		}
	}

	/// Fire a due search and apply finished resolutions without waiting.
	///
	/// Returns whether anything observable changed.
	pub fn poll(&mut self) -> bool {
		let mut changed = false;
		if let Some(term) = self.debouncer.poll(Instant::now()) {
			self.resolve(term);
			changed = true;
		}
		for applied in self.coordinator.pump() {
			changed |= self.after_applied(applied);
		}
		changed
	}

	/// Wait for the next debounce deadline or resolution result.
	///
	/// Returns `false` without waiting when nothing is pending.
	pub async fn tick(&mut self) -> bool {
		let searching = self.debouncer.is_pending();
		let loading = self.coordinator.is_loading();
		if !searching && !loading {
			return false;
		}

		tokio::select! {
			term = self.debouncer.settled(), if searching => {
				if let Some(term) = term {
					self.resolve(term);
				}
			}
			applied = self.coordinator.next_applied(), if loading => {
				if let Some(applied) = applied {
					self.after_applied(applied);
				}
			}
		}
		true
	}

	/// Run until no search is pending and nothing is loading.
	pub async fn settle(&mut self) {
		while self.tick().await {}
	}

	// Menu

	/// Show the options. Loads the list first if nothing is cached.
	pub fn open_menu(&mut self) -> bool {
		if self.config.disabled || self.menu.is_open() {
			return false;
		}
		self.menu = MenuState::Open;
		self.highlight.reset();
		if self.coordinator.items().is_empty() && !self.coordinator.is_loading() {
			self.resolve(String::new());
		}
		self.observer.menu_changed(self.menu);
		if self.config.searchable {
			self.observer.focus_search();
		}
		self.notify_options();
		true
	}

	/// Hide the options and drop the search term.
	///
	/// The list is reloaded unfiltered unless it already is.
	pub fn close_menu(&mut self) -> bool {
		if !self.menu.is_open() {
			return false;
		}
		self.menu = MenuState::Closed;
		let filtered = self.debouncer.is_pending()
			|| self
				.requested_term
				.as_deref()
				.is_some_and(|term| !term.is_empty());
		self.debouncer.cancel();
		self.search_term.clear();
		if filtered {
			self.resolve(String::new());
		}
		self.observer.menu_changed(self.menu);
		true
	}

	pub fn toggle_menu(&mut self) -> bool {
		if self.menu.is_open() {
			self.close_menu()
		} else {
			self.open_menu()
		}
	}

	// Selection

	pub fn select(&mut self, item: Item) {
		if self.config.disabled {
			return;
		}
		let change = self.selection.select(item);
		self.emit(change);
	}

	pub fn deselect(&mut self, item: &Item) {
		if self.config.disabled {
			return;
		}
		let change = self.selection.deselect(item);
		self.emit(change);
	}

	pub fn toggle(&mut self, item: Item) {
		if self.config.disabled {
			return;
		}
		let change = self.selection.toggle(item);
		self.emit(change);
	}

	/// Select the displayed item with `value`. Returns `false` if none matches.
	pub fn select_value(&mut self, value: &str) -> bool {
		match self.find_item(value) {
			Some(item) => {
				self.select(item);
				true
			}
			None => false,
		}
	}

	/// Remove `value` from the selection, whether or not it is displayed.
	pub fn deselect_value(&mut self, value: &str) -> bool {
		let Some(item) = self
			.selection
			.items()
			.iter()
			.find(|item| item.value == value)
			.cloned()
		else {
			return false;
		};
		self.deselect(&item);
		true
	}

	/// Choose an option the way a click does: multiple mode toggles it,
	/// single mode selects it and closes the menu.
	pub fn activate(&mut self, item: Item) {
		if self.config.disabled {
			return;
		}
		match self.selection.mode() {
			SelectionMode::Multiple => self.toggle(item),
			SelectionMode::Single => {
				self.select(item);
				self.close_menu();
			}
		}
	}

	pub fn clear(&mut self) {
		let change = self.selection.clear();
		if self.menu.is_open() {
			self.highlight.reset();
		}
		self.emit(change);
	}

	/// Replace the selection with the comma-separated `raw` values.
	///
	/// An empty string clears. Before the first load the values are kept and
	/// applied once options arrive.
	pub fn set_value(&mut self, raw: &str) {
		self.config.value = Some(raw.to_string());
		if raw.trim().is_empty() {
			self.pending_values = None;
			self.clear();
			return;
		}
		if self.coordinator.resolved_term().is_none() {
			debug!(values = raw, "deferring values until options load");
			self.pending_values = Some(raw.to_string());
			return;
		}
		self.apply_values(raw);
	}

	pub fn set_multiple(&mut self, multiple: bool) {
		self.config.multiple = multiple;
		if let Some(change) = self
			.selection
			.set_mode(SelectionMode::from_multiple(multiple))
		{
			self.emit(change);
		}
	}

	pub fn set_disabled(&mut self, disabled: bool) {
		self.config.disabled = disabled;
		if disabled {
			self.close_menu();
		}
	}

	pub fn set_searchable(&mut self, searchable: bool) {
		self.config.searchable = searchable;
	}

	pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
		self.config.placeholder = placeholder.into();
	}

	pub fn set_search_delay(&mut self, delay: Duration) {
		self.config.search_delay = delay;
		self.debouncer.set_delay(delay);
	}

	pub fn set_debug(&mut self, debug: bool) {
		self.config.debug = debug;
	}

	// Highlight

	pub fn highlight_next(&mut self) -> Option<usize> {
		let index = self.highlight.next();
		self.notify_options();
		index
	}

	pub fn highlight_previous(&mut self) -> Option<usize> {
		let index = self.highlight.previous();
		self.notify_options();
		index
	}

	/// Toggle the highlighted item without closing the menu.
	pub fn toggle_highlighted(&mut self) -> bool {
		match self.highlighted_item().cloned() {
			Some(item) => {
				self.toggle(item);
				true
			}
			None => false,
		}
	}

	pub fn activate_highlighted(&mut self) -> bool {
		match self.highlighted_item().cloned() {
			Some(item) => {
				self.activate(item);
				true
			}
			None => false,
		}
	}

	/// Cancel the pending search and abort the in-flight resolution.
	pub fn shutdown(&mut self) {
		self.debouncer.cancel();
		self.coordinator.shutdown();
	}

	pub(super) fn observer_mut(&mut self) -> &mut dyn WidgetObserver {
		self.observer.as_mut()
	}

	fn classify_source(&self) -> OptionsProvider {
		let descriptor = &self.config.source;
		let classification = classify(descriptor, &self.collaborators.host);
		debug!(source = %descriptor, kind = %classification.kind, "classified options source");
		if let Some(failure) = &classification.failure {
			self.report("Error determining options type", failure);
		}
		let settings = ProviderSettings {
			inline_markup: self.config.inner_markup.clone(),
			search_param: self.config.search_param.clone(),
			http_headers: self.config.http_headers.clone(),
		};
		OptionsProvider::build(descriptor, classification, &settings)
	}

	fn resolve(&mut self, term: String) {
		self.requested_term = Some(term.clone());
		self.coordinator.dispatch(
			Arc::clone(&self.provider),
			Arc::clone(&self.collaborators),
			term,
		);
		self.notify_load_state();
	}

	fn after_applied(&mut self, applied: Applied) -> bool {
		match applied {
			Applied::Stale { seq } => {
				trace!(seq, "ignoring superseded options");
				return false;
			}
			Applied::Loaded { .. } => {
				self.highlight.reset_to(self.coordinator.items().len());
				if let Some(raw) = self.pending_values.take() {
					self.apply_values(&raw);
				}
			}
			Applied::Failed { error, .. } => self.report("Error fetching options", &error),
		}
		self.notify_load_state();
		self.notify_options();
		true
	}

	fn apply_values(&mut self, raw: &str) {
		let _ = self.selection.clear();
		let bulk = self.selection.select_values(raw, self.coordinator.items());
		if !bulk.unresolved.is_empty() {
			debug!(unresolved = ?bulk.unresolved, "skipping values with no loaded option");
		}
		self.emit(bulk.change);
	}

	fn find_item(&self, value: &str) -> Option<Item> {
		self.coordinator
			.items()
			.iter()
			.find(|item| item.value == value)
			.cloned()
	}

	fn report(&self, message: &str, error: &ResolveError) {
		if self.config.debug {
			self.diagnostics.report(message, error);
		}
	}

	fn emit(&mut self, change: SelectionChange) {
		self.observer.selection_changed(&change.values);
		self.notify_options();
	}

	fn notify_load_state(&mut self) {
		let state = self.coordinator.state();
		let loading_class = match state {
			LoadState::Loading => self.config.loading_class.as_deref(),
			_ => None,
		};
		self.observer.load_state_changed(state, loading_class);
	}

	fn notify_options(&mut self) {
		let view = OptionsView {
			items: self.coordinator.items(),
			highlighted: self.highlight.current(),
			selection: &self.selection,
			state: self.coordinator.state(),
		};
		self.observer.options_changed(&view);
	}
}

impl Drop for SelectList {
	fn drop(&mut self) {
		self.shutdown();
	}
}

impl fmt::Debug for SelectList {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SelectList")
			.field("variant", &self.config.variant)
			.field("kind", &self.kind())
			.field("state", &self.coordinator.state())
			.field("menu", &self.menu)
			.field("selected", &self.selection.values())
			.finish_non_exhaustive()
	}
}
