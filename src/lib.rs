//! Options resolution and selection state for `select-list` dropdown widgets.
//!
//! The root module re-exports the engine and widget types so that embedders
//! can configure a widget without digging through the module hierarchy.

pub mod app_dirs;
pub mod engine;
pub mod logging;
pub mod widget;

pub use engine::{
	DiagnosticSink, HostError, HostFunction, HostRegistry, HttpClient, Item, LoadState,
	MarkupParser, ProviderKind, RecordingSink, ResolveError, SelectionMode, SourceDescriptor,
	TracingSink, WidgetConfig, WidgetVariant, async_fn, sync_fn,
};
pub use widget::{Key, MenuState, OptionsView, SelectList, SelectListBuilder, WidgetObserver};
