//! Options resolution and selection state.
//!
//! Leaf-first: a source descriptor is classified into a [`ProviderKind`], the
//! matching [`OptionsProvider`] resolves it into [`Item`]s, and the
//! [`ResolutionCoordinator`] keeps only the freshest result. Selection and
//! highlight state live in [`SelectionStore`] and [`HighlightNavigator`].

pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod highlight;
pub mod host;
pub mod http;
pub mod item;
pub mod markup;
pub mod selection;
pub mod source;

pub use config::{WidgetConfig, WidgetVariant};
pub use coordinator::{Applied, LoadState, Resolution, ResolutionCoordinator};
pub use debounce::SearchDebouncer;
pub use diagnostics::{DiagnosticSink, RecordingSink, TracingSink};
pub use error::{HostError, ResolveError};
pub use filter::filter_items;
pub use highlight::HighlightNavigator;
pub use host::{CallOutput, HostFunction, HostRegistry, HostValue, async_fn, sync_fn};
pub use http::{HttpClient, ReqwestClient};
pub use item::Item;
pub use markup::{MarkupParser, OptionTagParser};
pub use selection::{SelectionChange, SelectionMode, SelectionStore};
pub use source::{Classification, Collaborators, OptionsProvider, ProviderKind, SourceDescriptor, classify};
