//! The select-list widget: engine state wired to menu, search, and keyboard
//! behaviour.
//!
//! A [`SelectList`] is driven from a single logical thread. Resolutions run on
//! spawned tokio tasks and report back through the coordinator's channel, so
//! hosts either call [`SelectList::poll`] from their own loop or await
//! [`SelectList::tick`] / [`SelectList::settle`].

mod actions;
mod builder;
mod observer;
mod state;

pub use actions::Key;
pub use builder::SelectListBuilder;
pub use observer::{NullObserver, OptionRow, OptionsView, WidgetObserver};
pub use state::SelectList;

/// Whether the options menu is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MenuState {
	#[default]
	Closed,
	Open,
}

impl MenuState {
	pub fn is_open(self) -> bool {
		self == Self::Open
	}
}
