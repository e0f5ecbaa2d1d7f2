use crate::engine::{Item, LoadState, SelectionStore};

use super::MenuState;

/// Read-only snapshot of the option list handed to render collaborators.
#[derive(Debug, Clone, Copy)]
pub struct OptionsView<'a> {
	pub items: &'a [Item],
	pub highlighted: Option<usize>,
	pub selection: &'a SelectionStore,
	pub state: LoadState,
}

/// One rendered option row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionRow<'a> {
	pub item: &'a Item,
	pub highlighted: bool,
	pub selected: bool,
}

impl<'a> OptionsView<'a> {
	/// True when the list should show its "No options" marker.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn rows(&self) -> impl Iterator<Item = OptionRow<'a>> + '_ {
		self.items.iter().enumerate().map(|(index, item)| OptionRow {
			item,
			highlighted: self.highlighted == Some(index),
			selected: self.selection.is_selected(item),
		})
	}
}

/// Host-side hooks the widget notifies as its state changes.
///
/// Every method defaults to a no-op so hosts implement only what they render.
pub trait WidgetObserver: Send {
	/// The selection changed; `values` are in display order.
	fn selection_changed(&mut self, _values: &[String]) {}

	/// The option list, highlight, or selection membership needs repainting.
	fn options_changed(&mut self, _view: &OptionsView<'_>) {}

	/// Loading started or finished. `loading_class` is set only while loading.
	fn load_state_changed(&mut self, _state: LoadState, _loading_class: Option<&str>) {}

	fn menu_changed(&mut self, _menu: MenuState) {}

	/// Move focus to the search input.
	fn focus_search(&mut self) {}

	/// Move focus back to the control showing the selected values.
	fn focus_control(&mut self) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl WidgetObserver for NullObserver {}
