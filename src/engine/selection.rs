//! Selected items and the single/multiple invariants over them.

use super::item::Item;

/// Whether the widget holds one selection or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionMode {
	#[default]
	Single,
	Multiple,
}

impl SelectionMode {
	pub fn from_multiple(multiple: bool) -> Self {
		if multiple { Self::Multiple } else { Self::Single }
	}
}

/// Notification produced by every mutating selection operation.
///
/// Carries the selected values in display order, even when empty.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "selection changes must be forwarded to the host"]
pub struct SelectionChange {
	pub values: Vec<String>,
}

/// Result of initializing the selection from an external value string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkSelection {
	pub change: SelectionChange,
	/// Values that referenced no loaded item.
	pub unresolved: Vec<String>,
}

/// Ordered set of selected items, unique by value.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
	mode: SelectionMode,
	selected: Vec<Item>,
}

impl SelectionStore {
	pub fn new(mode: SelectionMode) -> Self {
		Self {
			mode,
			selected: Vec::new(),
		}
	}

	pub fn mode(&self) -> SelectionMode {
		self.mode
	}

	/// Switch modes. Dropping to single mode keeps only the first selected item.
	pub fn set_mode(&mut self, mode: SelectionMode) -> Option<SelectionChange> {
		self.mode = mode;
		if mode == SelectionMode::Single && self.selected.len() > 1 {
			self.selected.truncate(1);
			return Some(self.change());
		}
		None
	}

	/// Select `item`. Single mode replaces the set; multiple mode appends if absent.
	pub fn select(&mut self, item: Item) -> SelectionChange {
		self.insert(item);
		self.change()
	}

	/// Remove `item` by value.
	pub fn deselect(&mut self, item: &Item) -> SelectionChange {
		self.selected.retain(|selected| selected != item);
		self.change()
	}

	/// Flip membership in multiple mode; behaves like [`Self::select`] in single mode.
	pub fn toggle(&mut self, item: Item) -> SelectionChange {
		match self.mode {
			SelectionMode::Multiple if self.is_selected(&item) => self.deselect(&item),
			_ => self.select(item),
		}
	}

	pub fn clear(&mut self) -> SelectionChange {
		self.selected.clear();
		self.change()
	}

	pub fn is_selected(&self, item: &Item) -> bool {
		self.contains_value(&item.value)
	}

	pub fn contains_value(&self, value: &str) -> bool {
		self.selected.iter().any(|selected| selected.value == value)
	}

	pub fn values(&self) -> Vec<String> {
		self.selected.iter().map(|item| item.value.clone()).collect()
	}

	pub fn items(&self) -> &[Item] {
		&self.selected
	}

	pub fn len(&self) -> usize {
		self.selected.len()
	}

	pub fn is_empty(&self) -> bool {
		self.selected.is_empty()
	}

	/// Select the items named by a comma-separated value string.
	///
	/// Each value is looked up in `loaded`; values with no loaded item are
	/// skipped and reported back. An empty string clears the selection.
	pub fn select_values(&mut self, raw: &str, loaded: &[Item]) -> BulkSelection {
		if raw.trim().is_empty() {
			return BulkSelection {
				change: self.clear(),
				unresolved: Vec::new(),
			};
		}

		let mut unresolved = Vec::new();
		for value in split_values(raw) {
			match loaded.iter().find(|item| item.value == value) {
				Some(item) => self.insert(item.clone()),
				None => unresolved.push(value.to_string()),
			}
		}

		BulkSelection {
			change: self.change(),
			unresolved,
		}
	}

	fn insert(&mut self, item: Item) {
		match self.mode {
			SelectionMode::Single => {
				self.selected.clear();
				self.selected.push(item);
			}
			SelectionMode::Multiple => {
				if !self.is_selected(&item) {
					self.selected.push(item);
				}
			}
		}
	}

	fn change(&self) -> SelectionChange {
		SelectionChange {
			values: self.values(),
		}
	}
}

/// Split a comma-separated value string, dropping blank entries.
pub fn split_values(raw: &str) -> impl Iterator<Item = &str> {
	raw.split(',').map(str::trim).filter(|value| !value.is_empty())
}
