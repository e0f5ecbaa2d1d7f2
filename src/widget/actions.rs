use std::str::FromStr;

use super::SelectList;

/// Keys the widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
	Enter,
	Space,
	ArrowDown,
	ArrowUp,
	Tab,
	Escape,
}

impl FromStr for Key {
	type Err = String;

	/// Parse a DOM `KeyboardEvent.key` name.
	fn from_str(name: &str) -> Result<Self, Self::Err> {
		match name {
			"Enter" => Ok(Self::Enter),
			" " | "Space" | "Spacebar" => Ok(Self::Space),
			"ArrowDown" | "Down" => Ok(Self::ArrowDown),
			"ArrowUp" | "Up" => Ok(Self::ArrowUp),
			"Tab" => Ok(Self::Tab),
			"Escape" | "Esc" => Ok(Self::Escape),
			other => Err(format!("unhandled key `{other}`")),
		}
	}
}

impl SelectList {
	/// Handle a key pressed on the control showing the selection.
	///
	/// Returns `true` when the key was consumed and its default action should
	/// be suppressed.
	pub fn handle_control_key(&mut self, key: Key) -> bool {
		if self.config().disabled {
			return false;
		}
		match key {
			Key::Enter | Key::Space => {
				self.toggle_menu();
			}
			Key::ArrowDown | Key::ArrowUp => {
				self.open_menu();
			}
			Key::Escape => {
				self.close_menu();
			}
			Key::Tab => return false,
		}
		true
	}

	/// Handle a key pressed inside the open options list.
	pub fn handle_list_key(&mut self, key: Key) -> bool {
		if !self.is_open() {
			return false;
		}
		match key {
			Key::ArrowDown | Key::Tab => {
				self.highlight_next();
			}
			Key::ArrowUp => {
				self.highlight_previous();
			}
			Key::Enter => {
				self.toggle_highlighted();
			}
			Key::Space => {
				self.activate_highlighted();
			}
			Key::Escape => {
				self.close_menu();
				self.observer_mut().focus_control();
			}
		}
		true
	}
}
