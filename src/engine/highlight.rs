/// Keyboard focus position over the currently displayed items.
///
/// Movement wraps in both directions. An empty list has no highlight rather
/// than an index computed modulo zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightNavigator {
	index: usize,
	len: usize,
}

impl HighlightNavigator {
	pub fn new(len: usize) -> Self {
		Self { index: 0, len }
	}

	/// Point at a new list and return to the top.
	pub fn reset_to(&mut self, len: usize) {
		self.len = len;
		self.index = 0;
	}

	pub fn reset(&mut self) {
		self.index = 0;
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn current(&self) -> Option<usize> {
		(self.len > 0).then_some(self.index.min(self.len - 1))
	}

	pub fn next(&mut self) -> Option<usize> {
		if self.len == 0 {
			return None;
		}
		self.index = (self.index.min(self.len - 1) + 1) % self.len;
		Some(self.index)
	}

	pub fn previous(&mut self) -> Option<usize> {
		if self.len == 0 {
			return None;
		}
		self.index = (self.index.min(self.len - 1) + self.len - 1) % self.len;
		Some(self.index)
	}
}
