//! Coalescing of rapid search-term edits.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Quiet period applied when the host does not configure one.
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
struct PendingTerm {
	term: String,
	deadline: Instant,
}

/// Holds the latest search term until input has been quiet for `delay`.
///
/// The debouncer owns no timer task: the widget polls it or awaits
/// [`SearchDebouncer::settled`], so dropping or cancelling it leaves nothing
/// behind to fire against a torn-down widget.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
	delay: Duration,
	pending: Option<PendingTerm>,
}

impl Default for SearchDebouncer {
	fn default() -> Self {
		Self::new(DEFAULT_SEARCH_DELAY)
	}
}

impl SearchDebouncer {
	pub fn new(delay: Duration) -> Self {
		Self {
			delay,
			pending: None,
		}
	}

	pub fn delay(&self) -> Duration {
		self.delay
	}

	pub fn set_delay(&mut self, delay: Duration) {
		self.delay = delay;
	}

	/// Record a new term, restarting the quiet period.
	///
	/// Returns the term straight away when the delay is zero.
	pub fn on_term_changed(&mut self, term: impl Into<String>, now: Instant) -> Option<String> {
		let term = term.into();
		if self.delay.is_zero() {
			self.pending = None;
			return Some(term);
		}
		self.pending = Some(PendingTerm {
			term,
			deadline: now + self.delay,
		});
		None
	}

	/// Take the pending term if its quiet period has elapsed by `now`.
	pub fn poll(&mut self, now: Instant) -> Option<String> {
		match &self.pending {
			Some(pending) if pending.deadline <= now => self.pending.take().map(|p| p.term),
			_ => None,
		}
	}

	pub fn deadline(&self) -> Option<Instant> {
		self.pending.as_ref().map(|pending| pending.deadline)
	}

	pub fn is_pending(&self) -> bool {
		self.pending.is_some()
	}

	/// Drop any pending term without firing it.
	pub fn cancel(&mut self) {
		self.pending = None;
	}

	/// Wait out the quiet period and return the settled term.
	///
	/// Resolves to `None` immediately when nothing is pending.
	pub async fn settled(&mut self) -> Option<String> {
		let deadline = self.deadline()?;
		sleep_until(deadline).await;
		self.pending.take().map(|pending| pending.term)
	}
}
