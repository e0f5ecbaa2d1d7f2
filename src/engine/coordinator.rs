//! Tracks the in-flight resolution and discards superseded responses.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::error::{HostError, ResolveError};
use super::item::Item;
use super::source::{Collaborators, OptionsProvider};

/// Availability of the option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
	#[default]
	Unloaded,
	Loading,
	Loaded,
	Error,
}

/// A finished resolution, tagged with the sequence number it was dispatched under.
#[derive(Debug, Clone)]
pub struct Resolution {
	pub seq: u64,
	pub term: String,
	pub outcome: Result<Vec<Item>, ResolveError>,
}

/// What applying a [`Resolution`] did to the visible state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
	Loaded { seq: u64 },
	Failed { seq: u64, error: ResolveError },
	/// A newer request was dispatched; nothing changed.
	Stale { seq: u64 },
}

/// Owner of the load state and the resolved item list.
///
/// Every dispatch is tagged with a strictly increasing sequence number. Only a
/// result carrying the latest number may touch the visible state, so a slow
/// response can never overwrite a newer one.
pub struct ResolutionCoordinator {
	state: LoadState,
	latest: u64,
	items: Vec<Item>,
	resolved_term: Option<String>,
	last_error: Option<ResolveError>,
	timeout: Option<Duration>,
	tx: UnboundedSender<Resolution>,
	rx: UnboundedReceiver<Resolution>,
	in_flight: Option<JoinHandle<()>>,
}

impl ResolutionCoordinator {
	pub fn new(timeout: Option<Duration>) -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		Self {
			state: LoadState::Unloaded,
			latest: 0,
			items: Vec::new(),
			resolved_term: None,
			last_error: None,
			timeout,
			tx,
			rx,
			in_flight: None,
		}
	}

	pub fn state(&self) -> LoadState {
		self.state
	}

	pub fn is_loading(&self) -> bool {
		self.state == LoadState::Loading
	}

	/// Sequence number of the most recent dispatch.
	pub fn latest(&self) -> u64 {
		self.latest
	}

	/// Items from the latest successful resolution, already filtered by its term.
	pub fn items(&self) -> &[Item] {
		&self.items
	}

	/// Search term behind [`Self::items`], if anything has loaded.
	pub fn resolved_term(&self) -> Option<&str> {
		self.resolved_term.as_deref()
	}

	pub fn last_error(&self) -> Option<&ResolveError> {
		self.last_error.as_ref()
	}

	/// Claim the next sequence number and enter the loading state.
	pub fn begin(&mut self) -> u64 {
		self.latest += 1;
		self.state = LoadState::Loading;
		self.latest
	}

	/// Start resolving `term` on a background task.
	///
	/// The previous task is aborted. Its result may already be queued, in which
	/// case [`Self::apply`] drops it as stale.
	pub fn dispatch(
		&mut self,
		provider: Arc<OptionsProvider>,
		collaborators: Arc<Collaborators>,
		term: String,
	) -> u64 {
		let seq = self.begin();
		if let Some(previous) = self.in_flight.take() {
			previous.abort();
		}
		debug!(seq, kind = %provider.kind(), %term, "dispatching resolution");

		let tx = self.tx.clone();
		let timeout = self.timeout;
		self.in_flight = Some(tokio::spawn(async move {
			let outcome = run_provider(&provider, &collaborators, &term, timeout).await;
			let _ = tx.send(Resolution { seq, term, outcome });
		}));
		seq
	}

	/// Apply a finished resolution if it belongs to the latest dispatch.
	pub fn apply(&mut self, resolution: Resolution) -> Applied {
		let Resolution { seq, term, outcome } = resolution;
		if seq != self.latest {
			trace!(seq, latest = self.latest, "discarding stale resolution");
			return Applied::Stale { seq };
		}

		self.in_flight = None;
		match outcome {
			Ok(items) => {
				debug!(seq, count = items.len(), "options loaded");
				self.items = items;
				self.resolved_term = Some(term);
				self.last_error = None;
				self.state = LoadState::Loaded;
				Applied::Loaded { seq }
			}
			Err(error) => {
				self.last_error = Some(error.clone());
				self.state = LoadState::Error;
				Applied::Failed { seq, error }
			}
		}
	}

	/// Apply every queued result without waiting.
	pub fn pump(&mut self) -> Vec<Applied> {
		let mut applied = Vec::new();
		while let Ok(resolution) = self.rx.try_recv() {
			applied.push(self.apply(resolution));
		}
		applied
	}

	/// Wait for the latest dispatch to settle.
	///
	/// Stale results received on the way are discarded. Returns `None` when
	/// nothing is loading.
	pub async fn next_applied(&mut self) -> Option<Applied> {
		while self.is_loading() {
			let resolution = self.rx.recv().await?;
			match self.apply(resolution) {
				Applied::Stale { .. } => continue,
				applied => return Some(applied),
			}
		}
		None
	}

	/// Abort the in-flight task and invalidate anything still queued.
	pub fn shutdown(&mut self) {
		if let Some(task) = self.in_flight.take() {
			task.abort();
		}
		if self.is_loading() {
			self.latest += 1;
			self.state = if self.resolved_term.is_some() {
				LoadState::Loaded
			} else {
				LoadState::Unloaded
			};
		}
	}
}

impl Drop for ResolutionCoordinator {
	fn drop(&mut self) {
		if let Some(task) = self.in_flight.take() {
			task.abort();
		}
	}
}

impl fmt::Debug for ResolutionCoordinator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResolutionCoordinator")
			.field("state", &self.state)
			.field("latest", &self.latest)
			.field("items", &self.items.len())
			.field("resolved_term", &self.resolved_term)
			.finish_non_exhaustive()
	}
}

async fn run_provider(
	provider: &OptionsProvider,
	collaborators: &Collaborators,
	term: &str,
	timeout: Option<Duration>,
) -> Result<Vec<Item>, ResolveError> {
	let resolve = AssertUnwindSafe(provider.resolve(term, collaborators)).catch_unwind();
	let outcome = match timeout {
		Some(after) => match tokio::time::timeout(after, resolve).await {
			Ok(outcome) => outcome,
			Err(_) => return Err(ResolveError::Timeout { after }),
		},
		None => resolve.await,
	};
	outcome.unwrap_or_else(|_| {
		Err(ResolveError::invocation(
			provider.kind().as_str(),
			&HostError::new("provider panicked"),
		))
	})
}
