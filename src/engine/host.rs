//! Host-global symbols made available to options sources.
//!
//! Sources that name a function, a global object, or an element id are looked
//! up in a [`HostRegistry`] supplied at construction time instead of ambient
//! global state. The registry is cheap to clone and shared between the widget
//! and its in-flight resolutions, so hosts can update globals between
//! resolutions.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use super::error::HostError;

/// Result of invoking a host callable.
pub enum CallOutput {
	/// The callable returned its value synchronously.
	Ready(Value),
	/// The callable returned a promise-like value to await.
	Pending(BoxFuture<'static, Result<Value, HostError>>),
}

impl CallOutput {
	pub fn is_pending(&self) -> bool {
		matches!(self, Self::Pending(_))
	}

	/// Wait for the value regardless of how the callable produced it.
	pub async fn settle(self) -> Result<Value, HostError> {
		match self {
			Self::Ready(value) => Ok(value),
			Self::Pending(future) => future.await,
		}
	}
}

impl fmt::Debug for CallOutput {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
			Self::Pending(_) => f.write_str("Pending(..)"),
		}
	}
}

/// A callable registered in host-global scope.
///
/// `args` carries the search argument object, or `None` when the widget has no
/// search parameter configured or the term is empty.
pub trait HostFunction: Send + Sync {
	fn call(&self, args: Option<Value>) -> Result<CallOutput, HostError>;
}

struct SyncFunction<F>(F);

impl<F> HostFunction for SyncFunction<F>
where
	F: Fn(Option<Value>) -> Result<Value, HostError> + Send + Sync,
{
	fn call(&self, args: Option<Value>) -> Result<CallOutput, HostError> {
		(self.0)(args).map(CallOutput::Ready)
	}
}

struct AsyncFunction<F>(F);

impl<F, Fut> HostFunction for AsyncFunction<F>
where
	F: Fn(Option<Value>) -> Fut + Send + Sync,
	Fut: Future<Output = Result<Value, HostError>> + Send + 'static,
{
	fn call(&self, args: Option<Value>) -> Result<CallOutput, HostError> {
		Ok(CallOutput::Pending((self.0)(args).boxed()))
	}
}

/// Wrap a closure that answers synchronously.
pub fn sync_fn<F>(function: F) -> Arc<dyn HostFunction>
where
	F: Fn(Option<Value>) -> Result<Value, HostError> + Send + Sync + 'static,
{
	Arc::new(SyncFunction(function))
}

/// Wrap a closure that answers with a future.
pub fn async_fn<F, Fut>(function: F) -> Arc<dyn HostFunction>
where
	F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Value, HostError>> + Send + 'static,
{
	Arc::new(AsyncFunction(function))
}

/// A named entry in host-global scope.
#[derive(Clone)]
pub enum HostValue {
	Function(Arc<dyn HostFunction>),
	Object(Value),
}

impl fmt::Debug for HostValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Function(_) => f.write_str("Function(..)"),
			Self::Object(value) => f.debug_tuple("Object").field(value).finish(),
		}
	}
}

#[derive(Debug, Default)]
struct Symbols {
	globals: HashMap<String, HostValue>,
	elements: HashMap<String, String>,
}

/// By-name lookup of callables and objects, and by-id lookup of elements.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
	symbols: Arc<RwLock<Symbols>>,
}

impl HostRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_function(self, name: impl Into<String>, function: Arc<dyn HostFunction>) -> Self {
		self.register_function(name, function);
		self
	}

	pub fn with_object(self, name: impl Into<String>, value: Value) -> Self {
		self.register_object(name, value);
		self
	}

	pub fn with_element(self, id: impl Into<String>, markup: impl Into<String>) -> Self {
		self.register_element(id, markup);
		self
	}

	pub fn register_function(&self, name: impl Into<String>, function: Arc<dyn HostFunction>) {
		self.write(|symbols| {
			symbols
				.globals
				.insert(name.into(), HostValue::Function(function));
		});
	}

	pub fn register_object(&self, name: impl Into<String>, value: Value) {
		self.write(|symbols| {
			symbols.globals.insert(name.into(), HostValue::Object(value));
		});
	}

	/// Register an element by id with the option markup it contains.
	pub fn register_element(&self, id: impl Into<String>, markup: impl Into<String>) {
		self.write(|symbols| {
			symbols.elements.insert(id.into(), markup.into());
		});
	}

	pub fn remove(&self, name: &str) -> Option<HostValue> {
		let mut symbols = self.symbols.write().unwrap_or_else(PoisonError::into_inner);
		symbols.globals.remove(name)
	}

	pub fn global(&self, name: &str) -> Option<HostValue> {
		self.read(|symbols| symbols.globals.get(name).cloned())
	}

	pub fn element(&self, id: &str) -> Option<String> {
		self.read(|symbols| symbols.elements.get(id).cloned())
	}

	fn read<T>(&self, f: impl FnOnce(&Symbols) -> T) -> T {
		let symbols = self.symbols.read().unwrap_or_else(PoisonError::into_inner);
		f(&symbols)
	}

	fn write(&self, f: impl FnOnce(&mut Symbols)) {
		let mut symbols = self.symbols.write().unwrap_or_else(PoisonError::into_inner);
		f(&mut symbols);
	}
}
