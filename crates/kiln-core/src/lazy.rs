//! LazyValue - 初回アクセス時に 1 回だけ構築される値
//!
//! A successful construction is memoized for the lifetime of the value.
//! A failed construction is not: the next access runs the factory again.
//! Concurrent first accesses block on the one in-flight construction.

use std::fmt;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::error::KilnError;
use crate::ports::Provider;

type Factory<T> = Box<dyn Fn() -> Result<T, KilnError> + Send + Sync>;

pub struct LazyValue<T> {
    cell: OnceCell<T>,
    factory: Factory<T>,
}

impl<T> LazyValue<T> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<T, KilnError> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(factory),
        }
    }

    /// Returns the value, constructing it on first access.
    pub fn get(&self) -> Result<&T, KilnError> {
        self.cell.get_or_try_init(|| (self.factory)())
    }

    /// Returns the value only if it has already been constructed.
    pub fn peek(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("LazyValue").field(value).finish(),
            None => f.write_str("LazyValue(<uninit>)"),
        }
    }
}

// A lazy provider is used exactly like the provider it wraps.
#[async_trait]
impl<P: Provider> Provider for LazyValue<P> {
    async fn request(&self, method: &str, params: Value) -> Result<Value, KilnError> {
        self.get()?.request(method, params).await
    }
}
