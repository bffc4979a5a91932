//! Typed decode target registered on the client.
//!
//! `Output<T>` is a shared slot: the caller keeps one handle, registers a
//! clone with `Client::set_output`, and reads the decoded value back after
//! the dispatch. The client only sees it through the object-safe
//! `DecodeTarget` trait.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;

/// Something a response body can be JSON-decoded into.
pub trait DecodeTarget: Send + Sync {
    fn decode(&self, body: &[u8]) -> Result<(), serde_json::Error>;

    fn as_any(&self) -> &dyn Any;
}

/// Shared, typed slot populated in place by the dispatcher.
pub struct Output<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Output<T> {
    /// Empty slot.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Slot pre-filled by the caller; kept as-is unless a decode succeeds.
    pub fn with_value(value: T) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(value))),
        }
    }

    pub fn is_set(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn take(&self) -> Option<T> {
        self.slot.lock().take()
    }

    pub fn map<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.slot.lock().as_ref().map(f)
    }
}

impl<T: Clone> Output<T> {
    pub fn get(&self) -> Option<T> {
        self.slot.lock().clone()
    }
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for Output<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Output").field(&*self.slot.lock()).finish()
    }
}

impl<T> DecodeTarget for Output<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn decode(&self, body: &[u8]) -> Result<(), serde_json::Error> {
        let value = serde_json::from_slice(body)?;
        *self.slot.lock() = Some(value);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
