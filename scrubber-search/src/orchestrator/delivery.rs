//! One-shot result delivery.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::types::ScrubResult;

/// Latch around a completion callback: the first [`Delivery::deliver`]
/// invokes it, every later call is a no-op.
pub(crate) struct Delivery<F> {
    delivered: AtomicBool,
    callback: Mutex<Option<F>>,
}

impl<F> Delivery<F>
where
    F: FnOnce(Option<ScrubResult>),
{
    pub(crate) fn new(callback: F) -> Self {
        Self {
            delivered: AtomicBool::new(false),
            callback: Mutex::new(Some(callback)),
        }
    }

    pub(crate) fn is_delivered(&self) -> bool {
        self.delivered.load(Ordering::Acquire)
    }

    /// Hand `result` to the callback unless something was already
    /// delivered. Returns whether this call won.
    pub(crate) fn deliver(&self, result: Option<ScrubResult>) -> bool {
        if self.delivered.swap(true, Ordering::AcqRel) {
            return false;
        }
        let callback = match self.callback.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(callback) = callback {
            callback(result);
        }
        true
    }
}
