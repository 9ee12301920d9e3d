//! Lock-free f32 cell
//!
//! The standard library has no `AtomicF32`, so the value is stored as its bit
//! pattern in an `AtomicU32`. Loads and stores take an explicit ordering like
//! the integer atomics they wrap.

use std::sync::atomic::{AtomicU32, Ordering};

/// An `f32` that can be shared between threads without locking
#[derive(Debug)]
pub struct AtomicF32 {
    bits: AtomicU32,
}

impl AtomicF32 {
    /// Create a new cell holding `value`
    pub fn new(value: f32) -> Self {
        Self {
            bits: AtomicU32::new(value.to_bits()),
        }
    }

    /// Load the current value
    #[inline]
    pub fn load(&self, order: Ordering) -> f32 {
        f32::from_bits(self.bits.load(order))
    }

    /// Store a new value
    #[inline]
    pub fn store(&self, value: f32, order: Ordering) {
        self.bits.store(value.to_bits(), order);
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(0.0)
    }
}
