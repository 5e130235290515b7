//! AtomicFloat

use crate::pbrt::{bits_to_double, bits_to_float, double_to_bits, float_to_bits, Float};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Implement atomic floating point value using `AtomicU32`.
pub struct AtomicFloat {
    /// Bit representation of floating point value.
    bits: AtomicU32,
}

impl AtomicFloat {
    /// Create a new `AtomicFloat`.
    ///
    /// * `v` - The value.
    pub fn new(v: Float) -> Self {
        Self {
            bits: AtomicU32::new(float_to_bits(v)),
        }
    }

    /// Add a floating point value and return the previous value.
    ///
    /// * `v` - The value to add.
    pub fn add(&self, v: Float) -> Float {
        let mut old_bits: u32 = self.bits.load(Ordering::Relaxed);
        loop {
            let new_bits = float_to_bits(bits_to_float(old_bits) + v);
            match self
                .bits
                .compare_exchange_weak(old_bits, new_bits, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return bits_to_float(old_bits),
                Err(x) => old_bits = x,
            }
        }
    }

    /// Loads the floating point value.
    ///
    /// * `order` - Memory ordering of this operation
    pub fn load(&self, order: Ordering) -> Float {
        bits_to_float(self.bits.load(order))
    }

    /// Stores the floating point value.
    ///
    /// * `v`     - The value.
    /// * `order` - Memory ordering of this operation
    pub fn store(&self, v: Float, order: Ordering) {
        self.bits.store(float_to_bits(v), order);
    }

    /// Stores a value and returns the previous one.
    ///
    /// * `v`     - The value.
    /// * `order` - Memory ordering of this operation
    pub fn swap(&self, v: Float, order: Ordering) -> Float {
        bits_to_float(self.bits.swap(float_to_bits(v), order))
    }
}

impl Default for AtomicFloat {
    /// Returns the "default value" for `AtomicFloat`.
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Clone for AtomicFloat {
    fn clone(&self) -> Self {
        Self::new(self.load(Ordering::SeqCst))
    }
}

/// Double precision counterpart of `AtomicFloat` used for running totals that
/// outgrow `f32` precision, like film sample counts.
pub struct AtomicDouble {
    /// Bit representation of floating point value.
    bits: AtomicU64,
}

impl AtomicDouble {
    /// Create a new `AtomicDouble`.
    ///
    /// * `v` - The value.
    pub fn new(v: f64) -> Self {
        Self {
            bits: AtomicU64::new(double_to_bits(v)),
        }
    }

    /// Add a floating point value and return the previous value.
    ///
    /// * `v` - The value to add.
    pub fn add(&self, v: f64) -> f64 {
        let mut old_bits: u64 = self.bits.load(Ordering::Relaxed);
        loop {
            let new_bits = double_to_bits(bits_to_double(old_bits) + v);
            match self
                .bits
                .compare_exchange_weak(old_bits, new_bits, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return bits_to_double(old_bits),
                Err(x) => old_bits = x,
            }
        }
    }

    /// Loads the floating point value.
    ///
    /// * `order` - Memory ordering of this operation
    pub fn load(&self, order: Ordering) -> f64 {
        bits_to_double(self.bits.load(order))
    }

    /// Stores the floating point value.
    ///
    /// * `v`     - The value.
    /// * `order` - Memory ordering of this operation
    pub fn store(&self, v: f64, order: Ordering) {
        self.bits.store(double_to_bits(v), order);
    }
}

impl Default for AtomicDouble {
    /// Returns the "default value" for `AtomicDouble`.
    fn default() -> Self {
        Self::new(0.0)
    }
}
