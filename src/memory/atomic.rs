//! Remote atomic operations.
//!
//! The operations mirror what a partitioned machine offers against memory on
//! another partition: fire-and-forget writes/adds/ors, and value-returning
//! fetch-add and compare-and-swap. Fire-and-forget operations only need
//! per-address coherence, so they are `Relaxed`; the claim protocol (CAS) uses
//! acquire/release so a winner's parent value is published with the claim.
//! Cross-address visibility comes from the fork/join points of the caller.

use core::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};

/// An atomic cell that can be targeted by remote operations.
pub trait RemoteAtomic: Send + Sync {
    /// The plain value stored in the cell.
    type Value: Copy + Send + Sync;

    /// Creates a new cell.
    fn new_cell(value: Self::Value) -> Self;

    /// Plain read of the current value.
    fn read(&self) -> Self::Value;

    /// Remote store; last writer to an address wins.
    fn remote_write(&self, value: Self::Value);

    /// Remote add without returning the previous value.
    fn remote_add(&self, delta: Self::Value);

    /// Remote bitwise OR without returning the previous value.
    fn remote_or(&self, bits: Self::Value);

    /// Adds `delta` at the owner and returns the previous value.
    fn atomic_fetch_add(&self, delta: Self::Value) -> Self::Value;

    /// Replaces `expected` with `new` at the owner.
    ///
    /// Returns `Ok(previous)` on success and `Err(observed)` otherwise.
    fn atomic_cas(&self, expected: Self::Value, new: Self::Value)
        -> Result<Self::Value, Self::Value>;

    /// Consumes the cell, returning the value.
    fn into_value(self) -> Self::Value;
}

macro_rules! remote_atomic {
    ($atomic:ty, $value:ty) => {
        impl RemoteAtomic for $atomic {
            type Value = $value;

            #[inline(always)]
            fn new_cell(value: $value) -> Self {
                <$atomic>::new(value)
            }

            #[inline(always)]
            fn read(&self) -> $value {
                self.load(Ordering::Relaxed)
            }

            #[inline(always)]
            fn remote_write(&self, value: $value) {
                self.store(value, Ordering::Relaxed);
            }

            #[inline(always)]
            fn remote_add(&self, delta: $value) {
                self.fetch_add(delta, Ordering::Relaxed);
            }

            #[inline(always)]
            fn remote_or(&self, bits: $value) {
                self.fetch_or(bits, Ordering::Relaxed);
            }

            #[inline(always)]
            fn atomic_fetch_add(&self, delta: $value) -> $value {
                self.fetch_add(delta, Ordering::Relaxed)
            }

            #[inline(always)]
            fn atomic_cas(&self, expected: $value, new: $value) -> Result<$value, $value> {
                self.compare_exchange(expected, new, Ordering::AcqRel, Ordering::Acquire)
            }

            #[inline(always)]
            fn into_value(self) -> $value {
                self.into_inner()
            }
        }
    };
}

remote_atomic!(AtomicI64, i64);
remote_atomic!(AtomicU64, u64);
remote_atomic!(AtomicUsize, usize);
