//! Per-shard mailboxes for deferred remote writes.
//!
//! Workers never touch a mailbox per write: each worker fills an [`Outbox`]
//! (one local buffer per destination shard) and splices a whole buffer into
//! the destination mailbox under one lock acquisition.

use std::sync::{Mutex, PoisonError};

use crossbeam_utils::CachePadded;

use crate::memory::RemoteAtomic;

/// Writes buffered per destination shard before an outbox flushes them.
pub const OUTBOX_FLUSH: usize = 256;

/// A write waiting in its home shard's mailbox.
pub(crate) type PendingWrite<'env, A> = (&'env A, <A as RemoteAtomic>::Value);

/// The inbound mailbox of one shard.
pub(crate) struct Mailbox<'env, A: RemoteAtomic + 'env> {
    pending: CachePadded<Mutex<Vec<PendingWrite<'env, A>>>>,
}

impl<'env, A: RemoteAtomic + 'env> Mailbox<'env, A> {
    pub(crate) fn new() -> Self {
        Self {
            pending: CachePadded::new(Mutex::new(Vec::new())),
        }
    }

    /// Appends a buffer of writes, leaving `writes` empty.
    pub(crate) fn deliver(&self, writes: &mut Vec<PendingWrite<'env, A>>) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.is_empty() {
            core::mem::swap(&mut *pending, writes);
        } else {
            pending.append(writes);
        }
    }

    /// Applies every delivered write at the owning shard, in delivery order.
    ///
    /// Returns the number of writes applied.
    pub(crate) fn apply(self) -> usize {
        let pending = CachePadded::into_inner(self.pending)
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let n = pending.len();
        for (cell, value) in pending {
            cell.remote_write(value);
        }
        n
    }
}

/// A worker-local staging buffer for deferred writes.
///
/// Created by [`WriteBatch::outbox`](super::WriteBatch::outbox); flushes on
/// drop, so every write staged here reaches a mailbox before the region ends.
pub struct Outbox<'b, 'env, A: RemoteAtomic + 'env> {
    pub(crate) batch: &'b super::WriteBatch<'b, 'env, A>,
    pub(crate) staged: Vec<Vec<PendingWrite<'env, A>>>,
}

impl<'b, 'env, A: RemoteAtomic + 'env> Outbox<'b, 'env, A> {
    /// Stages `target[index] = value` for the home shard of `index`.
    ///
    /// # Panics
    /// Panics if `index >= target.len()`.
    #[inline]
    pub fn write(
        &mut self,
        target: &'env crate::memory::StripedArray<A>,
        index: usize,
        value: A::Value,
    ) {
        let shard = target.partitioning().owner(index);
        let buf = &mut self.staged[shard];
        buf.push((target.get(index), value));
        if buf.len() >= OUTBOX_FLUSH {
            self.batch.deliver(shard, buf);
        }
    }

    /// Hands every staged write to its mailbox.
    pub fn flush(&mut self) {
        for (shard, buf) in self.staged.iter_mut().enumerate() {
            if !buf.is_empty() {
                self.batch.deliver(shard, buf);
            }
        }
    }
}

impl<'b, 'env, A: RemoteAtomic + 'env> Drop for Outbox<'b, 'env, A> {
    fn drop(&mut self) {
        self.flush();
    }
}
