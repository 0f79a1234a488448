//! Acknowledgement / flow control for remote writes.
//!
//! A [`FlowControl`] is an explicit context owned by the caller. By default
//! every write it issues is acknowledged (applied before the call returns).
//! [`FlowControl::unacknowledged`] opens a region in which writes are sent to
//! the home shard's mailbox without confirmation. Closing the region drains
//! every mailbox at its owning shard and then runs the barrier: one
//! acknowledgement write to every shard, joined before returning. After the
//! region every write issued inside it is visible.
//!
//! Nested regions ([`WriteBatch::nested`]) are reference counted; only the
//! outermost exit drains.

mod mailbox;

use core::marker::PhantomData;
use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::Serialize;
use tracing::trace;

pub use mailbox::{Outbox, OUTBOX_FLUSH};
use mailbox::{Mailbox, PendingWrite};

use crate::memory::{Partitioning, RemoteAtomic, Replicated, StripedArray};

/// Counters describing how the controller has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlowStats {
    /// Unacknowledged regions closed so far.
    pub regions: u64,
    /// Writes that went through a mailbox.
    pub deferred_writes: u64,
    /// Barriers executed (one per outermost region exit).
    pub barriers: u64,
}

/// Caller-owned flow-control context.
pub struct FlowControl {
    partitioning: Partitioning,
    depth: AtomicUsize,
    ack_epoch: Replicated<AtomicU64>,
    regions: AtomicU64,
    deferred_writes: AtomicU64,
    barriers: AtomicU64,
}

impl FlowControl {
    /// Creates a controller for the given shards, with acknowledgements enabled.
    pub fn new(partitioning: Partitioning) -> Self {
        Self {
            partitioning,
            depth: AtomicUsize::new(0),
            ack_epoch: Replicated::broadcast(partitioning, |_| AtomicU64::new(0)),
            regions: AtomicU64::new(0),
            deferred_writes: AtomicU64::new(0),
            barriers: AtomicU64::new(0),
        }
    }

    /// The shards this controller fences.
    pub fn partitioning(&self) -> Partitioning {
        self.partitioning
    }

    /// `true` outside any unacknowledged region.
    #[inline]
    pub fn acks_enabled(&self) -> bool {
        self.depth() == 0
    }

    /// Current nesting depth of unacknowledged regions.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    /// Number of barrier acknowledgements `shard` has received.
    pub fn ack_epoch(&self, shard: usize) -> u64 {
        self.ack_epoch.local(shard).read()
    }

    /// Snapshot of the usage counters.
    pub fn stats(&self) -> FlowStats {
        FlowStats {
            regions: self.regions.load(Ordering::Relaxed),
            deferred_writes: self.deferred_writes.load(Ordering::Relaxed),
            barriers: self.barriers.load(Ordering::Relaxed),
        }
    }

    /// Acknowledged write: applied at the home shard before returning.
    pub fn write<A: RemoteAtomic>(&self, target: &StripedArray<A>, index: usize, value: A::Value) {
        debug_assert!(self.acks_enabled());
        target.get(index).remote_write(value);
    }

    /// Runs `f` with acknowledgements disabled, then drains and fences.
    ///
    /// Taking `&mut self` keeps the controller single-owner: two traversals can
    /// not share one open region.
    pub fn unacknowledged<'env, A, R>(
        &mut self,
        f: impl for<'b> FnOnce(&'b WriteBatch<'b, 'env, A>) -> R,
    ) -> R
    where
        A: RemoteAtomic + 'env,
    {
        let this: &Self = self;
        let guard = DepthGuard::enter(&this.depth);
        let batch = WriteBatch {
            flow: this,
            mailboxes: (0..this.partitioning.shards()).map(|_| Mailbox::new()).collect(),
            _env: PhantomData,
        };
        let out = f(&batch);
        drop(guard);
        debug_assert!(this.acks_enabled(), "nested region leaked past its parent");
        this.drain(batch.mailboxes);
        out
    }

    /// Applies every mailbox at its shard, then acknowledges every shard.
    fn drain<'env, A: RemoteAtomic + 'env>(&self, mailboxes: Vec<Mailbox<'env, A>>) {
        let applied: usize = mailboxes
            .into_par_iter()
            .enumerate()
            .map(|(shard, mailbox)| {
                let n = mailbox.apply();
                // The barrier write: the shard confirms it has drained.
                self.ack_epoch.local(shard).remote_add(1);
                n
            })
            .sum();
        self.regions.fetch_add(1, Ordering::Relaxed);
        self.barriers.fetch_add(1, Ordering::Relaxed);
        trace!(
            applied,
            shards = self.partitioning.shards(),
            "drained unacknowledged writes"
        );
    }
}

/// Holds one level of region depth; releasing it also happens on unwind, so a
/// panicking region leaves acknowledgements enabled.
struct DepthGuard<'a> {
    depth: &'a AtomicUsize,
}

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a AtomicUsize) -> Self {
        depth.fetch_add(1, Ordering::AcqRel);
        Self { depth }
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::AcqRel);
    }
}

/// An open unacknowledged region.
pub struct WriteBatch<'b, 'env, A: RemoteAtomic + 'env> {
    flow: &'b FlowControl,
    mailboxes: Vec<Mailbox<'env, A>>,
    _env: PhantomData<&'env A>,
}

impl<'b, 'env, A: RemoteAtomic + 'env> WriteBatch<'b, 'env, A> {
    /// Creates a worker-local outbox staging writes into this region.
    pub fn outbox(&'b self) -> Outbox<'b, 'env, A> {
        Outbox {
            batch: self,
            staged: (0..self.mailboxes.len()).map(|_| Vec::new()).collect(),
        }
    }

    /// Unstaged single write; prefer an [`Outbox`] on hot paths.
    pub fn write(&self, target: &'env StripedArray<A>, index: usize, value: A::Value) {
        let shard = target.partitioning().owner(index);
        self.deliver(shard, &mut vec![(target.get(index), value)]);
    }

    /// Runs `f` inside a nested region. Writes stay deferred until the
    /// outermost region exits.
    pub fn nested<R>(&self, f: impl FnOnce(&Self) -> R) -> R {
        let _guard = DepthGuard::enter(&self.flow.depth);
        f(self)
    }

    /// Current nesting depth (at least 1 while the batch is open).
    pub fn depth(&self) -> usize {
        self.flow.depth()
    }

    pub(crate) fn deliver(&self, shard: usize, writes: &mut Vec<PendingWrite<'env, A>>) {
        self.flow
            .deferred_writes
            .fetch_add(writes.len() as u64, Ordering::Relaxed);
        self.mailboxes[shard].deliver(writes);
    }
}
