//! The store: identifier-to-stack mapping, capacity enforcement, and the
//! expiry sweep.
//!
//! Locking is two-level. A store-wide `RwLock` over the map serializes
//! structural changes (`create`, `destroy`, sweep); each entry carries its
//! own `Mutex` so value operations on different stacks run in parallel.
//! Lookups clone the entry `Arc` under the read lock and release it before
//! locking the entry, so the map lock is never held across an entry-lock
//! wait.

use std::sync::{
    Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError,
};
use std::time::Instant;

use indexmap::IndexMap;

use crate::entry::StackEntry;
use crate::error::StoreError;
use crate::id::StackId;
use crate::limits::Limits;

/// Per-stack line of a [`StoreSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackSummary {
    /// Current element count.
    pub size: usize,
    /// Configured element capacity.
    pub capacity: usize,
    /// `size / capacity`, as a percentage rounded to the nearest integer.
    pub percent_full: u32,
}

/// Snapshot of the whole store produced by [`StackStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSummary {
    /// Number of live stacks.
    pub used: usize,
    /// Configured ceiling on live stacks.
    pub capacity: usize,
    /// One line per stack, in creation order.
    pub stacks: Vec<StackSummary>,
}

/// Thread-safe collection of capacity-bounded integer stacks.
///
/// Every public operation first sweeps expired entries, so an idle stack is
/// reclaimed the next time anything at all happens to the store. Operations
/// that address a stack by id push its expiry out by the configured TTL as
/// soon as the stack is resolved, whether or not the operation itself then
/// succeeds; `list` addresses no stack and refreshes nothing.
#[derive(Debug, Default)]
pub struct StackStore {
    entries: RwLock<IndexMap<StackId, Arc<Mutex<StackEntry>>>>,
    limits: Limits,
}

impl StackStore {
    /// Creates an empty store with the production limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with custom limits. Intended for tests.
    #[must_use]
    pub fn with_limits(limits: Limits) -> Self {
        Self { entries: RwLock::new(IndexMap::new()), limits }
    }

    /// The limits this store enforces.
    #[must_use]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Creates a new empty stack and returns its identifier.
    ///
    /// # Errors
    /// [`StoreError::TooManyStacks`] if the store is at its stack-count
    /// ceiling.
    pub fn create(&self) -> Result<StackId, StoreError> {
        let now = Instant::now();
        self.sweep(now);

        let mut entries = self.write_entries();
        if entries.len() >= self.limits.max_stacks {
            return Err(StoreError::TooManyStacks(self.limits.max_stacks));
        }
        // Collisions are not checked: 2^64 ids against at most
        // `max_stacks` live entries. A collision would overwrite.
        let id = StackId::random();
        entries.insert(id, Arc::new(Mutex::new(StackEntry::new(id, now + self.limits.ttl))));
        tracing::info!(id = %id, live = entries.len(), "stack created");
        Ok(id)
    }

    /// Appends `value` to the stack.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] for an unknown id,
    /// [`StoreError::StackOverflow`] if the stack is full.
    pub fn push(&self, id: StackId, value: i64) -> Result<(), StoreError> {
        let cap = self.limits.max_stack_size;
        self.with_entry(id, |entry| entry.push(value, cap))
    }

    /// Appends a batch of values in input order.
    ///
    /// Not atomic: see [`StackEntry::push_bulk`] for the committed-prefix
    /// semantics on overflow.
    ///
    /// # Errors
    /// [`StoreError::NotFound`], [`StoreError::MissingValues`], or
    /// [`StoreError::StackOverflow`] (batch partially applied).
    pub fn push_bulk(&self, id: StackId, values: &[i64]) -> Result<(), StoreError> {
        let cap = self.limits.max_stack_size;
        self.with_entry(id, |entry| entry.push_bulk(values, cap))
    }

    /// Removes and returns the top element.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] or [`StoreError::Underflow`].
    pub fn pop(&self, id: StackId) -> Result<i64, StoreError> {
        self.with_entry(id, StackEntry::pop)
    }

    /// Removes exactly `count` elements, returned top first. Atomic.
    ///
    /// # Errors
    /// [`StoreError::NotFound`], or [`StoreError::Underflow`] if fewer
    /// than `count` elements are present (stack unchanged).
    pub fn pop_bulk(&self, id: StackId, count: usize) -> Result<Vec<i64>, StoreError> {
        self.with_entry(id, |entry| entry.pop_bulk(count))
    }

    /// Returns the top element without removing it.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] or [`StoreError::Empty`].
    pub fn peek(&self, id: StackId) -> Result<i64, StoreError> {
        self.with_entry(id, |entry| entry.peek())
    }

    /// Returns the element count. Read-only, but still counts as activity
    /// and refreshes the stack's TTL.
    ///
    /// # Errors
    /// [`StoreError::NotFound`].
    pub fn size(&self, id: StackId) -> Result<usize, StoreError> {
        self.with_entry(id, |entry| Ok(entry.len()))
    }

    /// Removes the stack entirely.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the id is unknown — including a second
    /// destroy of the same id.
    pub fn destroy(&self, id: StackId) -> Result<(), StoreError> {
        self.sweep(Instant::now());
        match self.write_entries().shift_remove(&id) {
            Some(_) => {
                tracing::info!(id = %id, "stack destroyed");
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    /// Summarizes every live stack, in creation order.
    ///
    /// Does not refresh any stack's TTL: enumeration addresses no stack
    /// by id.
    #[must_use]
    pub fn list(&self) -> StoreSummary {
        self.sweep(Instant::now());
        let entries = self.read_entries();
        let stacks = entries
            .values()
            .map(|entry| {
                let size = lock_entry(entry).len();
                StackSummary {
                    size,
                    capacity: self.limits.max_stack_size,
                    percent_full: percent(size, self.limits.max_stack_size),
                }
            })
            .collect();
        StoreSummary { used: entries.len(), capacity: self.limits.max_stacks, stacks }
    }

    /// Removes every entry whose deadline has passed.
    ///
    /// An entry whose lock cannot be acquired without blocking is skipped:
    /// it is mid-operation, and that operation will refresh its deadline.
    /// The deadline is re-read under the acquired lock for the same reason.
    pub fn sweep(&self, now: Instant) {
        let mut entries = self.write_entries();
        let before = entries.len();
        entries.retain(|_, entry| match entry.try_lock() {
            Ok(guard) => guard.deadline() >= now,
            Err(TryLockError::WouldBlock) => true,
            // A panic mid-operation leaves the entry unusable; reclaim it.
            Err(TryLockError::Poisoned(_)) => false,
        });
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, live = entries.len(), "expired stacks swept");
        }
    }

    /// Sweeps, resolves `id`, refreshes its deadline, and runs `op` under
    /// the entry lock.
    fn with_entry<T>(
        &self,
        id: StackId,
        op: impl FnOnce(&mut StackEntry) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let now = Instant::now();
        self.sweep(now);
        let entry = self.resolve(id)?;
        let mut guard = lock_entry(&entry);
        guard.touch(now + self.limits.ttl);
        op(&mut guard)
    }

    /// Clones the entry `Arc` out of the map, holding the read lock only
    /// for the lookup itself.
    fn resolve(&self, id: StackId) -> Result<Arc<Mutex<StackEntry>>, StoreError> {
        self.read_entries().get(&id).cloned().ok_or(StoreError::NotFound)
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, IndexMap<StackId, Arc<Mutex<StackEntry>>>> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.entries.read().expect("stack store read lock poisoned")
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, IndexMap<StackId, Arc<Mutex<StackEntry>>>> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.entries.write().expect("stack store write lock poisoned")
    }
}

fn lock_entry(entry: &Mutex<StackEntry>) -> MutexGuard<'_, StackEntry> {
    #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
    entry.lock().expect("stack entry lock poisoned")
}

fn percent(size: usize, capacity: usize) -> u32 {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        reason = "size <= capacity, so the ratio is in [0, 100]"
    )]
    let pct = (size as f64 / capacity as f64 * 100.0).round() as u32;
    pct
}
