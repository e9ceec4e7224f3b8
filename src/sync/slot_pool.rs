//! Bounded buffer shared by many producers and a single consumer.
//!
//! The pool has `N` slots addressed cyclically by a monotonically increasing
//! write cursor. Two counting semaphores carry the protocol:
//!
//! ```text
//!   producer                                consumer
//!   --------                                --------
//!   free.acquire()        (pool full?)      filled.acquire()      (anything published?)
//!   lock write_cursor                       take slots[read % N]
//!     slots[cursor % N] = item              read += 1
//!     cursor += 1                           free.release()        (slot reusable)
//!   unlock
//!   filled.release()      (item ready)
//! ```
//!
//! At most `N` items are ever published and not yet consumed. The consumer
//! drains slots in strict cyclic order `0, 1, .., N-1, 0, ..`, so items come
//! out in the order producers passed through the cursor lock, whichever
//! producer that was.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use super::Semaphore;
use crate::error::PoolError;

pub struct SlotPool<T> {
    slots: Box<[Mutex<Option<T>>]>,
    write_cursor: Mutex<usize>,
    free: Semaphore,
    filled: Semaphore,
    consumer_claimed: AtomicBool,
    published: AtomicUsize,
    consumed: AtomicUsize,
    outstanding: AtomicUsize,
    high_water: AtomicUsize,
}

/// Counters describing a pool's traffic so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub capacity: usize,
    pub published: usize,
    pub consumed: usize,
    /// Items published but not yet consumed.
    pub outstanding: usize,
    /// Largest `outstanding` ever observed. Never exceeds `capacity`.
    pub high_water: usize,
    /// Permits left on the free semaphore.
    pub free_slots: usize,
}

impl<T> SlotPool<T> {
    /// Creates a pool with `capacity` empty slots.
    pub fn new(capacity: usize) -> Result<Self, PoolError> {
        if capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|source| PoolError::Allocation { capacity, source })?;
        slots.extend((0..capacity).map(|_| Mutex::new(None)));

        Ok(SlotPool {
            slots: slots.into_boxed_slice(),
            write_cursor: Mutex::new(0),
            free: Semaphore::new(capacity),
            filled: Semaphore::new(0),
            consumer_claimed: AtomicBool::new(false),
            published: AtomicUsize::new(0),
            consumed: AtomicUsize::new(0),
            outstanding: AtomicUsize::new(0),
            high_water: AtomicUsize::new(0),
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Publishes `item`, blocking while the pool is full. Returns the slot
    /// index it was written to.
    pub fn publish(&self, item: T) -> usize {
        self.free.acquire();

        let index = {
            let mut cursor = self.write_cursor.lock();
            let index = *cursor % self.capacity();
            let previous = self.slots[index].lock().replace(item);
            debug_assert!(previous.is_none(), "slot {index} overwritten before it was consumed");
            *cursor += 1;

            let outstanding = self.outstanding.fetch_add(1, Ordering::AcqRel) + 1;
            self.high_water.fetch_max(outstanding, Ordering::AcqRel);
            self.published.fetch_add(1, Ordering::AcqRel);
            index
        };
        trace!(slot = index, "published");

        self.filled.release();
        index
    }

    /// Claims the pool's only consumer handle.
    pub fn consumer(&self) -> Result<Consumer<'_, T>, PoolError> {
        if self.consumer_claimed.swap(true, Ordering::AcqRel) {
            return Err(PoolError::ConsumerClaimed);
        }
        Ok(Consumer {
            pool: self,
            read_cursor: 0,
        })
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.capacity(),
            published: self.published.load(Ordering::Acquire),
            consumed: self.consumed.load(Ordering::Acquire),
            outstanding: self.outstanding.load(Ordering::Acquire),
            high_water: self.high_water.load(Ordering::Acquire),
            free_slots: self.free.available(),
        }
    }
}

/// The single reader of a [`SlotPool`]. Owns the read cursor.
pub struct Consumer<'a, T> {
    pool: &'a SlotPool<T>,
    read_cursor: usize,
}

impl<T> Consumer<'_, T> {
    /// Takes the next item in slot order, blocking until one is published.
    pub fn consume(&mut self) -> T {
        let pool = self.pool;
        pool.filled.acquire();

        let index = self.next_slot();
        let item = pool.slots[index].lock().take();
        self.read_cursor += 1;
        pool.outstanding.fetch_sub(1, Ordering::AcqRel);
        pool.consumed.fetch_add(1, Ordering::AcqRel);
        trace!(slot = index, "consumed");

        pool.free.release();

        // A filled permit is only released after the slot is written, and a
        // slot is only rewritten after its free permit comes back from here.
        item.unwrap_or_else(|| unreachable!("filled slot {index} was empty"))
    }

    /// Slot the next `consume` will read.
    pub fn next_slot(&self) -> usize {
        self.read_cursor % self.pool.capacity()
    }
}
