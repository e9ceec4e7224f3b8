//! Counting semaphore.
//!
//! - `acquire` takes one permit, blocking on a condition variable while none
//!   are available.
//! - `release` returns one permit and wakes a single waiter.

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    /// Creates a semaphore holding `permits` permits.
    ///
    /// ```
    /// use psinfo::sync::Semaphore;
    ///
    /// // pool of three resources
    /// let free = Semaphore::new(3);
    /// free.acquire();
    /// assert_eq!(free.available(), 2);
    /// free.release();
    /// ```
    pub fn new(permits: usize) -> Self {
        Semaphore {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Takes one permit, blocking until one is available.
    pub fn acquire(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            self.available.wait(&mut permits);
        }
        *permits -= 1;
    }

    /// Returns one permit and wakes one waiter, if any.
    pub fn release(&self) {
        let mut permits = self.permits.lock();
        *permits += 1;
        self.available.notify_one();
    }

    /// Current number of permits. Only a snapshot: other threads may change
    /// it immediately.
    pub fn available(&self) -> usize {
        *self.permits.lock()
    }
}
