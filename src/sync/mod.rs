//! Synchronisation primitives shared by the workers and the reporter.

mod semaphore;
mod slot_pool;

pub use semaphore::Semaphore;
pub use slot_pool::{Consumer, PoolStats, SlotPool};
