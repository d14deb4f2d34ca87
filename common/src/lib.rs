//! Shared low-level primitives for the book engine workspace.
//!
//! Nothing in this crate knows what an order book is: it supplies the
//! fixed-point price type, the pool allocator, and the lock-free logging
//! stack that `book_engine` builds on.

pub mod lf_queue;
pub mod logging;
pub mod mem_pool;
pub mod time;
pub mod types;

pub use types::{Price, Qty, Side, OrderId, INVALID_ORDER_ID};
