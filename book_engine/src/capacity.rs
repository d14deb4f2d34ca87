//! Pool sizing for the order and price-level arenas.
//!
//! A resting order's pool index never changes for its lifetime, and the
//! book never grows a collection on the hot path — both arenas are sized
//! up front. 8192 orders / 128 levels per side mirror the sizes used by
//! the order book this crate's behavior is grounded on.

pub const ORDER_POOL_CAPACITY: usize = 8192;
pub const LEVEL_POOL_CAPACITY: usize = 128;
