use common::{OrderId, Price, Qty, Side};

/// A single resting order, housed in `OrderBook`'s order arena.
///
/// `prev`/`next` link the order into its price level's FIFO; `level` is
/// a non-owning back-reference to that level (an index into the book's
/// level arena for the order's side), set only while the order is
/// resting.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub qty: Qty,
    pub price: Price,
    /// Monotonic arrival sequence assigned once at `add_order`, never
    /// reassigned by an amend. Exists for diagnostics only — FIFO
    /// position is the linked-list order, not this number.
    pub seq: u64,

    pub(crate) level: Option<usize>,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
}

impl Order {
    pub(crate) fn new(id: OrderId, side: Side, qty: Qty, price: Price, seq: u64) -> Self {
        Self {
            id,
            side,
            qty,
            price,
            seq,
            level: None,
            prev: None,
            next: None,
        }
    }
}
