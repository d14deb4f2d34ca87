use common::{OrderId, Price, Qty, Side};

/// The core's sole input contract: whatever feeds `OrderBook` only ever
/// produces one of these already-validated variants, never a raw line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Add { id: OrderId, side: Side, qty: Qty, price: Price },
    Modify { id: OrderId, side: Side, qty: Qty, price: Price },
    Cancel { id: OrderId },
    Trade { qty: Qty, price: Price },
}
