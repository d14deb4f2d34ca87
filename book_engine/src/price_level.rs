use crate::capacity::ORDER_POOL_CAPACITY;
use crate::intrusive::{self, LinkStore};
use crate::order::Order;
use common::mem_pool::MemPool;
use common::{Price, Qty};

pub(crate) type OrderArena = MemPool<Order, ORDER_POOL_CAPACITY>;

/// Gives the intrusive-list helpers access to an order's FIFO links.
struct OrderLinks<'a>(&'a OrderArena);

impl<'a> LinkStore for OrderLinks<'a> {
    fn prev(&self, idx: usize) -> Option<usize> {
        self.0.get_by_index(idx).expect("order slot").prev
    }
    fn next(&self, idx: usize) -> Option<usize> {
        self.0.get_by_index(idx).expect("order slot").next
    }
    fn set_prev(&self, idx: usize, value: Option<usize>) {
        self.0.get_by_index(idx).expect("order slot").prev = value;
    }
    fn set_next(&self, idx: usize, value: Option<usize>) {
        self.0.get_by_index(idx).expect("order slot").next = value;
    }
}

/// One price on one side: a FIFO of resting orders plus their aggregate
/// quantity. Participates in its side's price-ordered level list via
/// `list_prev`/`list_next`.
pub struct PriceLevel {
    pub(crate) price: Price,
    pub(crate) total_qty: Qty,
    pub(crate) head: Option<usize>,
    pub(crate) tail: Option<usize>,
    pub(crate) order_count: usize,
    pub(crate) list_prev: Option<usize>,
    pub(crate) list_next: Option<usize>,
}

impl PriceLevel {
    pub(crate) fn new(price: Price) -> Self {
        Self {
            price,
            total_qty: 0,
            head: None,
            tail: None,
            order_count: 0,
            list_prev: None,
            list_next: None,
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn total_qty(&self) -> Qty {
        self.total_qty
    }

    pub fn order_count(&self) -> usize {
        self.order_count
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Appends `order_idx` to the FIFO tail and records this level as
    /// `order_idx`'s resting location.
    pub(crate) fn add_order(&mut self, level_idx: usize, order_idx: usize, qty: Qty, orders: &OrderArena) {
        orders.get_by_index(order_idx).expect("order slot").level = Some(level_idx);

        match self.tail {
            Some(tail_idx) => {
                intrusive::insert_after(&OrderLinks(orders), tail_idx, order_idx);
                self.tail = Some(order_idx);
            }
            None => {
                self.head = Some(order_idx);
                self.tail = Some(order_idx);
            }
        }
        self.total_qty += qty;
        self.order_count += 1;
    }

    /// Removes `order_idx` from the FIFO. Precondition: `order_idx` is
    /// currently resident in this level's FIFO.
    pub(crate) fn cancel_order(&mut self, order_idx: usize, qty: Qty, orders: &OrderArena) {
        let (prev, next) = intrusive::detach(&OrderLinks(orders), order_idx);
        orders.get_by_index(order_idx).expect("order slot").level = None;

        if self.head == Some(order_idx) {
            self.head = next;
        }
        if self.tail == Some(order_idx) {
            self.tail = prev;
        }
        self.total_qty -= qty;
        self.order_count -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Side;

    fn arena() -> Box<OrderArena> {
        MemPool::new_boxed()
    }

    fn push_order(arena: &OrderArena, id: u32, qty: Qty, price: Price) -> usize {
        arena.construct(Order::new(id, Side::Bid, qty, price, id as u64)).unwrap()
    }

    #[test]
    fn fifo_order_preserved_across_adds() {
        let arena = arena();
        let price = Price::from_f64(10.0).unwrap();
        let mut level = PriceLevel::new(price);
        let level_idx = 0;

        let a = push_order(&arena, 1, 5, price);
        let b = push_order(&arena, 2, 7, price);
        let c = push_order(&arena, 3, 3, price);

        level.add_order(level_idx, a, 5, &arena);
        level.add_order(level_idx, b, 7, &arena);
        level.add_order(level_idx, c, 3, &arena);

        assert_eq!(level.total_qty(), 15);
        assert_eq!(level.order_count(), 3);
        assert_eq!(level.head, Some(a));
        assert_eq!(level.tail, Some(c));
        assert_eq!(arena.get_by_index(a).unwrap().next, Some(b));
        assert_eq!(arena.get_by_index(c).unwrap().prev, Some(b));
        assert_eq!(arena.get_by_index(b).unwrap().level, Some(level_idx));
    }

    #[test]
    fn cancel_middle_preserves_fifo() {
        let arena = arena();
        let price = Price::from_f64(10.0).unwrap();
        let mut level = PriceLevel::new(price);
        let a = push_order(&arena, 1, 5, price);
        let b = push_order(&arena, 2, 7, price);
        let c = push_order(&arena, 3, 3, price);
        level.add_order(0, a, 5, &arena);
        level.add_order(0, b, 7, &arena);
        level.add_order(0, c, 3, &arena);

        level.cancel_order(b, 7, &arena);

        assert_eq!(level.total_qty(), 8);
        assert_eq!(level.order_count(), 2);
        assert_eq!(arena.get_by_index(a).unwrap().next, Some(c));
        assert_eq!(arena.get_by_index(c).unwrap().prev, Some(a));
        assert!(arena.get_by_index(b).unwrap().level.is_none());
    }

    #[test]
    fn cancel_last_order_empties_level() {
        let arena = arena();
        let price = Price::from_f64(10.0).unwrap();
        let mut level = PriceLevel::new(price);
        let a = push_order(&arena, 1, 5, price);
        level.add_order(0, a, 5, &arena);
        level.cancel_order(a, 5, &arena);

        assert!(level.is_empty());
        assert_eq!(level.total_qty(), 0);
        assert_eq!(level.order_count(), 0);
    }
}
