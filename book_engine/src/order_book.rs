use std::collections::HashMap;

use crate::capacity::ORDER_POOL_CAPACITY;
use crate::event::Event;
use crate::order::Order;
use crate::price_book::PriceBook;
use crate::price_level::OrderArena;
use crate::stats::InvalidStats;
use common::mem_pool::MemPool;
use common::{OrderId, Price, Qty, Side};

/// Result of `OrderBook::add_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Accepted,
    DuplicateOrder,
}

/// Result of `OrderBook::amend_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmendOutcome {
    /// Qty-only change; mutated in place, FIFO position retained.
    QtyChanged,
    /// Side and/or price changed; the order lost time priority and now
    /// sits at the tail of its (possibly new) level.
    Repriced,
    /// No field differed from the resting order.
    Unchanged,
    UnknownOrder,
}

/// Result of `OrderBook::cancel_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    UnknownOrder,
}

/// Price-time priority order book for a single instrument.
///
/// The core never parses text and never rejects a field for being
/// non-positive or zero — by the time a caller reaches `add_order` or
/// `amend_order`, those checks already happened upstream (see
/// `parser::parse_line`). What the core itself polices is identity
/// (duplicate ids, unknown ids) and book-level consistency (crossed
/// top-of-book).
pub struct OrderBook {
    bids: PriceBook,
    asks: PriceBook,
    orders: Box<OrderArena>,
    order_index: HashMap<OrderId, usize>,
    stats: InvalidStats,
    last_trade: Option<(Price, Qty)>,
    next_seq: u64,
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            bids: PriceBook::new(Side::Bid),
            asks: PriceBook::new(Side::Ask),
            orders: MemPool::new_boxed(),
            order_index: HashMap::with_capacity(ORDER_POOL_CAPACITY),
            stats: InvalidStats::default(),
            last_trade: None,
            next_seq: 0,
        }
    }

    fn book(&self, side: Side) -> &PriceBook {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn book_mut(&mut self, side: Side) -> &mut PriceBook {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    pub fn bids(&self) -> &PriceBook {
        &self.bids
    }

    pub fn asks(&self) -> &PriceBook {
        &self.asks
    }

    pub fn orders(&self) -> &OrderArena {
        &self.orders
    }

    pub fn stats(&self) -> &InvalidStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut InvalidStats {
        &mut self.stats
    }

    pub fn last_trade(&self) -> Option<(Price, Qty)> {
        self.last_trade
    }

    /// True if the top bid is at or above the top ask. The core observes
    /// this and counts it; it never corrects it.
    pub fn is_cross(&self) -> bool {
        match (self.bids.top_price(), self.asks.top_price()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    /// Best price on `side`, or `None` if that side is empty.
    pub fn tob(&self, side: Side) -> Option<Price> {
        self.book(side).top_price()
    }

    /// Dispatches a typed event to the matching operation.
    pub fn apply(&mut self, event: Event) {
        match event {
            Event::Add { id, side, qty, price } => {
                self.add_order(id, side, qty, price);
            }
            Event::Modify { id, side, qty, price } => {
                self.amend_order(id, side, qty, price);
            }
            Event::Cancel { id } => {
                self.cancel_order(id);
            }
            Event::Trade { qty, price } => self.record_trade(qty, price),
        }
    }

    /// Adds a new resting order.
    pub fn add_order(&mut self, id: OrderId, side: Side, qty: Qty, price: Price) -> AddOutcome {
        if self.is_cross() {
            self.stats.record_crossed();
        }

        if self.order_index.contains_key(&id) {
            self.stats.record_duplicate_order();
            return AddOutcome::DuplicateOrder;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let order_idx = self
            .orders
            .construct(Order::new(id, side, qty, price, seq))
            .expect("order pool exhausted");

        self.order_index.insert(id, order_idx);
        self.book_mut(side).add_order(order_idx, price, qty, &self.orders);

        AddOutcome::Accepted
    }

    /// Amends a resting order. A change to side and/or price cancels the
    /// order from its current level and re-inserts it at the tail of its
    /// new level, losing time priority; the order keeps its arena slot
    /// throughout (its fields are mutated in place, never reallocated). A
    /// qty-only change adjusts the level total in place, keeping the
    /// order's FIFO position.
    pub fn amend_order(&mut self, id: OrderId, side: Side, qty: Qty, price: Price) -> AmendOutcome {
        if self.is_cross() {
            self.stats.record_crossed();
        }

        let Some(&order_idx) = self.order_index.get(&id) else {
            self.stats.record_unknown_mod();
            return AmendOutcome::UnknownOrder;
        };

        let (old_side, old_qty, old_price) = {
            let order = self.orders.get_by_index(order_idx).expect("order slot");
            (order.side, order.qty, order.price)
        };

        if side != old_side || price != old_price {
            let level_idx = self
                .orders
                .get_by_index(order_idx)
                .expect("order slot")
                .level
                .expect("resting order has a level");
            self.book_mut(old_side).cancel_order(level_idx, order_idx, old_qty, &self.orders);

            {
                let order = self.orders.get_by_index(order_idx).expect("order slot");
                order.side = side;
                order.qty = qty;
                order.price = price;
            }

            self.book_mut(side).add_order(order_idx, price, qty, &self.orders);
            AmendOutcome::Repriced
        } else if qty != old_qty {
            let level_idx = self
                .orders
                .get_by_index(order_idx)
                .expect("order slot")
                .level
                .expect("resting order has a level");
            self.book_mut(side).adjust_qty(level_idx, old_qty, qty);
            self.orders.get_by_index(order_idx).expect("order slot").qty = qty;
            AmendOutcome::QtyChanged
        } else {
            AmendOutcome::Unchanged
        }
    }

    /// Cancels a resting order, freeing its arena slot.
    pub fn cancel_order(&mut self, id: OrderId) -> CancelOutcome {
        let Some(order_idx) = self.order_index.remove(&id) else {
            self.stats.record_unknown_mod();
            return CancelOutcome::UnknownOrder;
        };

        let (side, qty, level_idx) = {
            let order = self.orders.get_by_index(order_idx).expect("order slot");
            (order.side, order.qty, order.level.expect("resting order has a level"))
        };

        self.book_mut(side).cancel_order(level_idx, order_idx, qty, &self.orders);
        unsafe { self.orders.destroy(order_idx) };

        CancelOutcome::Cancelled
    }

    /// Absorbs a trade print. Trades never touch resting orders; they
    /// only update the last-trade snapshot used for printing.
    pub fn record_trade(&mut self, qty: Qty, price: Price) {
        self.last_trade = Some(match self.last_trade {
            Some((last_price, last_qty)) if last_price == price => (price, last_qty + qty),
            _ => (price, qty),
        });
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(value: f64) -> Price {
        Price::from_f64(value).unwrap()
    }

    #[test]
    fn add_order_rests_and_sets_tob() {
        let mut book = OrderBook::new();
        assert_eq!(book.add_order(1, Side::Bid, 10, px(99.0)), AddOutcome::Accepted);
        assert_eq!(book.tob(Side::Bid), Some(px(99.0)));
        assert_eq!(book.tob(Side::Ask), None);
    }

    #[test]
    fn add_order_duplicate_id_is_rejected() {
        let mut book = OrderBook::new();
        book.add_order(1, Side::Bid, 10, px(99.0));
        assert_eq!(book.add_order(1, Side::Bid, 5, px(98.0)), AddOutcome::DuplicateOrder);
        assert_eq!(book.stats().num_duplicate_order(), 1);
        // original order untouched
        assert_eq!(book.tob(Side::Bid), Some(px(99.0)));
    }

    #[test]
    fn cancel_unknown_order_counts_unknown_mod() {
        let mut book = OrderBook::new();
        assert_eq!(book.cancel_order(42), CancelOutcome::UnknownOrder);
        assert_eq!(book.stats().num_unknown_mod(), 1);
    }

    #[test]
    fn cancel_known_order_frees_level() {
        let mut book = OrderBook::new();
        book.add_order(1, Side::Bid, 10, px(99.0));
        assert_eq!(book.cancel_order(1), CancelOutcome::Cancelled);
        assert_eq!(book.tob(Side::Bid), None);
    }

    #[test]
    fn amend_qty_only_preserves_fifo_position() {
        let mut book = OrderBook::new();
        book.add_order(1, Side::Bid, 10, px(99.0));
        book.add_order(2, Side::Bid, 5, px(99.0));

        let outcome = book.amend_order(1, Side::Bid, 20, px(99.0));
        assert_eq!(outcome, AmendOutcome::QtyChanged);

        let level = book.bids().levels_best_to_worst()[0];
        assert_eq!(level.total_qty(), 25);
        let orders = book.bids().orders_in_level(level, book.orders());
        assert_eq!(orders[0].id, 1, "order 1 should still be at the head");
        assert_eq!(orders[0].qty, 20);
    }

    #[test]
    fn amend_price_change_loses_time_priority() {
        let mut book = OrderBook::new();
        book.add_order(1, Side::Bid, 10, px(99.0));
        book.add_order(2, Side::Bid, 5, px(99.0));

        let outcome = book.amend_order(1, Side::Bid, 10, px(98.0));
        assert_eq!(outcome, AmendOutcome::Repriced);

        let levels = book.bids().levels_best_to_worst();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].price(), px(99.0));
        let remaining = book.bids().orders_in_level(levels[0], book.orders());
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, 2);
    }

    #[test]
    fn amend_side_change_moves_order_to_other_book() {
        let mut book = OrderBook::new();
        book.add_order(1, Side::Bid, 10, px(99.0));

        let outcome = book.amend_order(1, Side::Ask, 10, px(101.0));
        assert_eq!(outcome, AmendOutcome::Repriced);
        assert!(book.bids().is_empty());
        assert_eq!(book.tob(Side::Ask), Some(px(101.0)));
    }

    #[test]
    fn amend_unknown_order_counts_unknown_mod() {
        let mut book = OrderBook::new();
        assert_eq!(book.amend_order(7, Side::Bid, 10, px(99.0)), AmendOutcome::UnknownOrder);
        assert_eq!(book.stats().num_unknown_mod(), 1);
    }

    #[test]
    fn amend_identical_fields_is_a_no_op() {
        let mut book = OrderBook::new();
        book.add_order(1, Side::Bid, 10, px(99.0));
        assert_eq!(book.amend_order(1, Side::Bid, 10, px(99.0)), AmendOutcome::Unchanged);
    }

    #[test]
    fn is_cross_detects_crossed_top_of_book() {
        let mut book = OrderBook::new();
        book.add_order(1, Side::Bid, 10, px(100.0));
        assert!(!book.is_cross());
        book.add_order(2, Side::Ask, 10, px(100.0));
        assert!(book.is_cross());
    }

    #[test]
    fn add_order_on_crossed_book_counts_but_still_rests() {
        let mut book = OrderBook::new();
        book.add_order(1, Side::Ask, 10, px(100.0));
        book.add_order(2, Side::Bid, 10, px(101.0));
        assert_eq!(book.stats().num_crossed(), 1);
        assert_eq!(book.tob(Side::Bid), Some(px(101.0)));
        assert_eq!(book.tob(Side::Ask), Some(px(100.0)));
    }

    #[test]
    fn record_trade_aggregates_same_price_prints() {
        let mut book = OrderBook::new();
        book.record_trade(10, px(100.0));
        book.record_trade(5, px(100.0));
        assert_eq!(book.last_trade(), Some((px(100.0), 15)));

        book.record_trade(3, px(101.0));
        assert_eq!(book.last_trade(), Some((px(101.0), 3)));
    }

    #[test]
    fn unknown_trade_counter_stays_dead() {
        let book = OrderBook::new();
        assert_eq!(book.stats().num_unknown_trade(), 0);
    }
}
