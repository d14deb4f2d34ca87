use std::collections::HashMap;

use crate::capacity::LEVEL_POOL_CAPACITY;
use crate::intrusive::{self, LinkStore};
use crate::order::Order;
use crate::price_level::{OrderArena, PriceLevel};
use common::mem_pool::MemPool;
use common::{Price, Qty, Side};

pub(crate) type LevelArena = MemPool<PriceLevel, LEVEL_POOL_CAPACITY>;

/// Gives the intrusive-list helpers access to a level's list links.
struct LevelLinks<'a>(&'a LevelArena);

impl<'a> LinkStore for LevelLinks<'a> {
    fn prev(&self, idx: usize) -> Option<usize> {
        self.0.get_by_index(idx).expect("level slot").list_prev
    }
    fn next(&self, idx: usize) -> Option<usize> {
        self.0.get_by_index(idx).expect("level slot").list_next
    }
    fn set_prev(&self, idx: usize, value: Option<usize>) {
        self.0.get_by_index(idx).expect("level slot").list_prev = value;
    }
    fn set_next(&self, idx: usize, value: Option<usize>) {
        self.0.get_by_index(idx).expect("level slot").list_next = value;
    }
}

/// One side (bid or ask) of the book: a price-ordered list of levels plus
/// a price-to-level index for O(1) same-price insertion.
pub struct PriceBook {
    side: Side,
    levels: Box<LevelArena>,
    by_price: HashMap<Price, usize>,
    top: Option<usize>,
    last: Option<usize>,
}

impl PriceBook {
    pub(crate) fn new(side: Side) -> Self {
        Self {
            side,
            levels: MemPool::new_boxed(),
            by_price: HashMap::new(),
            top: None,
            last: None,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Best price on this side, or `None` if the side is empty.
    pub fn top_price(&self) -> Option<Price> {
        self.top
            .map(|idx| self.levels.get_by_index(idx).expect("level slot").price())
    }

    /// Levels ordered from best to worst, for printing and iteration.
    pub fn levels_best_to_worst(&self) -> Vec<&PriceLevel> {
        let mut out = Vec::new();
        let mut cur = self.top;
        while let Some(idx) = cur {
            let level = self.levels.get_by_index(idx).expect("level slot");
            cur = level.list_next;
            out.push(&*level);
        }
        out
    }

    /// Orders at `level`, in arrival (FIFO) order.
    pub fn orders_in_level<'a>(&'a self, level: &PriceLevel, orders: &'a OrderArena) -> Vec<&'a Order> {
        let mut out = Vec::new();
        let mut cur = level.head;
        while let Some(idx) = cur {
            let order = orders.get_by_index(idx).expect("order slot");
            cur = order.next;
            out.push(&*order);
        }
        out
    }

    /// Links `order_idx` into the level for `price`, creating that level
    /// if this is its first resting order.
    pub(crate) fn add_order(&mut self, order_idx: usize, price: Price, qty: Qty, orders: &OrderArena) {
        let level_idx = self.level_for_price(price);
        let level = self.levels.get_by_index(level_idx).expect("level slot");
        level.add_order(level_idx, order_idx, qty, orders);
    }

    /// Finds (or creates) the level for `price`, preserving price
    /// ordering within the side.
    fn level_for_price(&mut self, price: Price) -> usize {
        if let Some(&idx) = self.by_price.get(&price) {
            return idx;
        }

        let new_idx = self
            .levels
            .construct(PriceLevel::new(price))
            .expect("price level pool exhausted");

        match self.find_successor(price) {
            Some(succ_idx) => {
                intrusive::insert_before(&LevelLinks(&self.levels), succ_idx, new_idx);
                if self.top == Some(succ_idx) {
                    self.top = Some(new_idx);
                }
            }
            None => match self.last {
                Some(last_idx) => {
                    intrusive::insert_after(&LevelLinks(&self.levels), last_idx, new_idx);
                    self.last = Some(new_idx);
                }
                None => {
                    self.top = Some(new_idx);
                    self.last = Some(new_idx);
                }
            },
        }

        self.by_price.insert(price, new_idx);
        new_idx
    }

    /// Scans from the top for the first existing level worse than
    /// `price` on this side — the level the new one must land before.
    fn find_successor(&self, price: Price) -> Option<usize> {
        let mut cur = self.top;
        while let Some(idx) = cur {
            let level = self.levels.get_by_index(idx).expect("level slot");
            let worse = match self.side {
                Side::Bid => level.price() < price,
                Side::Ask => level.price() > price,
            };
            if worse {
                return Some(idx);
            }
            cur = level.list_next;
        }
        None
    }

    /// Unlinks `order_idx` from `level_idx`'s FIFO, freeing the level if
    /// it is now empty.
    pub(crate) fn cancel_order(&mut self, level_idx: usize, order_idx: usize, qty: Qty, orders: &OrderArena) {
        let now_empty = {
            let level = self.levels.get_by_index(level_idx).expect("level slot");
            level.cancel_order(order_idx, qty, orders);
            level.is_empty()
        };

        if now_empty {
            let price = self.levels.get_by_index(level_idx).expect("level slot").price();
            let (prev, next) = intrusive::detach(&LevelLinks(&self.levels), level_idx);
            if self.top == Some(level_idx) {
                self.top = next;
            }
            if self.last == Some(level_idx) {
                self.last = prev;
            }
            self.by_price.remove(&price);
            unsafe { self.levels.destroy(level_idx) };
        }
    }

    /// Adjusts a level's aggregate quantity for a qty-only amend,
    /// without touching FIFO position.
    pub(crate) fn adjust_qty(&mut self, level_idx: usize, old_qty: Qty, new_qty: Qty) {
        let level = self.levels.get_by_index(level_idx).expect("level slot");
        level.total_qty = level.total_qty + new_qty - old_qty;
    }
}
