// Core type definitions shared by the book engine

use std::fmt;

/// Unique, non-zero order identifier. Zero is reserved as "no id" and is
/// rejected by the core as a structurally invalid field.
pub type OrderId = u32;

/// Resting quantity. Zero is rejected as structurally invalid.
pub type Qty = u32;

/// Sentinel for "no id", never assigned to a resting order.
pub const INVALID_ORDER_ID: OrderId = 0;

/// Side of a resting order or incoming event.
#[repr(i8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Bid = 1,
    Ask = -1,
}

impl Side {
    /// Returns the opposite side
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }

    /// Returns the side as a sign value (1 for Bid, -1 for Ask)
    #[inline]
    pub fn as_sign(self) -> i64 {
        self as i64
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Bid => "B",
            Side::Ask => "S",
        })
    }
}

/// Number of ticks per unit of price. Prices are parsed as decimal
/// literals and immediately quantized to this fixed-point scale so that
/// they can be used as exact hash-map keys and compared without float
/// epsilon handling — see `spec.md` §9, "Floating-point keys".
pub const PRICE_SCALE: i64 = 100_000;

/// A price, stored as an integer number of ticks (`PRICE_SCALE` ticks per
/// unit). Two prices parsed from the same decimal literal always compare
/// equal; two prices that are arithmetically close but not identical
/// after rounding to the tick scale compare unequal, same as the source
/// system's raw double-precision keys did for input drawn from parsed
/// literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

impl Price {
    /// Constructs a price directly from a tick count. Used internally and
    /// in tests; prefer `from_f64` for values coming off the wire.
    #[inline]
    pub const fn from_ticks(ticks: i64) -> Self {
        Price(ticks)
    }

    #[inline]
    pub const fn ticks(self) -> i64 {
        self.0
    }

    /// Quantizes a parsed decimal literal to the tick scale. Returns
    /// `None` for non-finite input or input that overflows the tick
    /// range, both of which the parser treats as a corrupted field.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = value * PRICE_SCALE as f64;
        if scaled < i64::MIN as f64 || scaled > i64::MAX as f64 {
            return None;
        }
        Some(Price(scaled.round() as i64))
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / PRICE_SCALE as f64
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Arithmetic mean of two prices, per `spec.md`'s mid-quote definition.
    pub fn mid(a: Price, b: Price) -> f64 {
        (a.as_f64() + b.as_f64()) / 2.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", PRICE_SCALE.ilog10() as usize, self.as_f64())
    }
}
