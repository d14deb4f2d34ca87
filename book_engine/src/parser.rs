//! Reference line parser. Not part of the core — the core only ever
//! consumes `Event` values (`event::Event`); this module exists so the
//! crate can replay a feed end to end. Field order and error
//! attribution follow the reference grammar: `<id>,<side>,<qty>,<price>`
//! for Add/Modify/Cancel, `<qty>,<price>` for Trade, with fields checked
//! left to right (id, then side, then qty, then price) so the first bad
//! field determines which counter a malformed line hits.

use common::{OrderId, Price, Qty, Side};

use crate::event::Event;
use crate::stats::InvalidStats;

/// Parses one feed line into an `Event`, or `None` if the line was
/// dropped as structurally invalid or invalid-negative (both already
/// tallied on `stats` before returning).
pub fn parse_line(line: &str, stats: &mut InvalidStats) -> Option<Event> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut fields = line.splitn(2, ',');
    let type_char = fields.next().unwrap_or("");
    let rest = fields.next();

    let Some(rest) = rest else {
        stats.record_corrupted();
        return None;
    };

    match type_char {
        "A" => parse_order_fields(rest, stats)
            .map(|(id, side, qty, price)| Event::Add { id, side, qty, price }),
        "M" => parse_order_fields(rest, stats)
            .map(|(id, side, qty, price)| Event::Modify { id, side, qty, price }),
        "X" => parse_order_fields(rest, stats).map(|(id, _, _, _)| Event::Cancel { id }),
        "T" => parse_trade_fields(rest, stats).map(|(qty, price)| Event::Trade { qty, price }),
        _ => {
            stats.record_corrupted();
            None
        }
    }
}

fn parse_side(s: &str) -> Option<Side> {
    match s {
        "B" => Some(Side::Bid),
        "S" => Some(Side::Ask),
        _ => None,
    }
}

/// Shared by Add, Modify and Cancel: `<id>,<side>,<qty>,<price>`. Cancel
/// carries the full payload on the wire even though only `id` ends up
/// used — the sender doesn't know which fields a reader needs.
fn parse_order_fields(rest: &str, stats: &mut InvalidStats) -> Option<(OrderId, Side, Qty, Price)> {
    let mut parts = rest.split(',');

    let id = match parts.next().and_then(|s| s.parse::<OrderId>().ok()) {
        Some(id) if id != 0 => id,
        _ => {
            stats.record_corrupted();
            return None;
        }
    };

    let side = match parts.next().and_then(parse_side) {
        Some(side) => side,
        None => {
            stats.record_corrupted();
            return None;
        }
    };

    let qty = match parts.next().and_then(|s| s.parse::<Qty>().ok()) {
        Some(qty) if qty != 0 => qty,
        _ => {
            stats.record_corrupted();
            return None;
        }
    };

    let price_field = parts.next();
    if parts.next().is_some() {
        stats.record_corrupted();
        return None;
    }

    let price = match price_field.and_then(|s| s.parse::<f64>().ok()).and_then(Price::from_f64) {
        Some(price) => price,
        None => {
            stats.record_corrupted();
            return None;
        }
    };

    if !price.is_positive() {
        stats.record_invalid_neg();
        return None;
    }

    Some((id, side, qty, price))
}

/// `<qty>,<price>`.
fn parse_trade_fields(rest: &str, stats: &mut InvalidStats) -> Option<(Qty, Price)> {
    let mut parts = rest.split(',');

    let qty = match parts.next().and_then(|s| s.parse::<Qty>().ok()) {
        Some(qty) => qty,
        None => {
            stats.record_corrupted();
            return None;
        }
    };

    let price_field = parts.next();
    if parts.next().is_some() {
        stats.record_corrupted();
        return None;
    }

    let price = match price_field.and_then(|s| s.parse::<f64>().ok()).and_then(Price::from_f64) {
        Some(price) => price,
        None => {
            stats.record_corrupted();
            return None;
        }
    };

    if !price.is_positive() {
        stats.record_invalid_neg();
        return None;
    }

    Some((qty, price))
}
