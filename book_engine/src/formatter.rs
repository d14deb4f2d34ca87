//! Reference output formatter. Not part of the core: the core only
//! exposes query primitives (`PriceBook::levels_best_to_worst`,
//! `OrderBook::tob`, `OrderBook::last_trade`); textual layout lives here
//! alone. Ask levels print worst-to-best so the best ask sits nearest
//! the mid-quote line, then bid levels print best-to-worst.

use std::fmt::Write;

use common::Side;

use crate::order_book::OrderBook;

pub fn format_book(book: &OrderBook) -> String {
    let mut out = String::new();

    writeln!(out, "*** ask ***").unwrap();
    format_side(&mut out, book, Side::Ask);

    match (book.tob(Side::Bid), book.tob(Side::Ask)) {
        (Some(bid), Some(ask)) => {
            writeln!(out, "========{:.5}========", common::Price::mid(bid, ask)).unwrap();
        }
        _ => {
            writeln!(out, "======== * ========").unwrap();
        }
    }

    format_side(&mut out, book, Side::Bid);
    writeln!(out, "*** bid ***").unwrap();

    match book.last_trade() {
        Some((price, qty)) => writeln!(out, "*** Last trade -> {} @ {}", qty, price).unwrap(),
        None => writeln!(out, "*** Last trade -> (none)").unwrap(),
    }

    out
}

fn format_side(out: &mut String, book: &OrderBook, side: Side) {
    let price_book = match side {
        Side::Bid => book.bids(),
        Side::Ask => book.asks(),
    };

    if price_book.is_empty() {
        writeln!(out, "* EMPTY *").unwrap();
        return;
    }

    let levels = price_book.levels_best_to_worst();
    let ordered: Vec<_> = match side {
        Side::Bid => levels,
        Side::Ask => levels.into_iter().rev().collect(),
    };

    for level in ordered {
        write!(out, "{} @ {} - [", level.total_qty(), level.price()).unwrap();
        let orders = price_book.orders_in_level(level, book.orders());
        for (i, order) in orders.iter().enumerate() {
            if i > 0 {
                write!(out, ",").unwrap();
            }
            write!(out, "({},{})", order.id, order.qty).unwrap();
        }
        writeln!(out, "]").unwrap();
    }
}

/// Formats the final stats line enumerating all six counters.
pub fn format_stats(book: &OrderBook) -> String {
    let stats = book.stats();
    format!(
        "Corrupted Msg : {} Duplicate Order Id : {} Unknown Trade : {} Unknown order modify or cancel : {} Top of book crossed : {} Invalid Negative Msg Field : {}",
        stats.num_corrupted_msg(),
        stats.num_duplicate_order(),
        stats.num_unknown_trade(),
        stats.num_unknown_mod(),
        stats.num_crossed(),
        stats.num_invalid_neg(),
    )
}
