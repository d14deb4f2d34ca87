//! Reference CLI: feed file -> parser -> core -> formatter. A batch,
//! single-threaded replay driver for the book engine core; the core
//! itself never touches a file handle or a log queue.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use common::logging::Logger;
use common::{log_error, log_info};

use book_engine::formatter::{format_book, format_stats};
use book_engine::parser::parse_line;
use book_engine::OrderBook;

/// Replays a `<Type>,<payload>` order feed through the limit order book core.
#[derive(Parser, Debug)]
#[command(name = "book_engine")]
#[command(about = "Replays a line-oriented order feed through the limit order book core")]
struct Args {
    /// Path to the feed file, one message per line.
    feed: PathBuf,

    /// Print a book snapshot every N processed lines (0 disables periodic
    /// snapshots; a final snapshot always prints at EOF).
    #[arg(long, default_value_t = 10)]
    print_every: u64,

    /// Suppress periodic snapshots; only print the final book and stats.
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();
    let logger = Logger::new();

    let file = match File::open(&args.feed) {
        Ok(f) => f,
        Err(e) => {
            log_error!(logger, "failed to open feed file");
            eprintln!("error: failed to open {}: {}", args.feed.display(), e);
            std::process::exit(1);
        }
    };

    log_info!(logger, "replay starting");

    let mut book = OrderBook::new();
    let reader = BufReader::new(file);
    let mut processed: u64 = 0;

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => {
                book.stats_mut().record_corrupted();
                continue;
            }
        };

        if let Some(event) = parse_line(&line, book.stats_mut()) {
            book.apply(event);
        }

        processed += 1;
        if !args.quiet && args.print_every != 0 && processed % args.print_every == 0 {
            println!("{}", format_book(&book));
        }
    }

    println!("{}", format_book(&book));
    println!("{}", format_stats(&book));

    logger.flush();
    log_info!(logger, "replay finished");
}
