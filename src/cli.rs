//! Shared helpers for the command-line binaries.

use crate::blockchain::{canonical, Block, TrackingEntry};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Color as TableColor;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed (e.g. by a test harness).
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub fn short_hash(hash: &str) -> String {
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() > 20 {
        let head: String = chars[..10].iter().collect();
        let tail: String = chars[chars.len() - 10..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        hash.to_string()
    }
}

/// One row per block: index, time, proof, links and the hand-offs it seals.
pub fn chain_table(blocks: &[Block]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
            Cell::new("Timestamp").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
            Cell::new("Proof").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
            Cell::new("Previous").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
            Cell::new("Hash").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
            Cell::new("Transactions").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
        ]);

    for block in blocks {
        let transactions = if block.transactions.is_empty() {
            "-".to_string()
        } else {
            block
                .transactions
                .iter()
                .map(|tx| format!("{} -> {}: {} [{}]", tx.sender, tx.recipient, tx.subject_id, tx.status))
                .collect::<Vec<_>>()
                .join("\n")
        };

        table.add_row(vec![
            Cell::new(block.index).fg(TableColor::Yellow),
            Cell::new(canonical::timestamp_string(&block.timestamp)),
            Cell::new(block.proof),
            Cell::new(short_hash(&block.previous_hash)),
            Cell::new(short_hash(&block.content_hash())).fg(TableColor::Green),
            Cell::new(transactions),
        ]);
    }
    table
}

pub fn history_table(entries: &[TrackingEntry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Block", "Recorded", "From", "To", "Status"]);

    for entry in entries {
        let block = match entry.block_index {
            Some(index) => Cell::new(index).fg(TableColor::Green),
            None => Cell::new("pending").fg(TableColor::Yellow),
        };
        table.add_row(vec![
            block,
            Cell::new(canonical::timestamp_string(&entry.transaction.created_at)),
            Cell::new(&entry.transaction.sender),
            Cell::new(&entry.transaction.recipient),
            Cell::new(&entry.transaction.status),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::Ledger;

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash("1"), "1");
        let long = "a".repeat(64);
        assert_eq!(short_hash(&long), format!("{}...{}", "a".repeat(10), "a".repeat(10)));

        let wide = format!("a{}", "é".repeat(21));
        assert_eq!(short_hash(&wide), format!("a{}...{}", "é".repeat(9), "é".repeat(10)));
        assert_eq!(short_hash("ééé"), "ééé");
    }

    #[test]
    fn test_chain_table_lists_every_block() {
        let mut ledger = Ledger::new();
        ledger.queue_transaction("Manufacturer", "Distributor", "Product-1", "Received").unwrap();
        let rendered = chain_table(ledger.blocks()).to_string();
        assert!(rendered.contains("Proof"));
        assert!(rendered.contains("100"));

        let rendered = history_table(&ledger.history("Product-1")).to_string();
        assert!(rendered.contains("pending"));
        assert!(rendered.contains("Received"));
    }
}
