//! Human-readable and JSON rendering of command results.

use anyhow::Result;
use console::style;

use embedsync_types::config::TableConfig;
use embedsync_types::run::{RunSummary, StoreStatus};

pub fn print_run_summary(summary: &RunSummary, tables: &TableConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!();
    if summary.rows_written == 0 {
        println!(
            "  {} Nothing to embed in '{}'",
            style("✓").green(),
            style(&tables.source_table).cyan()
        );
        println!();
        return Ok(());
    }

    println!(
        "  {} Embedded {} rows into '{}'",
        style("✓").green(),
        style(summary.rows_written).bold(),
        style(&tables.destination_table).cyan()
    );
    println!("  Batches:    {}", summary.batches);
    println!("  Tokens:     {}", summary.total_tokens);
    if let Some(dims) = summary.dimensions {
        println!("  Dimensions: {dims}");
    }
    println!();
    Ok(())
}

pub fn print_status(status: &StoreStatus, tables: &TableConfig, json: bool) -> Result<()> {
    if json {
        let value = serde_json::json!({
            "source_table": tables.source_table,
            "destination_table": tables.destination_table,
            "pending": status.pending,
            "embedded": status.embedded,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} -> {}",
        style("⚡").bold(),
        style(&tables.source_table).cyan(),
        style(&tables.destination_table).cyan()
    );
    println!();
    println!("  Embedded: {}", style(status.embedded).green());
    if status.pending > 0 {
        println!("  Pending:  {}", style(status.pending).yellow());
    } else {
        println!("  Pending:  {}", style(0).dim());
    }
    println!();
    Ok(())
}
