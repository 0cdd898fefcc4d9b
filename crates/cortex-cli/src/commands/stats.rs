use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use cortex_memory::storage::{ConversationStore, StoreStatistics};

use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct StatsCommand {}

impl StatsCommand {
    pub fn execute(&self, store: &dyn ConversationStore, format: OutputFormat) -> CliResult<()> {
        let stats = store.get_statistics()?;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
            OutputFormat::Table => {
                println!("CORTEX Statistics");
                println!("======================\n");
                println!("{}\n", quality_table(&stats));

                println!(
                    "Total: {} conversations, average quality {:.1}",
                    stats.total_conversations, stats.avg_quality_score
                );
                println!(
                    "Entities: {}  Intents: {}",
                    stats.total_entities, stats.total_intents
                );
            }
        }

        Ok(())
    }
}

fn quality_table(stats: &StoreStatistics) -> Table {
    let dist = &stats.quality_distribution;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Quality", "Range", "Count", "Share"]);

    for (band, range, count) in [
        ("Excellent", "8-10", dist.excellent),
        ("Good", "6-7", dist.good),
        ("Fair", "4-5", dist.fair),
        ("Poor", "0-3", dist.poor),
    ] {
        table.add_row([
            band.to_string(),
            range.to_string(),
            count.to_string(),
            format_share(count, stats.total_conversations),
        ]);
    }

    table
}

fn format_share(count: usize, total: usize) -> String {
    if total == 0 {
        "-".to_string()
    } else {
        format!("{:.0}%", count as f64 * 100.0 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_share() {
        assert_eq!(format_share(0, 0), "-");
        assert_eq!(format_share(1, 4), "25%");
        assert_eq!(format_share(2, 3), "67%");
    }
}
