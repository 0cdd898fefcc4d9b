use std::path::{Path, PathBuf};

use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use cortex_memory::config::Config;
use cortex_memory::import::{ConversationImporter, FileImport, ImportReport};
use cortex_memory::storage::ConversationStore;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::CliResult;
use crate::output::{OutputFormat, truncate_string};

#[derive(Parser)]
pub struct ImportCommand {
    #[clap(help = "Transcript file to import", conflicts_with_all = ["text", "clipboard", "dir"])]
    pub file: Option<PathBuf>,

    #[clap(long, help = "Import transcript text given on the command line")]
    pub text: Option<String>,

    #[clap(
        long,
        help = "Import the transcript currently on the clipboard",
        conflicts_with_all = ["text", "dir"]
    )]
    pub clipboard: bool,

    #[clap(long, help = "Import every transcript under a directory", conflicts_with = "text")]
    pub dir: Option<PathBuf>,

    #[clap(long, short, help = "Source label stored with the conversation")]
    pub source: Option<String>,

    #[clap(
        long,
        value_parser = clap::value_parser!(u8).range(0..=10),
        help = "Minimum quality score (0-10) required to store"
    )]
    pub threshold: Option<u8>,

    #[clap(
        long,
        value_delimiter = ',',
        help = "File extensions picked up by --dir (comma separated)"
    )]
    pub extensions: Option<Vec<String>>,
}

impl ImportCommand {
    pub fn execute<S: ConversationStore>(
        &self,
        store: S,
        config: &Config,
        format: OutputFormat,
    ) -> CliResult<()> {
        let mut importer = ConversationImporter::new(store, config)?;
        if let Some(threshold) = self.threshold {
            importer = importer.with_quality_threshold(threshold);
        }
        let source = self.source.as_deref();

        if let Some(dir) = &self.dir {
            let extensions = self
                .extensions
                .as_deref()
                .unwrap_or(&config.import.directory_extensions);
            return import_dir(&mut importer, dir, extensions, source, format);
        }

        let report = if let Some(text) = &self.text {
            importer.import_from_text(text, source)
        } else if self.clipboard {
            importer.import_from_clipboard(source)
        } else if let Some(file) = &self.file {
            importer.import_from_file(file, source)
        } else {
            return Err("Nothing to import. Pass a FILE, --text, --clipboard or --dir.".into());
        };

        print_report(&report, format)?;

        match report.error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }
}

fn import_dir<S: ConversationStore>(
    importer: &mut ConversationImporter<S>,
    dir: &Path,
    extensions: &[String],
    source: Option<&str>,
    format: OutputFormat,
) -> CliResult<()> {
    if !dir.is_dir() {
        return Err(format!("Not a directory: {}", dir.display()).into());
    }

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map_err(|e| format!("Progress bar error: {e}"))?
            .progress_chars("#>-"),
    );

    let results = importer.import_directory_with(dir, extensions, source, |result, total| {
        progress.set_length(total as u64);
        progress.set_message(
            result
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        progress.inc(1);
    });
    progress.finish_and_clear();

    if results.is_empty() {
        match format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Table => println!("No transcripts found in {}.", dir.display()),
        }
        return Ok(());
    }

    print_directory_results(&results, format)
}

fn print_report(report: &ImportReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL_CONDENSED)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(["Property", "Value"]);

            table.add_row(["Status", &format!("{:?}", report.status)]);
            table.add_row(["Stored", if report.stored { "yes" } else { "no" }]);
            table.add_row(["Conversation ID", report.conversation_id.as_deref().unwrap_or("-")]);
            if let Some(count) = report.message_count {
                table.add_row(["Messages", &count.to_string()]);
            }

            if let Some(semantic) = &report.semantic_data {
                let breakdown = &semantic.quality_breakdown;
                table.add_row(["Quality", &format!("{}/10", semantic.quality_score)]);
                table.add_row([
                    "Breakdown",
                    &format!(
                        "code {} | turns {} | depth {} | problem/solution {} | clarity {} | length {}",
                        breakdown.code,
                        breakdown.multi_turn,
                        breakdown.technical_depth,
                        breakdown.problem_solution,
                        breakdown.clarity,
                        breakdown.length
                    ),
                ]);
                table.add_row(["Entities", &semantic.entity_count.to_string()]);
                table.add_row(["Intents", &join_or_dash(semantic.intents.iter())]);
                table.add_row(["Patterns", &join_or_dash(semantic.patterns.iter())]);
            }

            if let Some(stage) = report.stage {
                table.add_row(["Failed Stage", stage.as_str()]);
            }
            if let Some(error) = &report.error {
                table.add_row(["Error", error]);
            }

            println!("{table}");
        }
    }
    Ok(())
}

fn print_directory_results(results: &[FileImport], format: OutputFormat) -> CliResult<()> {
    let stored = results.iter().filter(|r| r.report.stored).count();
    let failed = results.iter().filter(|r| !r.report.is_success()).count();

    match format {
        OutputFormat::Json => {
            let output: Vec<_> = results
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "path": r.path.display().to_string(),
                        "report": &r.report,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL_CONDENSED)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(["File", "Status", "Quality", "Stored", "ID / Error"]);

            for result in results {
                let report = &result.report;
                let quality = report
                    .semantic_data
                    .as_ref()
                    .map(|s| s.quality_score.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let detail = report
                    .conversation_id
                    .clone()
                    .or_else(|| report.error.clone())
                    .unwrap_or_else(|| "below threshold".to_string());

                table.add_row([
                    truncate_string(&result.path.display().to_string(), 40),
                    format!("{:?}", report.status),
                    quality,
                    if report.stored { "yes" } else { "no" }.to_string(),
                    truncate_string(&detail, 60),
                ]);
            }

            println!("{table}");
            println!(
                "\nTotal: {} files, {} stored, {} failed",
                results.len(),
                stored,
                failed
            );
        }
    }

    Ok(())
}

fn join_or_dash<T: ToString>(items: impl Iterator<Item = T>) -> String {
    let joined: Vec<String> = items.map(|i| i.to_string()).collect();
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined.join(", ")
    }
}
