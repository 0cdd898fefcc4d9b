use std::path::Path;

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use cortex_memory::SemanticExtractor;
use cortex_memory::config::Config;

use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct ConfigCommand {
    #[clap(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    #[clap(about = "Show current configuration")]
    Show(ShowArgs),

    #[clap(about = "Check that the configuration loads and its word lists compile")]
    Validate,
}

#[derive(Parser)]
pub struct ShowArgs {
    #[clap(long, help = "Print the full configuration as TOML")]
    pub toml: bool,
}

impl ConfigCommand {
    pub fn execute(&self, config_path: Option<&Path>, format: OutputFormat) -> CliResult<()> {
        let config = Config::load(config_path)?;

        match &self.command {
            ConfigSubcommand::Show(args) => Self::show(&config, config_path, args, format),
            ConfigSubcommand::Validate => Self::validate(&config, format),
        }
    }

    fn show(
        config: &Config,
        config_path: Option<&Path>,
        args: &ShowArgs,
        format: OutputFormat,
    ) -> CliResult<()> {
        if args.toml {
            print!("{}", toml::to_string_pretty(config)?);
            return Ok(());
        }

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(config)?);
            }
            OutputFormat::Table => {
                match config_path {
                    Some(path) => println!("Configuration from: {}", path.display()),
                    None => println!("Configuration: (default search path)"),
                }
                println!("==============================\n");

                println!("[Storage]");
                let mut storage_table = new_table();
                storage_table.add_row(["backend", &format!("{:?}", config.storage.backend)]);
                storage_table.add_row(["data_dir", &config.storage.data_dir.display().to_string()]);
                storage_table.add_row(["database", &config.storage.database_path().display().to_string()]);
                println!("{storage_table}\n");

                println!("[Import]");
                let mut import_table = new_table();
                import_table.add_row([
                    "quality_threshold",
                    &config.import.quality_threshold.to_string(),
                ]);
                import_table.add_row(["default_source", &config.import.default_source]);
                import_table.add_row([
                    "directory_extensions",
                    &config.import.directory_extensions.join(", "),
                ]);
                println!("{import_table}\n");

                let extraction = &config.extraction;
                let quality = &extraction.quality;
                println!("[Extraction]");
                let mut extraction_table = new_table();
                for (setting, value) in [
                    ("file_extensions", extraction.file_extensions.len().to_string()),
                    ("class_suffixes", extraction.class_suffixes.len().to_string()),
                    ("action_verbs", extraction.action_verbs.len().to_string()),
                    ("technical_terms", extraction.technical_terms.len().to_string()),
                    ("intent_saturation", extraction.intent_saturation.to_string()),
                    ("workflows", extraction.workflows.len().to_string()),
                    ("quality.min_turns", quality.min_turns.to_string()),
                    ("quality.min_content_length", quality.min_content_length.to_string()),
                    (
                        "quality.technical_density",
                        format!(
                            "{} / {}",
                            quality.technical_density_low, quality.technical_density_high
                        ),
                    ),
                ] {
                    extraction_table.add_row([setting.to_string(), value]);
                }
                println!("{extraction_table}");
            }
        }

        Ok(())
    }

    fn validate(config: &Config, format: OutputFormat) -> CliResult<()> {
        SemanticExtractor::new(config.extraction.clone())?;

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({ "valid": true });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => println!("Configuration is valid."),
        }
        Ok(())
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Setting", "Value"]);
    table
}
