use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use cortex_memory::semantic::EntityType;
use cortex_memory::storage::{ConversationFilter, ConversationStore, StoredConversation};

use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, format_timestamp, single_line, truncate_string};

#[derive(Parser)]
pub struct ConversationCommand {
    #[clap(subcommand)]
    pub command: ConversationSubcommand,
}

#[derive(Subcommand)]
pub enum ConversationSubcommand {
    #[clap(about = "List stored conversations")]
    List(ListArgs),

    #[clap(about = "Show a conversation with its semantic record")]
    Show(ShowArgs),

    #[clap(about = "Find conversations mentioning given entities")]
    Search(SearchArgs),
}

#[derive(Parser)]
pub struct ListArgs {
    #[clap(
        long,
        short,
        default_value = "20",
        help = "Maximum number of conversations to display"
    )]
    pub limit: usize,

    #[clap(long, help = "Only conversations scoring at least this")]
    pub min_quality: Option<u8>,

    #[clap(long, help = "Only conversations scoring at most this")]
    pub max_quality: Option<u8>,

    #[clap(long, short, help = "Only conversations imported from this source")]
    pub source: Option<String>,
}

#[derive(Parser)]
pub struct ShowArgs {
    #[clap(help = "Conversation ID (conv_YYYYMMDD_HHMMSS_xxxxxx)")]
    pub id: String,

    #[clap(long, help = "Print every turn in full")]
    pub turns: bool,
}

#[derive(Parser)]
pub struct SearchArgs {
    #[clap(
        long = "type",
        short = 't',
        value_delimiter = ',',
        default_value = "file,class,function",
        help = "Entity types to match (file, class, function)"
    )]
    pub types: Vec<String>,

    #[clap(long = "value", short = 'v', required = true, help = "Entity value to match (repeatable)")]
    pub values: Vec<String>,

    #[clap(long, short, help = "Maximum number of conversations to display")]
    pub limit: Option<usize>,
}

impl ConversationCommand {
    pub fn execute(&self, store: &dyn ConversationStore, format: OutputFormat) -> CliResult<()> {
        match &self.command {
            ConversationSubcommand::List(args) => Self::list(store, args, format),
            ConversationSubcommand::Show(args) => Self::show(store, args, format),
            ConversationSubcommand::Search(args) => Self::search(store, args, format),
        }
    }

    fn list(store: &dyn ConversationStore, args: &ListArgs, format: OutputFormat) -> CliResult<()> {
        let mut filter = ConversationFilter::new().with_limit(args.limit);
        if let Some(min) = args.min_quality {
            filter = filter.with_min_quality(min);
        }
        if let Some(max) = args.max_quality {
            filter = filter.with_max_quality(max);
        }
        if let Some(source) = &args.source {
            filter = filter.with_source(source.as_str());
        }

        let conversations = store.find(&filter)?;
        print_conversations(&conversations, format)
    }

    fn show(store: &dyn ConversationStore, args: &ShowArgs, format: OutputFormat) -> CliResult<()> {
        let record = store
            .get_conversation(&args.id)?
            .ok_or_else(|| format!("Conversation not found: {}", args.id))?;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            OutputFormat::Table => {
                let semantic = &record.metadata.semantic;
                let conversation = &record.conversation;

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Property", "Value"]);

                table.add_row(["ID", &record.id]);
                table.add_row(["Source", &record.metadata.source]);
                table.add_row(["Stored", &format_timestamp(&record.metadata.stored_at)]);
                table.add_row([
                    "Conversation Time",
                    &format_timestamp(&conversation.approximate_timestamp),
                ]);
                table.add_row(["Format", conversation.detected_format.as_str()]);
                table.add_row(["Turns", &conversation.turn_count.to_string()]);
                table.add_row(["Has Code", if conversation.has_code { "yes" } else { "no" }]);
                table.add_row(["Quality", &format!("{}/10", semantic.quality_score)]);

                let entities: Vec<String> = semantic
                    .entities
                    .iter()
                    .map(|e| format!("{}:{} ({:.2})", e.entity_type, e.value, e.confidence))
                    .collect();
                table.add_row(["Entities", &or_dash(entities.join(", "))]);

                let intents: Vec<String> = semantic
                    .intents
                    .iter()
                    .map(|i| format!("{} ({:.2})", i.intent_type, i.confidence))
                    .collect();
                table.add_row(["Intents", &or_dash(intents.join(", "))]);

                let patterns: Vec<String> = semantic
                    .patterns
                    .iter()
                    .map(|p| format!("{}: {}", p.name, p.summary))
                    .collect();
                table.add_row(["Patterns", &or_dash(patterns.join("\n"))]);

                println!("{table}");

                let mut turns = Table::new();
                turns
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["#", "Role", "Content"]);

                for (index, turn) in conversation.turns.iter().enumerate() {
                    let content = if args.turns {
                        turn.content.clone()
                    } else {
                        truncate_string(&single_line(&turn.content), 80)
                    };
                    turns.add_row([index.to_string(), turn.role.as_str().to_string(), content]);
                }

                println!("\n{turns}");
            }
        }

        Ok(())
    }

    fn search(store: &dyn ConversationStore, args: &SearchArgs, format: OutputFormat) -> CliResult<()> {
        let types = parse_entity_types(&args.types)?;

        let mut conversations = store.search_by_entities(&types, &args.values)?;
        if let Some(limit) = args.limit {
            conversations.truncate(limit);
        }

        print_conversations(&conversations, format)
    }
}

fn parse_entity_types(names: &[String]) -> CliResult<Vec<EntityType>> {
    names
        .iter()
        .map(|name| {
            EntityType::parse(name.trim()).ok_or_else(|| {
                CliError::from(format!(
                    "Unknown entity type: {name}. Use file, class, or function."
                ))
            })
        })
        .collect()
}

fn print_conversations(conversations: &[StoredConversation], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let output: Vec<_> = conversations
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "id": &c.id,
                        "source": &c.metadata.source,
                        "stored_at": c.metadata.stored_at.to_rfc3339(),
                        "quality_score": c.quality_score(),
                        "turn_count": c.conversation.turn_count,
                        "has_code": c.conversation.has_code,
                        "entity_count": c.metadata.semantic.entities.len(),
                        "intents": c
                            .metadata
                            .semantic
                            .intents
                            .iter()
                            .map(|i| i.intent_type)
                            .collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            if conversations.is_empty() {
                println!("No conversations found.");
                return Ok(());
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL_CONDENSED)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(["ID", "Source", "Quality", "Turns", "Opening", "Stored"]);

            for conversation in conversations {
                let opening = conversation
                    .conversation
                    .turns
                    .first()
                    .map(|t| truncate_string(&single_line(&t.content), 40))
                    .unwrap_or_default();

                table.add_row([
                    conversation.id.clone(),
                    truncate_string(&conversation.metadata.source, 20),
                    conversation.quality_score().to_string(),
                    conversation.conversation.turn_count.to_string(),
                    opening,
                    format_timestamp(&conversation.metadata.stored_at),
                ]);
            }

            println!("{table}");
            println!("\nTotal: {} conversations", conversations.len());
        }
    }

    Ok(())
}

fn or_dash(s: String) -> String {
    if s.is_empty() { "-".to_string() } else { s }
}
