pub mod config;
pub mod conversation;
pub mod import;
pub mod stats;

pub use config::ConfigCommand;
pub use conversation::ConversationCommand;
pub use import::ImportCommand;
pub use stats::StatsCommand;
