use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CortexError, Result};
use crate::semantic::types::IntentType;

/// Main configuration structure for CORTEX memory
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Where and how conversations are persisted
    #[serde(default)]
    pub storage: StorageConfig,
    /// Import pipeline settings
    #[serde(default)]
    pub import: ImportConfig,
    /// Heuristics used by the semantic extractor
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl Config {
    /// Load configuration from `path`, or from the first default location
    /// that exists, falling back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let default_paths = [
            dirs::home_dir().map(|h| h.join(".cortex").join("config.toml")),
            dirs::config_dir().map(|c| c.join("cortex").join("config.toml")),
            Some(PathBuf::from("cortex.toml")),
        ];

        for candidate in default_paths.iter().flatten() {
            if candidate.exists() {
                tracing::info!("Loading config from: {}", candidate.display());
                return Self::from_file(candidate);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Read and parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CortexError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CortexError::Config(format!("Failed to parse config: {e}")))
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Embedded SQLite database on disk
    #[default]
    Sqlite,
    /// Process-local store, lost on exit
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Base directory for all storage data
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// SQLite file name inside `data_dir`
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

impl StorageConfig {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
            database_file: default_database_file(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".cortex"))
        .unwrap_or_else(|| PathBuf::from(".cortex"))
}

fn default_database_file() -> String {
    "conversations.db".to_string()
}

/// Import pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImportConfig {
    /// Minimum quality score (0-10) a conversation needs to be stored
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: u8,
    /// Source label used when the caller does not supply one
    #[serde(default = "default_source")]
    pub default_source: String,
    /// File extensions picked up by directory imports
    #[serde(default = "default_directory_extensions")]
    pub directory_extensions: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            quality_threshold: default_quality_threshold(),
            default_source: default_source(),
            directory_extensions: default_directory_extensions(),
        }
    }
}

fn default_quality_threshold() -> u8 {
    6
}

fn default_source() -> String {
    "manual".to_string()
}

fn default_directory_extensions() -> Vec<String> {
    words(&["md", "json", "txt"])
}

/// Thresholds for the quality score factors
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QualityConfig {
    /// Turn count at which a conversation counts as multi-turn
    #[serde(default = "default_min_turns")]
    pub min_turns: usize,
    /// Total content characters needed for the length point
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,
    /// Technical-term density that earns one point
    #[serde(default = "default_technical_density_low")]
    pub technical_density_low: f32,
    /// Technical-term density that earns two points
    #[serde(default = "default_technical_density_high")]
    pub technical_density_high: f32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_turns: default_min_turns(),
            min_content_length: default_min_content_length(),
            technical_density_low: default_technical_density_low(),
            technical_density_high: default_technical_density_high(),
        }
    }
}

fn default_min_turns() -> usize {
    4
}

fn default_min_content_length() -> usize {
    500
}

fn default_technical_density_low() -> f32 {
    0.02
}

fn default_technical_density_high() -> f32 {
    0.04
}

/// Keyword lists per intent. Single words match whole tokens, anything
/// containing spaces or punctuation matches as a substring.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IntentKeywords {
    pub plan: Vec<String>,
    pub execute: Vec<String>,
    pub test: Vec<String>,
    pub fix: Vec<String>,
    pub refactor: Vec<String>,
    pub analyze: Vec<String>,
    pub explain: Vec<String>,
}

impl IntentKeywords {
    pub fn for_intent(&self, intent: IntentType) -> &[String] {
        match intent {
            IntentType::Plan => &self.plan,
            IntentType::Execute => &self.execute,
            IntentType::Test => &self.test,
            IntentType::Fix => &self.fix,
            IntentType::Refactor => &self.refactor,
            IntentType::Analyze => &self.analyze,
            IntentType::Explain => &self.explain,
        }
    }
}

impl Default for IntentKeywords {
    fn default() -> Self {
        Self {
            plan: words(&[
                "plan", "design", "architecture", "approach", "strategy", "roadmap", "outline",
                "break down", "steps",
            ]),
            execute: words(&[
                "implement", "create", "add", "build", "write", "develop", "generate", "make",
                "setup", "set up",
            ]),
            test: words(&[
                "test", "tests", "testing", "unittest", "pytest", "coverage", "verify", "assert",
            ]),
            fix: words(&[
                "fix", "bug", "error", "issue", "broken", "crash", "failing", "exception",
                "debug", "resolve",
            ]),
            refactor: words(&[
                "refactor", "restructure", "cleanup", "clean up", "simplify", "rename",
                "reorganize", "extract", "optimize",
            ]),
            analyze: words(&[
                "analyze", "analyse", "review", "investigate", "inspect", "examine", "evaluate",
                "audit", "profile",
            ]),
            explain: words(&[
                "explain", "why", "how does", "what is", "what does", "understand", "clarify",
                "describe", "walk me through",
            ]),
        }
    }
}

/// A named workflow: intents that must appear in this order across turns
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorkflowDefinition {
    pub name: String,
    pub steps: Vec<IntentType>,
}

impl WorkflowDefinition {
    pub fn new(name: &str, steps: &[IntentType]) -> Self {
        Self {
            name: name.to_string(),
            steps: steps.to_vec(),
        }
    }
}

/// Heuristics for entity, intent, pattern and quality extraction
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Extensions that make a token a file entity
    pub file_extensions: Vec<String>,
    /// PascalCase suffixes that make a token a class entity
    pub class_suffixes: Vec<String>,
    /// Verb prefixes that make an identifier a function entity
    pub action_verbs: Vec<String>,
    /// Words counted towards technical depth
    pub technical_terms: Vec<String>,
    /// Words and phrases that lower the clarity score
    pub ambiguity_markers: Vec<String>,
    /// Signals that a user turn expresses a need
    pub need_markers: Vec<String>,
    /// Signals that an assistant turn delivers a solution
    pub solution_markers: Vec<String>,
    pub intent_keywords: IntentKeywords,
    /// Matched keywords needed for an intent to reach confidence 1.0
    pub intent_saturation: usize,
    pub workflows: Vec<WorkflowDefinition>,
    pub quality: QualityConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        use IntentType::*;

        Self {
            file_extensions: words(&[
                "py", "ts", "tsx", "js", "jsx", "cs", "rs", "go", "java", "kt", "rb", "php",
                "cpp", "cc", "c", "h", "hpp", "swift", "md", "json", "yaml", "yml", "toml", "sql",
                "sh", "ps1", "html", "css", "scss", "vue",
            ]),
            class_suffixes: words(&[
                "Service", "Controller", "Manager", "Handler", "Repository", "Factory",
                "Provider", "Helper", "Client", "Model", "View", "Component", "Adapter", "Parser",
                "Extractor", "Store", "Importer", "Builder", "Validator", "Agent", "Engine",
                "Exception", "Error", "Config",
            ]),
            action_verbs: words(&[
                "get", "set", "create", "update", "delete", "fetch", "load", "save", "parse",
                "validate", "handle", "process", "calculate", "compute", "build", "render",
                "init", "initialize", "login", "logout", "authenticate", "register", "send",
                "read", "write", "extract", "import", "export", "store", "find", "search",
                "check", "verify", "generate", "convert",
            ]),
            technical_terms: words(&[
                "api", "function", "method", "class", "module", "variable", "parameter",
                "argument", "return", "async", "await", "database", "query", "schema", "table",
                "index", "endpoint", "server", "client", "request", "response", "http", "json",
                "sql", "regex", "cache", "thread", "interface", "type", "compile", "build",
                "deploy", "dependency", "library", "framework", "test", "tests", "bug", "error",
                "exception", "stack", "config", "configuration", "authentication", "password",
                "token", "session", "hash", "repository", "commit", "branch", "refactor",
                "algorithm", "performance", "memory", "import", "code", "implementation",
                "implement", "login", "def", "validate", "validation", "credentials",
            ]),
            ambiguity_markers: words(&[
                "maybe", "perhaps", "not sure", "i think", "i guess", "somehow", "something",
                "stuff", "whatever", "kind of", "sort of", "idk", "???",
            ]),
            need_markers: words(&[
                "need", "want", "how do i", "how can i", "how to", "help", "please", "can you",
                "could you", "implement", "fix", "error", "bug", "issue", "problem",
                "not working", "broken", "failing",
            ]),
            solution_markers: words(&[
                "here's", "here is", "i've", "implemented", "fixed", "updated", "added",
                "solution", "you can", "try this", "the fix", "this should", "resolved",
                "changed",
            ]),
            intent_keywords: IntentKeywords::default(),
            intent_saturation: 3,
            workflows: vec![
                WorkflowDefinition::new("plan_then_execute", &[Plan, Execute]),
                WorkflowDefinition::new("implement_and_test", &[Execute, Test]),
                WorkflowDefinition::new("debug_and_verify", &[Fix, Test]),
                WorkflowDefinition::new("refactor_and_verify", &[Refactor, Test]),
                WorkflowDefinition::new("analyze_then_fix", &[Analyze, Fix]),
            ],
            quality: QualityConfig::default(),
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
