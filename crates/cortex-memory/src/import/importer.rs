use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::import::clipboard::{ClipboardProvider, SystemClipboard};
use crate::import::validation::validate;
use crate::import::{ImportError, ImportReport};
use crate::semantic::SemanticExtractor;
use crate::storage::{ConversationMetadata, ConversationStore};
use crate::transcript::TranscriptParser;

const CLIPBOARD_SOURCE: &str = "clipboard";

/// Result of importing one file during a directory import
#[derive(Debug, Clone)]
pub struct FileImport {
    pub path: PathBuf,
    pub report: ImportReport,
}

/// Drives raw text through validate -> parse -> extract -> store.
///
/// Every entry point returns an [`ImportReport`]; failures at any stage are
/// folded into an error report instead of being returned.
pub struct ConversationImporter<S: ConversationStore> {
    store: S,
    parser: TranscriptParser,
    extractor: SemanticExtractor,
    quality_threshold: u8,
    default_source: String,
    clipboard: Option<Box<dyn ClipboardProvider>>,
}

impl<S: ConversationStore> ConversationImporter<S> {
    /// Build an importer over `store` using the extraction and import
    /// settings from `config`. Reads the system clipboard by default.
    pub fn new(store: S, config: &Config) -> crate::error::Result<Self> {
        Ok(Self {
            store,
            parser: TranscriptParser::new(),
            extractor: SemanticExtractor::new(config.extraction.clone())?,
            quality_threshold: config.import.quality_threshold,
            default_source: config.import.default_source.clone(),
            clipboard: Some(Box::new(SystemClipboard)),
        })
    }

    pub fn with_quality_threshold(mut self, quality_threshold: u8) -> Self {
        self.quality_threshold = quality_threshold;
        self
    }

    pub fn with_clipboard(mut self, provider: impl ClipboardProvider + 'static) -> Self {
        self.clipboard = Some(Box::new(provider));
        self
    }

    /// Disable clipboard imports; they fail with `ClipboardUnavailable`.
    pub fn without_clipboard(mut self) -> Self {
        self.clipboard = None;
        self
    }

    pub fn quality_threshold(&self) -> u8 {
        self.quality_threshold
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Import inline text. `source` defaults to the configured default source.
    pub fn import_from_text(&mut self, text: &str, source: Option<&str>) -> ImportReport {
        let threshold = self.quality_threshold;
        self.import_text_with_threshold(text, source, threshold)
    }

    /// Import inline text against an explicit quality threshold.
    pub fn import_text_with_threshold(
        &mut self,
        text: &str,
        source: Option<&str>,
        quality_threshold: u8,
    ) -> ImportReport {
        let source = source
            .map(str::to_string)
            .unwrap_or_else(|| self.default_source.clone());
        let result = self.run(text, &source, quality_threshold);
        self.finish(result, &source)
    }

    /// Import a transcript file. `source` defaults to the file name.
    pub fn import_from_file(&mut self, path: &Path, source: Option<&str>) -> ImportReport {
        let source = source.map(str::to_string).unwrap_or_else(|| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        });

        tracing::debug!("Reading transcript from {}", path.display());
        let result = std::fs::read_to_string(path)
            .map_err(|e| {
                ImportError::Validation(format!("Cannot read {}: {e}", path.display()))
            })
            .and_then(|text| self.run(&text, &source, self.quality_threshold));

        self.finish(result, &source)
    }

    /// Import whatever text is on the clipboard. `source` defaults to "clipboard".
    pub fn import_from_clipboard(&mut self, source: Option<&str>) -> ImportReport {
        let source = source.unwrap_or(CLIPBOARD_SOURCE).to_string();

        let text = match &self.clipboard {
            None => Err(ImportError::ClipboardUnavailable(
                "no clipboard provider configured".to_string(),
            )),
            Some(provider) => provider
                .read_text()
                .map_err(|e| ImportError::ClipboardUnavailable(e.to_string())),
        };
        let result = text.and_then(|text| self.run(&text, &source, self.quality_threshold));

        self.finish(result, &source)
    }

    /// Import every file under `dir` whose extension is in `extensions`,
    /// in path order. Each file gets its own report; `source` defaults to
    /// each file's name.
    pub fn import_directory(
        &mut self,
        dir: &Path,
        extensions: &[String],
        source: Option<&str>,
    ) -> Vec<FileImport> {
        self.import_directory_with(dir, extensions, source, |_, _| {})
    }

    /// Like [`import_directory`](Self::import_directory), calling
    /// `on_file(result, total)` after each file.
    pub fn import_directory_with(
        &mut self,
        dir: &Path,
        extensions: &[String],
        source: Option<&str>,
        mut on_file: impl FnMut(&FileImport, usize),
    ) -> Vec<FileImport> {
        let paths = collect_transcripts(dir, extensions);
        let total = paths.len();
        tracing::debug!(total, "Importing transcripts from {}", dir.display());

        let mut results = Vec::with_capacity(total);
        for path in paths {
            let report = self.import_from_file(&path, source);
            let result = FileImport { path, report };
            on_file(&result, total);
            results.push(result);
        }
        results
    }

    fn run(
        &mut self,
        text: &str,
        source: &str,
        quality_threshold: u8,
    ) -> Result<ImportReport, ImportError> {
        validate(text, &self.parser)?;
        tracing::debug!(source, "Validation passed");

        let conversation = self.parser.parse(text)?;
        tracing::debug!(
            source,
            format = %conversation.detected_format,
            turns = conversation.turn_count,
            "Parsed transcript"
        );

        let semantic = self.extractor.extract(&conversation);
        let outcome = self.store.store_conversation(
            &conversation,
            ConversationMetadata::new(source, semantic.clone()),
            quality_threshold,
        )?;

        if !outcome.stored {
            tracing::warn!(
                source,
                score = semantic.quality_score,
                quality_threshold,
                "Conversation below quality threshold, not stored"
            );
        }

        Ok(ImportReport::success(
            outcome,
            conversation.turn_count,
            &semantic,
        ))
    }

    fn finish(&self, result: Result<ImportReport, ImportError>, source: &str) -> ImportReport {
        match result {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(source, stage = %e.stage(), "Import failed: {}", e);
                ImportReport::failure(&e)
            }
        }
    }
}

/// Files under `dir` with one of `extensions` (case-insensitive, no dot),
/// sorted by path. Unreadable entries are skipped.
pub fn collect_transcripts(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    extensions
                        .iter()
                        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
                })
        })
        .map(|entry| entry.into_path())
        .collect();

    paths.sort();
    paths
}
