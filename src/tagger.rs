//! Tag synthesis and in-place rewriting of documents.
//!
//! This module provides the `TagSynthesizer` struct which asks a chat-completion
//! model for tags based on a document's summary and writes them back into the
//! document's front matter.
//!
//! Documents are processed one at a time. The first completion or write failure
//! stops the run; files rewritten before it keep their new tags.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::completion::{ChatMessage, CompletionClientTrait, CompletionError};
use crate::config::ContentConfig;
use crate::frontmatter::{self, FrontMatterError};
use crate::scanner::list_markdown_files;

/// System instruction sent with every tag request.
pub const SYSTEM_PROMPT: &str = "You are a highly professional senior article classification expert capable of generating classification tags for blog articles. The tags can be detailed down to specific vocabulary, and should use words rather than phrases whenever possible. Each set of generated tags should be carefully selected, highly abstract, strongly representative, and distinctive, with a quantity control of around 6 to 8, depending on the length of the article. Depending on the language of the article, you should generate classification tags in different languages. Your generated tags should pay attention to grammar, such as capitalizing the first letter of phrases, and ensure there is a space between English letters and other languages. Only output the tags, one per line, without adding `-` or `*` symbols to the tags.";

const USER_PROMPT_PREFIX: &str = "Generate tags for the following article:\n\n";

/// Errors that stop a tagging run.
#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to generate tags for {}: {source}", path.display())]
    Completion {
        path: PathBuf,
        #[source]
        source: CompletionError,
    },
}

/// Which documents a run considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Only documents without tags.
    #[default]
    MissingOnly,
    /// Every document, replacing existing tags.
    Force,
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Updated(Vec<String>),
    /// No front matter to rewrite; the file was left alone.
    Skipped,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub updated: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

impl RunReport {
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.skipped.is_empty()
    }
}

/// Returns the documents under `config` that have no tags.
pub fn list_untagged(config: &ContentConfig) -> Vec<PathBuf> {
    list_markdown_files(config)
        .into_iter()
        .filter(|path| frontmatter::read_tags(path).is_empty())
        .collect()
}

/// Builder for constructing `TagSynthesizer` instances.
#[derive(Default)]
pub struct TagSynthesizerBuilder {
    client: Option<Arc<dyn CompletionClientTrait>>,
}

impl TagSynthesizerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the completion client used for tag generation.
    pub fn client(mut self, client: Arc<dyn CompletionClientTrait>) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the `TagSynthesizer`.
    ///
    /// # Panics
    ///
    /// Panics if `client()` was not called before `build()`.
    #[must_use]
    pub fn build(self) -> TagSynthesizer {
        TagSynthesizer {
            client: self.client.expect("client must be set via client() method"),
        }
    }
}

/// Generates tags with a completion model and writes them into documents.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use fmtags::completion::CompletionClientBuilder;
/// use fmtags::config::ContentConfig;
/// use fmtags::tagger::{Mode, TagSynthesizer};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = CompletionClientBuilder::new().build()?;
/// let synthesizer = TagSynthesizer::new(Arc::new(client));
///
/// let report = synthesizer.run(&ContentConfig::default(), Mode::MissingOnly)?;
/// println!("updated {} documents", report.updated.len());
/// # Ok(())
/// # }
/// ```
pub struct TagSynthesizer {
    client: Arc<dyn CompletionClientTrait>,
}

impl TagSynthesizer {
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClientTrait>) -> Self {
        Self { client }
    }

    /// Selects the documents a run in `mode` will process.
    pub fn candidates(&self, config: &ContentConfig, mode: Mode) -> Vec<PathBuf> {
        match mode {
            Mode::Force => list_markdown_files(config),
            Mode::MissingOnly => list_untagged(config),
        }
    }

    /// Asks the model for tags describing `excerpt`.
    ///
    /// The response is read as one tag per line; lines are trimmed and blank
    /// lines dropped.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError` if the request fails.
    pub fn generate_tags(&self, excerpt: &str) -> Result<Vec<String>, CompletionError> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(format!("{}{}", USER_PROMPT_PREFIX, excerpt)),
        ];

        let response = self.client.complete(&messages)?;

        Ok(response
            .trim()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// Generates tags for one document and overwrites it.
    ///
    /// Documents without two `---` delimiters are skipped before any request is made.
    ///
    /// # Errors
    ///
    /// Returns `TaggerError` if the file cannot be read or written, or the
    /// completion request fails.
    pub fn tag_document(&self, path: &Path) -> Result<DocumentOutcome, TaggerError> {
        let content = std::fs::read_to_string(path).map_err(|source| TaggerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let Some(document) = frontmatter::split_front_matter(&content) else {
            tracing::warn!(
                path = %path.display(),
                error = %FrontMatterError::MissingDelimiters,
                "skipping document"
            );
            return Ok(DocumentOutcome::Skipped);
        };

        let excerpt = frontmatter::summary_excerpt(&content);
        let tags = self
            .generate_tags(excerpt)
            .map_err(|source| TaggerError::Completion {
                path: path.to_path_buf(),
                source,
            })?;

        let rendered = document.render_with_tags(&tags);
        std::fs::write(path, rendered).map_err(|source| TaggerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(path = %path.display(), tags = ?tags, "updated tags");
        Ok(DocumentOutcome::Updated(tags))
    }

    /// Tags every candidate document under `config`, in scan order.
    ///
    /// # Errors
    ///
    /// Returns the first `TaggerError`; later documents are not touched.
    pub fn run(&self, config: &ContentConfig, mode: Mode) -> Result<RunReport, TaggerError> {
        let candidates = self.candidates(config, mode);
        let mut report = RunReport::default();

        if candidates.is_empty() {
            tracing::info!("No files to process");
            return Ok(report);
        }

        for path in candidates {
            match self.tag_document(&path)? {
                DocumentOutcome::Updated(_) => report.updated.push(path),
                DocumentOutcome::Skipped => report.skipped.push(path),
            }
        }

        Ok(report)
    }
}
