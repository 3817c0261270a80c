//! Front-matter parsing and reconstruction.
//!
//! A document is `---`, a metadata region, `---`, then the body. Only the `tags`
//! field of the metadata region is understood; every other line is carried through
//! untouched.

use std::path::Path;

use thiserror::Error;

/// Delimiter bounding the metadata region.
pub const DELIMITER: &str = "---";

/// Delimiter marking the end of the human-written summary.
pub const SUMMARY_DELIMITER: &str = "----";

/// Key of the only recognized metadata field.
pub const TAGS_KEY: &str = "tags:";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrontMatterError {
    /// The document has fewer than two `---` delimiters.
    #[error("document has no front matter (expected two '---' delimiters)")]
    MissingDelimiters,
}

/// Outcome of looking for the `tags` field.
///
/// `Present(vec![])` means the field exists but is empty (`tags: []`); `Absent`
/// covers a missing field, malformed brackets and missing metadata alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagsField {
    Absent,
    Present(Vec<String>),
}

impl TagsField {
    /// Collapses both variants into a plain tag list.
    pub fn into_tags(self) -> Vec<String> {
        match self {
            TagsField::Absent => Vec::new(),
            TagsField::Present(tags) => tags,
        }
    }
}

/// Borrowed view of a document split at its first two delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    pub metadata: &'a str,
    /// Everything after the second delimiter, further `---` included.
    pub body: &'a str,
}

/// Splits `content` into metadata and body, or `None` with fewer than two delimiters.
pub fn split_front_matter(content: &str) -> Option<SplitDocument<'_>> {
    let mut parts = content.splitn(3, DELIMITER);
    let _preamble = parts.next()?;
    let metadata = parts.next()?;
    let body = parts.next()?;
    Some(SplitDocument { metadata, body })
}

/// Finds the `tags: [...]` field in the metadata region of `content`.
///
/// Each `tags:` occurrence is tried in order; the first one followed by a
/// single-line bracketed list wins. List elements are stripped of whitespace and
/// quote characters, and empty elements are dropped.
pub fn parse_tags_field(content: &str) -> TagsField {
    let Some(metadata) = content.split(DELIMITER).nth(1) else {
        return TagsField::Absent;
    };

    for (idx, _) in metadata.match_indices(TAGS_KEY) {
        let rest = metadata[idx + TAGS_KEY.len()..].trim_start();
        let Some(inner) = rest.strip_prefix('[') else {
            continue;
        };
        let Some(end) = inner.find(']') else {
            continue;
        };
        let list = &inner[..end];
        if list.contains('\n') {
            continue;
        }

        let tags = list
            .split(',')
            .map(|t| t.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\''))
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        return TagsField::Present(tags);
    }

    TagsField::Absent
}

/// Reads the tags of the document at `path`.
///
/// Read failures are logged and reported as an empty list so a single bad file
/// never stops a scan.
pub fn read_tags(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_tags_field(&content).into_tags(),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "error reading file");
            Vec::new()
        }
    }
}

/// Returns `content` up to the first summary delimiter, or all of it.
pub fn summary_excerpt(content: &str) -> &str {
    match content.find(SUMMARY_DELIMITER) {
        Some(end) => &content[..end],
        None => content,
    }
}

/// Formats the serialized tags line, e.g. `tags: ["Rust", "CLI"]`.
pub fn tags_line(tags: &[String]) -> String {
    let quoted: Vec<String> = tags.iter().map(|t| format!("\"{}\"", t)).collect();
    format!("{} [{}]", TAGS_KEY, quoted.join(", "))
}

/// Rebuilds `content` with its `tags` line replaced by `tags`.
///
/// # Errors
///
/// Returns `FrontMatterError::MissingDelimiters` if `content` lacks front matter.
pub fn render_with_tags(content: &str, tags: &[String]) -> Result<String, FrontMatterError> {
    let doc = split_front_matter(content).ok_or(FrontMatterError::MissingDelimiters)?;
    Ok(doc.render_with_tags(tags))
}

impl SplitDocument<'_> {
    /// Rebuilds the document with its `tags` line replaced by `tags`.
    ///
    /// Existing `tags:` lines are removed first, so repeated rewrites leave exactly
    /// one. Metadata lines keep the document's line ending (`\r\n` when the
    /// metadata uses it); the body after the second delimiter is kept byte for byte.
    pub fn render_with_tags(&self, tags: &[String]) -> String {
        let newline = if self.metadata.contains("\r\n") {
            "\r\n"
        } else {
            "\n"
        };

        let mut out = String::with_capacity(self.metadata.len() + self.body.len() + 64);
        out.push_str(DELIMITER);
        out.push_str(newline);

        let metadata = self.metadata.trim();
        if !metadata.is_empty() {
            for line in metadata
                .split('\n')
                .map(|line| line.trim_end_matches('\r'))
                .filter(|line| !line.starts_with(TAGS_KEY))
            {
                out.push_str(line);
                out.push_str(newline);
            }
        }

        out.push_str(&tags_line(tags));
        out.push_str(newline);
        out.push_str(DELIMITER);
        out.push_str(self.body);
        out
    }
}
