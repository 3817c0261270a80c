//! Content-directory configuration.
//!
//! The content root is passed explicitly into the scanner and the tagger rather
//! than held in process-wide state.

use std::path::{Path, PathBuf};

/// Root scanned when no path is given on the command line.
pub const DEFAULT_CONTENT_DIR: &str = "./content/";

/// File extension (without the dot) of documents that are scanned.
pub const DEFAULT_EXTENSION: &str = "md";

/// Where documents live and which files count as documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentConfig {
    pub root: PathBuf,
    pub extension: String,
}

impl ContentConfig {
    /// Creates a configuration for `root` with the default extension.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Replaces the extension. A leading dot is accepted and stripped.
    #[must_use]
    pub fn with_extension(mut self, extension: impl AsRef<str>) -> Self {
        self.extension = extension.as_ref().trim_start_matches('.').to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns true if `path`'s file name ends with `.{extension}`.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| {
                name.to_string_lossy()
                    .ends_with(&format!(".{}", self.extension))
            })
            .unwrap_or(false)
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CONTENT_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_content_dir() {
        let config = ContentConfig::default();
        assert_eq!(config.root(), Path::new("./content/"));
        assert_eq!(config.extension, "md");
    }

    #[test]
    fn with_extension_strips_leading_dot() {
        let config = ContentConfig::new("docs").with_extension(".markdown");
        assert_eq!(config.extension, "markdown");
    }

    #[test]
    fn matches_checks_file_name_suffix() {
        let config = ContentConfig::default();
        assert!(config.matches(Path::new("content/post.md")));
        assert!(config.matches(Path::new("a/b/c/index.md")));
        assert!(!config.matches(Path::new("content/post.mdx")));
        assert!(!config.matches(Path::new("content/notes.txt")));
        assert!(!config.matches(Path::new("md")));
    }
}
