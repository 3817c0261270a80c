//! Recursive discovery of documents under the content root.

use std::path::PathBuf;

use walkdir::WalkDir;

use crate::config::ContentConfig;

/// Lists every file under `config.root` whose name ends with the configured extension.
///
/// Order follows the directory traversal. Entries that cannot be read are logged
/// and skipped; an empty or missing root yields an empty list.
pub fn list_markdown_files(config: &ContentConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(config.root()) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        // Symlinked files count as documents; linked directories are neither
        // descended nor listed.
        let file_type = entry.file_type();
        if file_type.is_dir() || (file_type.is_symlink() && entry.path().is_dir()) {
            continue;
        }

        if config.matches(entry.path()) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!(count = files.len(), root = %config.root().display(), "scanned content root");
    files
}
