use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fmtags::config::{DEFAULT_CONTENT_DIR, DEFAULT_EXTENSION};
use fmtags::{CompletionClientBuilder, ContentConfig, Mode, TagSynthesizer, list_untagged};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// fmtags - keep the `tags` field of Markdown front matter populated
#[derive(Parser)]
#[command(name = "fmtags")]
#[command(about = "Generate tags for blog posts")]
#[command(version)]
struct Cli {
    /// List articles without tags
    #[arg(long)]
    list_no_tags: bool,

    /// Generate tags with a language model for articles without tags
    #[arg(long)]
    generate_tags: bool,

    /// Regenerate tags for all articles (with --generate-tags)
    #[arg(long)]
    force_update: bool,

    /// Directory to scan for articles
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONTENT_DIR)]
    specific_path: PathBuf,

    /// File extension of articles
    #[arg(long, value_name = "EXT", default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Model identifier (overrides FMTAGS_MODEL)
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,
}

fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Installs the stderr log subscriber, honoring `RUST_LOG` when set.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fmtags=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Errors caused by how the tool was invoked.
#[derive(Debug, thiserror::Error)]
enum UsageError {
    #[error("Path '{}' does not exist", .0.display())]
    MissingRoot(PathBuf),
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are bad invocations such as a content root that does not exist.
/// Everything else (network, I/O, API failures) is internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.downcast_ref::<UsageError>().is_some()
}

fn run(cli: &Cli) -> Result<()> {
    if !cli.specific_path.exists() {
        return Err(UsageError::MissingRoot(cli.specific_path.clone()).into());
    }

    let config = ContentConfig::new(&cli.specific_path).with_extension(&cli.extension);

    if !cli.list_no_tags && !cli.generate_tags {
        tracing::warn!("nothing to do; pass --list-no-tags or --generate-tags");
        return Ok(());
    }

    if cli.list_no_tags {
        execute_list(&config);
    }

    if cli.generate_tags {
        let mut builder = CompletionClientBuilder::new();
        if let Some(model) = &cli.model {
            builder = builder.model(model);
        }
        let client = builder
            .build()
            .context("Failed to configure completion client")?;
        tracing::debug!(base_url = client.base_url(), model = client.model(), "completion client ready");

        let synthesizer = TagSynthesizer::new(Arc::new(client));
        let mode = if cli.force_update {
            Mode::Force
        } else {
            Mode::MissingOnly
        };
        execute_generate(&synthesizer, &config, mode)?;
    }

    Ok(())
}

/// Prints the articles that have no tags.
fn execute_list(config: &ContentConfig) -> Vec<PathBuf> {
    let untagged = list_untagged(config);

    if untagged.is_empty() {
        println!("All articles have tags.");
    } else {
        println!("Articles without tags:");
        for path in &untagged {
            println!("  - {}", path.display());
        }
    }

    untagged
}

/// Runs the tagger and prints a one-line summary.
fn execute_generate(synthesizer: &TagSynthesizer, config: &ContentConfig, mode: Mode) -> Result<()> {
    let report = synthesizer
        .run(config, mode)
        .context("Tag generation stopped")?;

    if report.is_empty() {
        println!("No files to process :)");
        return Ok(());
    }

    print!("Updated tags for {} article(s)", report.updated.len());
    if !report.skipped.is_empty() {
        print!(", skipped {} without front matter", report.skipped.len());
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmtags::completion::{ChatMessage, CompletionClientTrait, CompletionError};
    use std::fs;
    use tempfile::tempdir;

    struct FixedClient(&'static str);

    impl CompletionClientTrait for FixedClient {
        fn complete(&self, _messages: &[ChatMessage]) -> Result<String, CompletionError> {
            Ok(self.0.to_string())
        }
    }

    fn cli_for(path: PathBuf) -> Cli {
        Cli {
            list_no_tags: false,
            generate_tags: false,
            force_update: false,
            specific_path: path,
            extension: DEFAULT_EXTENSION.to_string(),
            model: None,
        }
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::parse_from([
            "fmtags",
            "--generate-tags",
            "--force-update",
            "--specific-path",
            "posts",
        ]);
        assert!(cli.generate_tags);
        assert!(cli.force_update);
        assert!(!cli.list_no_tags);
        assert_eq!(cli.specific_path, PathBuf::from("posts"));
    }

    #[test]
    fn cli_defaults_to_content_dir() {
        let cli = Cli::parse_from(["fmtags", "--list-no-tags"]);
        assert_eq!(cli.specific_path, PathBuf::from("./content/"));
        assert_eq!(cli.extension, "md");
    }

    #[test]
    fn missing_root_is_a_user_error() {
        let dir = tempdir().unwrap();
        let mut cli = cli_for(dir.path().join("nope"));
        cli.list_no_tags = true;

        let err = run(&cli).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert!(is_user_error(&err));
    }

    #[test]
    fn internal_errors_are_not_user_errors() {
        let err = anyhow::anyhow!("Network error: connection refused");
        assert!(!is_user_error(&err));
    }

    #[test]
    fn io_error_mentioning_missing_path_is_internal() {
        let err: anyhow::Error = fmtags::TaggerError::Io {
            path: PathBuf::from("content/why-it-does not exist.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        let err = err.context("Tag generation stopped");

        assert!(format!("{err:#}").contains("does not exist"));
        assert!(!is_user_error(&err));
    }

    #[test]
    fn list_returns_untagged_articles() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("tagged.md"), "---\ntags: [\"a\"]\n---\n").unwrap();
        fs::write(dir.path().join("untagged.md"), "---\ntitle: t\n---\n").unwrap();

        let untagged = execute_list(&ContentConfig::new(dir.path()));
        assert_eq!(untagged, vec![dir.path().join("untagged.md")]);
    }

    #[test]
    fn generate_rewrites_untagged_article() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("post.md");
        fs::write(&path, "---\ntitle: t\n---\nBody").unwrap();

        let synthesizer = TagSynthesizer::new(Arc::new(FixedClient("Rust")));
        execute_generate(&synthesizer, &ContentConfig::new(dir.path()), Mode::MissingOnly).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "---\ntitle: t\ntags: [\"Rust\"]\n---\nBody"
        );
    }
}
