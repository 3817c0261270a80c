pub mod completion;
pub mod config;
pub mod frontmatter;
pub mod scanner;
pub mod tagger;

pub use completion::{CompletionClient, CompletionClientBuilder, CompletionClientTrait, CompletionError};
pub use config::ContentConfig;
pub use frontmatter::{TagsField, read_tags};
pub use scanner::list_markdown_files;
pub use tagger::{Mode, RunReport, TagSynthesizer, TagSynthesizerBuilder, TaggerError, list_untagged};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_accessible_from_crate_root() {
        let config = ContentConfig::default();
        assert_eq!(config.extension, "md");

        assert_eq!(Mode::default(), Mode::MissingOnly);
        assert!(RunReport::default().is_empty());

        let field = frontmatter::parse_tags_field("---\ntags: [\"a\"]\n---\n");
        assert_eq!(field, TagsField::Present(vec!["a".to_string()]));
    }
}
