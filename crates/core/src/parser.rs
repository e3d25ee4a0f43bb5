//! Markdown article parser.
//!
//! Extracts YAML frontmatter, fenced code blocks, image references and the
//! level-2/level-3 section tree from an article. Parsing is best-effort:
//! malformed frontmatter is ignored and missing fields fall back to defaults.

use crate::text::{compose_unicode, first_sentences, last_sentences, normalize_line_endings};
use crate::types::{CodeBlock, Document, ImageReference, Section, DEFAULT_AUTHOR, DEFAULT_TITLE};
use crate::{Error, Result};
use regex::Regex;
use serde_yaml::Value;
use std::path::Path;
use std::sync::LazyLock;

/// Regex matching a leading `---` delimited frontmatter block.
static FRONTMATTER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---\n(.*?)\n---").unwrap());

/// Regex matching a fenced code block with an optional language tag.
static CODE_BLOCK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(\w*)\n(.*?)```").unwrap());

/// Regex matching markdown image syntax `![alt](path)`.
static IMAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());

/// Regex matching an ATX heading line.
static HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());

/// Number of sentences captured on each side of a code block.
const CONTEXT_SENTENCES: usize = 2;

/// Metadata read from the frontmatter block.
#[derive(Debug, Default, PartialEq)]
struct Frontmatter {
    title: Option<String>,
    author: Option<String>,
    date: Option<String>,
    tags: Vec<String>,
}

/// Parser for markdown articles.
#[derive(Debug, Clone, Default)]
pub struct ArticleParser;

impl ArticleParser {
    /// Create a new article parser.
    pub fn new() -> Self {
        Self
    }

    /// Read and parse an article from disk.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Document> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        log::debug!("Read {} bytes from {}", content.len(), path.display());

        Ok(self.parse_content(&content))
    }

    /// Parse article text into a [`Document`].
    pub fn parse_content(&self, content: &str) -> Document {
        let text = normalize_line_endings(content);
        let metadata = extract_frontmatter(&text);

        // Everything below works on the text without its frontmatter
        let body = FRONTMATTER_REGEX.replace(&text, "");

        let code_blocks = extract_code_blocks(&body);
        let images = extract_images(&body);
        let mut sections = extract_sections(&body);
        attach_to_sections(&mut sections, &code_blocks, &images);

        log::debug!(
            "Parsed article: {} sections, {} code blocks, {} images",
            sections.len(),
            code_blocks.len(),
            images.len()
        );

        Document {
            title: metadata.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            author: metadata.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            date: metadata.date.unwrap_or_default(),
            tags: metadata.tags,
            sections,
            code_blocks,
            images,
            raw_content: content.to_string(),
        }
    }
}

/// Read the frontmatter block, treating anything malformed as absent.
fn extract_frontmatter(text: &str) -> Frontmatter {
    let Some(caps) = FRONTMATTER_REGEX.captures(text) else {
        return Frontmatter::default();
    };

    let value: Value = match serde_yaml::from_str(&caps[1]) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("Ignoring malformed frontmatter: {}", e);
            return Frontmatter::default();
        }
    };

    let Value::Mapping(map) = value else {
        log::debug!("Ignoring frontmatter that is not a key-value mapping");
        return Frontmatter::default();
    };

    let field = |key: &str| map.get(key).and_then(scalar_to_string);

    let tags = match map.get("tags") {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(other) => scalar_to_string(other).into_iter().collect(),
        None => Vec::new(),
    };

    Frontmatter {
        title: field("title"),
        author: field("author"),
        date: field("date"),
        tags,
    }
}

/// Render a YAML scalar as text. Null and collections yield `None`.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(compose_unicode(s)),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Extract all fenced code blocks along with the prose around them.
fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    CODE_BLOCK_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let language = match &caps[1] {
                "" => "text",
                lang => lang,
            };

            let before = last_sentences(&text[..whole.start()], CONTEXT_SENTENCES);
            let after = first_sentences(&text[whole.end()..], CONTEXT_SENTENCES);

            let mut block = CodeBlock::new(language, caps[2].trim()).with_context(before, after);
            block.offset = whole.start();
            Some(block)
        })
        .collect()
}

/// Extract all `![alt](path)` image references.
fn extract_images(text: &str) -> Vec<ImageReference> {
    IMAGE_REGEX
        .captures_iter(text)
        .map(|caps| {
            let mut image = ImageReference::new(&caps[1], &caps[2]);
            image.offset = caps.get(0).map_or(0, |m| m.start());
            image
        })
        .collect()
}

/// Classify a line as a structural heading, returning its level and text.
///
/// Only levels 2 and 3 are structural; every other line is body text.
fn structural_heading(line: &str) -> Option<(u8, &str)> {
    let caps = HEADING_REGEX.captures(line)?;
    let level = caps.get(1)?.as_str().len();
    let heading = caps.get(2)?.as_str();

    match level {
        2 => Some((2, heading)),
        3 => Some((3, heading)),
        _ => None,
    }
}

/// Build the level-2 section tree by walking the text line by line.
///
/// Lines before the first level-2 heading are dropped, as is any level-3
/// heading that has no enclosing level-2 section. Body lines always go to the
/// open level-2 section and, when one is open, to its latest subsection.
fn extract_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;
    let mut offset = 0;

    for line in text.split('\n') {
        let line_start = offset;
        offset += line.len() + 1;
        let body_start = offset.min(text.len());

        match structural_heading(line) {
            Some((2, heading)) => {
                if let Some(done) = current.take() {
                    sections.push(close_section(done, line_start));
                }
                let mut section = Section::new(compose_unicode(heading), 2);
                section.span = body_start..body_start;
                current = Some(section);
            }
            Some((_, heading)) => match current.as_mut() {
                Some(section) => {
                    if let Some(previous) = section.subsections.last_mut() {
                        previous.span.end = line_start;
                    }
                    let mut subsection = Section::new(compose_unicode(heading), 3);
                    subsection.span = body_start..body_start;
                    section.subsections.push(subsection);
                }
                None => log::debug!("Dropping subsection '{}' outside any section", heading),
            },
            None => {
                if let Some(section) = current.as_mut() {
                    section.push_line(line);
                    if let Some(subsection) = section.subsections.last_mut() {
                        subsection.push_line(line);
                    }
                }
            }
        }
    }

    if let Some(done) = current.take() {
        sections.push(close_section(done, text.len()));
    }

    sections
}

/// Finish a level-2 section whose body ends at `end`.
fn close_section(mut section: Section, end: usize) -> Section {
    section.span.end = end;
    if let Some(last) = section.subsections.last_mut() {
        last.span.end = end;
    }
    section
}

/// Attach code blocks and images to the sections whose bodies contain them.
fn attach_to_sections(sections: &mut [Section], code_blocks: &[CodeBlock], images: &[ImageReference]) {
    for section in sections {
        let owned_blocks: Vec<CodeBlock> = code_blocks
            .iter()
            .filter(|b| section.contains(b.offset))
            .cloned()
            .collect();
        let owned_images: Vec<ImageReference> = images
            .iter()
            .filter(|i| section.contains(i.offset))
            .cloned()
            .collect();

        section.code_blocks = owned_blocks;
        section.images = owned_images;

        attach_to_sections(&mut section.subsections, code_blocks, images);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = "---
title: Hello Rust
author: Jane Doe
date: 2025-02-02
tags:
  - rust
  - testing
---

Preamble that belongs to no section.

## Getting Started

Install the toolchain first. Then create a project.

```python
print(1)
```

That prints a number. It exits afterwards. Nothing else.

![Flow](diagrams/mermaid_flow.png)

### Details

- first point
- second point

## Conclusion

* Rust is fast
* Rust is safe
";

    #[test]
    fn test_defaults_without_frontmatter() {
        let doc = ArticleParser::new().parse_content("## Only\nbody\n");

        assert_eq!(doc.title, "Untitled");
        assert_eq!(doc.author, "Unknown");
        assert_eq!(doc.date, "");
        assert!(doc.tags.is_empty());
    }

    #[test]
    fn test_frontmatter_fields() {
        let doc = ArticleParser::new().parse_content(ARTICLE);

        assert_eq!(doc.title, "Hello Rust");
        assert_eq!(doc.author, "Jane Doe");
        assert_eq!(doc.date, "2025-02-02");
        assert_eq!(doc.tags, vec!["rust", "testing"]);
        assert_eq!(doc.raw_content, ARTICLE);
    }

    #[test]
    fn test_malformed_frontmatter_is_ignored() {
        let text = "---\ntitle: [unclosed\n---\n## Section\nbody\n";
        let doc = ArticleParser::new().parse_content(text);

        assert_eq!(doc.title, "Untitled");
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].heading, "Section");
    }

    #[test]
    fn test_non_mapping_frontmatter_is_ignored() {
        let doc = ArticleParser::new().parse_content("---\n- a\n- b\n---\n");
        assert_eq!(doc.title, "Untitled");
        assert!(doc.tags.is_empty());
    }

    #[test]
    fn test_scalar_frontmatter_values() {
        let doc = ArticleParser::new().parse_content("---\ntitle: 42\ntags: solo\n---\n");
        assert_eq!(doc.title, "42");
        assert_eq!(doc.tags, vec!["solo"]);
    }

    #[test]
    fn test_code_block_extraction() {
        let doc = ArticleParser::new().parse_content(ARTICLE);

        assert_eq!(doc.code_blocks.len(), 1);
        let block = &doc.code_blocks[0];
        assert_eq!(block.language, "python");
        assert_eq!(block.code, "print(1)");
        assert_eq!(block.line_count, 1);
        // Sentence splitting does not stop at headings
        assert_eq!(
            block.context_before,
            "## Getting Started\n\nInstall the toolchain first. Then create a project"
        );
        assert_eq!(block.context_after, "That prints a number. It exits afterwards");
    }

    #[test]
    fn test_code_block_without_language() {
        let doc = ArticleParser::new().parse_content("```\nplain\nlines\n```\n");

        assert_eq!(doc.code_blocks[0].language, "text");
        assert_eq!(doc.code_blocks[0].code, "plain\nlines");
        assert_eq!(doc.code_blocks[0].line_count, 2);
    }

    #[test]
    fn test_image_extraction() {
        let text = "![Diagram](diagrams/mermaid_flow.png) and ![Photo](img/photo.png)";
        let doc = ArticleParser::new().parse_content(text);

        assert_eq!(doc.images.len(), 2);
        assert_eq!(doc.images[0].alt_text, "Diagram");
        assert!(doc.images[0].is_diagram);
        assert_eq!(doc.images[1].file_path, "img/photo.png");
        assert!(!doc.images[1].is_diagram);
        assert!(doc.images.iter().all(|i| i.caption.is_empty()));
    }

    #[test]
    fn test_section_tree() {
        let doc = ArticleParser::new().parse_content(ARTICLE);

        let headings: Vec<_> = doc.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec!["Getting Started", "Conclusion"]);
        assert!(doc.sections.iter().all(|s| s.level == 2));

        let started = &doc.sections[0];
        assert!(!started.content.contains("Preamble"));
        assert!(started.content.contains("Install the toolchain first."));
        // Lines under a subsection still belong to the enclosing section
        assert!(started.content.contains("- first point"));

        assert_eq!(started.subsections.len(), 1);
        let details = &started.subsections[0];
        assert_eq!(details.level, 3);
        assert_eq!(details.heading, "Details");
        assert_eq!(details.content, "\n- first point\n- second point\n\n");
    }

    #[test]
    fn test_subsection_before_any_section_is_dropped() {
        let text = "### Orphan\norphan body\n## Real\nreal body\n### Child\nchild body\n";
        let doc = ArticleParser::new().parse_content(text);

        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].heading, "Real");
        assert_eq!(doc.sections[0].subsections.len(), 1);
        assert_eq!(doc.sections[0].subsections[0].heading, "Child");
        assert!(!doc.sections[0].content.contains("orphan"));
    }

    #[test]
    fn test_non_structural_headings_are_body_text() {
        let text = "# Title\n## Section\n#### Deep heading\ntext\n";
        let doc = ArticleParser::new().parse_content(text);

        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].content, "#### Deep heading\ntext\n\n");
    }

    #[test]
    fn test_blocks_and_images_attach_to_enclosing_section() {
        let doc = ArticleParser::new().parse_content(ARTICLE);

        let started = &doc.sections[0];
        assert_eq!(started.code_blocks.len(), 1);
        assert_eq!(started.code_blocks[0].code, "print(1)");
        assert_eq!(started.images.len(), 1);
        assert_eq!(started.images[0].alt_text, "Flow");

        // The subsection starts after both, so it owns neither
        assert!(started.subsections[0].code_blocks.is_empty());
        assert!(started.subsections[0].images.is_empty());

        let conclusion = &doc.sections[1];
        assert!(conclusion.code_blocks.is_empty());
        assert!(conclusion.images.is_empty());
    }

    #[test]
    fn test_blocks_before_first_section_stay_document_level() {
        let text = "Intro.\n```rust\nfn main() {}\n```\n## Section\nbody\n";
        let doc = ArticleParser::new().parse_content(text);

        assert_eq!(doc.code_blocks.len(), 1);
        assert!(doc.sections[0].code_blocks.is_empty());
    }

    #[test]
    fn test_blocks_and_images_attach_to_enclosing_subsection() {
        let text = "## A\n\n### Sub\n\nSee below.\n\n```sh\nls\n```\n\n![Chart](chart.png)\n\n### Sub2\n\nMore.\n\n## B\n\nEnd.\n";
        let doc = ArticleParser::new().parse_content(text);

        let a = &doc.sections[0];
        assert_eq!(a.code_blocks.len(), 1);
        assert_eq!(a.images.len(), 1);

        assert_eq!(a.subsections[0].heading, "Sub");
        assert_eq!(a.subsections[0].code_blocks.len(), 1);
        assert_eq!(a.subsections[0].code_blocks[0].code, "ls");
        assert_eq!(a.subsections[0].images.len(), 1);
        assert_eq!(a.subsections[0].images[0].file_path, "chart.png");

        assert_eq!(a.subsections[1].heading, "Sub2");
        assert!(a.subsections[1].code_blocks.is_empty());
        assert!(a.subsections[1].images.is_empty());

        assert!(doc.sections[1].code_blocks.is_empty());
        assert!(doc.sections[1].images.is_empty());
    }

    #[test]
    fn test_unicode_composed_in_headings_only() {
        let text = "---\ntitle: Cafe\u{0301}\n---\n## Re\u{0301}sume\u{0301}\nna\u{0308}ive\n```text\nc\u{0327}a\n```\n";
        let doc = ArticleParser::new().parse_content(text);

        assert_eq!(doc.title, "Caf\u{00e9}");
        assert_eq!(doc.sections[0].heading, "R\u{00e9}sum\u{00e9}");
        assert!(doc.sections[0].content.starts_with("na\u{0308}ive\n"));
        assert_eq!(doc.code_blocks[0].code, "c\u{0327}a");
        assert_eq!(doc.raw_content, text);
    }

    #[test]
    fn test_crlf_input() {
        let doc = ArticleParser::new().parse_content("---\r\ntitle: T\r\n---\r\n## A\r\n- x\r\n");

        assert_eq!(doc.title, "T");
        assert_eq!(doc.sections[0].heading, "A");
        assert_eq!(doc.sections[0].content, "- x\n\n");
    }

    #[test]
    fn test_parse_file_not_found() {
        let err = ArticleParser::new()
            .parse_file("/definitely/not/here/article.md")
            .unwrap_err();

        match err {
            Error::NotFound(path) => assert_eq!(path, Path::new("/definitely/not/here/article.md")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_file_reads_article() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("article.md");
        std::fs::write(&path, ARTICLE).unwrap();

        let doc = ArticleParser::new().parse_file(&path).unwrap();
        assert_eq!(doc.title, "Hello Rust");
        assert_eq!(doc.sections.len(), 2);
    }
}
