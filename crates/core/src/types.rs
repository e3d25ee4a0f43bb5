//! Domain types for representing a parsed article.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Title used when the article has no frontmatter title.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Author used when the article has no frontmatter author.
pub const DEFAULT_AUTHOR: &str = "Unknown";

/// An entire article with its extracted structure.
///
/// Built once per parse call and not mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Title from frontmatter, or "Untitled".
    pub title: String,

    /// Author from frontmatter, or "Unknown".
    pub author: String,

    /// Publication date from frontmatter, or empty.
    pub date: String,

    /// Tags from frontmatter, in declaration order.
    pub tags: Vec<String>,

    /// Level-2 sections in document order, each owning its level-3 subsections.
    pub sections: Vec<Section>,

    /// Every fenced code block in the article, in document order.
    pub code_blocks: Vec<CodeBlock>,

    /// Every image reference in the article, in document order.
    pub images: Vec<ImageReference>,

    /// The unmodified input text, frontmatter included.
    pub raw_content: String,
}

impl Document {
    /// Estimate how many slides the article needs.
    ///
    /// One title slide, two per level-2 section, one per code block,
    /// one per image and one conclusion slide. This is an estimate only and
    /// does not have to match the length of the generated plan.
    pub fn estimated_slide_count(&self) -> usize {
        let top_level = self.sections.iter().filter(|s| s.level == 2).count();

        1 + top_level * 2 + self.code_blocks.len() + self.images.len() + 1
    }

    /// Find the first section whose heading mentions "conclusion" (any case).
    pub fn conclusion_section(&self) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.heading.to_lowercase().contains("conclusion"))
    }
}

/// A heading together with the body text beneath it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Heading text without the leading hashes.
    pub heading: String,

    /// Heading depth: 2 for top-level sections, 3 for subsections.
    pub level: u8,

    /// Body lines between this heading and the next one, each ending in a newline.
    pub content: String,

    /// Level-3 subsections (always empty for level-3 sections).
    pub subsections: Vec<Section>,

    /// Code blocks that start inside this section's body.
    pub code_blocks: Vec<CodeBlock>,

    /// Images referenced inside this section's body.
    pub images: Vec<ImageReference>,

    /// Byte range of the body within the normalized article text.
    #[serde(skip)]
    pub(crate) span: Range<usize>,
}

impl Section {
    /// Create an empty section.
    pub fn new(heading: impl Into<String>, level: u8) -> Self {
        Self {
            heading: heading.into(),
            level,
            content: String::new(),
            subsections: Vec::new(),
            code_blocks: Vec::new(),
            images: Vec::new(),
            span: 0..0,
        }
    }

    /// Append a body line, terminating it with a newline.
    pub fn push_line(&mut self, line: &str) {
        self.content.push_str(line);
        self.content.push('\n');
    }

    /// Whether the byte offset falls inside this section's body.
    pub(crate) fn contains(&self, offset: usize) -> bool {
        self.span.contains(&offset)
    }
}

/// A fenced code block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Language tag after the opening fence, or "text".
    pub language: String,

    /// Trimmed code text.
    pub code: String,

    /// Up to two sentences preceding the block (max 200 characters).
    pub context_before: String,

    /// Up to two sentences following the block (max 200 characters).
    pub context_after: String,

    /// Number of lines in `code`.
    pub line_count: usize,

    /// Byte offset of the opening fence within the normalized article text.
    #[serde(skip)]
    pub(crate) offset: usize,
}

impl CodeBlock {
    /// Create a code block without surrounding context.
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        let code = code.into();
        let line_count = code.trim().split('\n').count();

        Self {
            language: language.into(),
            code,
            context_before: String::new(),
            context_after: String::new(),
            line_count,
            offset: 0,
        }
    }

    /// Attach the surrounding prose.
    pub fn with_context(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.context_before = before.into();
        self.context_after = after.into();
        self
    }
}

/// An image or diagram reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReference {
    /// Alt text between the brackets.
    pub alt_text: String,

    /// Path or URL between the parentheses.
    pub file_path: String,

    /// Caption. The parser never fills this in.
    pub caption: String,

    /// True for Mermaid/PlantUML renders, detected from the path.
    pub is_diagram: bool,

    /// Byte offset of the reference within the normalized article text.
    #[serde(skip)]
    pub(crate) offset: usize,
}

impl ImageReference {
    /// Create an image reference, classifying it as a diagram from its path.
    pub fn new(alt_text: impl Into<String>, file_path: impl Into<String>) -> Self {
        let file_path = file_path.into();
        let lowered = file_path.to_lowercase();
        let is_diagram = lowered.contains("mermaid") || lowered.contains("plantuml");

        Self {
            alt_text: alt_text.into(),
            file_path,
            caption: String::new(),
            is_diagram,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_with_sections(headings: &[&str]) -> Document {
        Document {
            title: DEFAULT_TITLE.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            date: String::new(),
            tags: Vec::new(),
            sections: headings.iter().map(|h| Section::new(*h, 2)).collect(),
            code_blocks: Vec::new(),
            images: Vec::new(),
            raw_content: String::new(),
        }
    }

    #[test]
    fn test_estimated_slide_count_sections_only() {
        let doc = document_with_sections(&["Intro", "Details"]);
        assert_eq!(doc.estimated_slide_count(), 6);
    }

    #[test]
    fn test_estimated_slide_count_counts_flat_blocks_and_images() {
        let mut doc = document_with_sections(&["Intro"]);
        doc.code_blocks.push(CodeBlock::new("rust", "fn main() {}"));
        doc.code_blocks.push(CodeBlock::new("text", "hello"));
        doc.images.push(ImageReference::new("Photo", "img/photo.png"));

        assert_eq!(doc.estimated_slide_count(), 1 + 2 + 2 + 1 + 1);
    }

    #[test]
    fn test_code_block_line_count() {
        assert_eq!(CodeBlock::new("python", "print(1)").line_count, 1);
        assert_eq!(CodeBlock::new("python", "a = 1\nb = 2\n").line_count, 2);
        assert_eq!(CodeBlock::new("text", "").line_count, 1);
    }

    #[test]
    fn test_image_diagram_detection() {
        assert!(ImageReference::new("Diagram", "diagrams/mermaid_flow.png").is_diagram);
        assert!(ImageReference::new("Seq", "out/PlantUML/seq.svg").is_diagram);
        assert!(!ImageReference::new("Photo", "img/photo.png").is_diagram);
    }

    #[test]
    fn test_conclusion_section_is_case_insensitive() {
        let doc = document_with_sections(&["Intro", "Final CONCLUSIONS", "Conclusion"]);
        let found = doc.conclusion_section().map(|s| s.heading.as_str());
        assert_eq!(found, Some("Final CONCLUSIONS"));

        let doc = document_with_sections(&["Intro"]);
        assert!(doc.conclusion_section().is_none());
    }
}
