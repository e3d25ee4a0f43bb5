//! Slide planning.
//!
//! Walks a parsed [`Document`] and emits an ordered slide plan: one title
//! slide, a content slide per level-2 section followed by that section's code
//! and visual slides, and a closing conclusion slide.

use crate::slides::{
    CodeSlide, ConclusionSlide, ContentSlide, SlideContent, SlideDescription, TitleSlide,
    VisualSlide,
};
use crate::text::{condense_text, extract_bullet_points, truncate_chars};
use crate::types::{CodeBlock, Document, ImageReference, Section};

/// Heading of the closing slide.
pub const TAKEAWAYS_HEADING: &str = "Key Takeaways";

/// Call to action shown on the closing slide.
pub const CALL_TO_ACTION: &str = "Check out the full article and code examples";

/// Builds slide plans from parsed articles.
#[derive(Debug, Clone)]
pub struct SlidePlanner {
    /// Word budget for condensed section bodies.
    max_words: usize,

    /// Maximum bullets per content slide and takeaways on the closing slide.
    max_bullets: usize,

    /// Maximum characters of section text copied into speaker notes.
    notes_limit: usize,
}

impl Default for SlidePlanner {
    fn default() -> Self {
        Self {
            max_words: 100,
            max_bullets: 5,
            notes_limit: 500,
        }
    }
}

impl SlidePlanner {
    /// Create a planner with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the word budget for condensed section bodies.
    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    /// Set how many bullets (and takeaways) a slide may carry.
    pub fn with_max_bullets(mut self, max_bullets: usize) -> Self {
        self.max_bullets = max_bullets;
        self
    }

    /// Set how many characters of section text go into speaker notes.
    pub fn with_notes_limit(mut self, notes_limit: usize) -> Self {
        self.notes_limit = notes_limit;
        self
    }

    /// Estimate the slide count of a document.
    pub fn estimate_slide_count(&self, doc: &Document) -> usize {
        doc.estimated_slide_count()
    }

    /// Build the ordered slide plan for a document.
    ///
    /// The first slide is always a title slide and the last one always a
    /// conclusion slide.
    pub fn create_slide_plan(&self, doc: &Document) -> Vec<SlideDescription> {
        let mut slides = vec![self.title_slide(doc)];

        for section in doc.sections.iter().filter(|s| s.level == 2) {
            slides.push(self.content_slide(section));
            slides.extend(section.code_blocks.iter().map(code_slide));
            slides.extend(section.images.iter().map(visual_slide));
        }

        slides.push(self.conclusion_slide(doc));

        log::debug!(
            "Planned {} slides (estimated {})",
            slides.len(),
            doc.estimated_slide_count()
        );

        slides
    }

    fn title_slide(&self, doc: &Document) -> SlideDescription {
        let notes = format!("Presenting: {}\nAuthor: {}", doc.title, doc.author);

        SlideDescription::new(
            SlideContent::Title(TitleSlide {
                title: doc.title.clone(),
                author: doc.author.clone(),
                date: doc.date.clone(),
                tags: doc.tags.clone(),
            }),
            notes,
        )
    }

    fn content_slide(&self, section: &Section) -> SlideDescription {
        SlideDescription::new(
            SlideContent::Content(ContentSlide {
                heading: section.heading.clone(),
                body: condense_text(&section.content, self.max_words),
                bullet_points: extract_bullet_points(&section.content, self.max_bullets),
            }),
            truncate_chars(&section.content, self.notes_limit),
        )
    }

    /// Closing slide built from the conclusion section.
    ///
    /// Takeaways come from the conclusion section's list items, falling back
    /// to the first section's list items when there are none.
    fn conclusion_slide(&self, doc: &Document) -> SlideDescription {
        let conclusion = doc.conclusion_section().map_or("", |s| s.content.as_str());

        let mut takeaways = extract_bullet_points(conclusion, self.max_bullets);
        if takeaways.is_empty() {
            let first = doc.sections.first().map_or("", |s| s.content.as_str());
            takeaways = extract_bullet_points(first, self.max_bullets);
        }

        SlideDescription::new(
            SlideContent::Conclusion(ConclusionSlide {
                heading: TAKEAWAYS_HEADING.to_string(),
                takeaways,
                cta: CALL_TO_ACTION.to_string(),
            }),
            truncate_chars(conclusion, self.notes_limit),
        )
    }
}

fn code_slide(block: &CodeBlock) -> SlideDescription {
    SlideDescription::new(
        SlideContent::Code(CodeSlide {
            language: block.language.clone(),
            code: block.code.clone(),
            context: block.context_before.clone(),
        }),
        format!("{}\n\n{}", block.context_before, block.context_after),
    )
}

fn visual_slide(image: &ImageReference) -> SlideDescription {
    SlideDescription::new(
        SlideContent::Visual(VisualSlide {
            alt_text: image.alt_text.clone(),
            file_path: image.file_path.clone(),
            caption: image.caption.clone(),
        }),
        image.caption.clone(),
    )
}
