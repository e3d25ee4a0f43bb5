//! Slide descriptions produced by the planner and consumed by renderers.

use serde::{Deserialize, Serialize};

/// One planned slide: what to show plus what the presenter should say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideDescription {
    /// Kind-specific payload, serialized as `type` + `content`.
    #[serde(flatten)]
    pub content: SlideContent,

    /// Speaker notes for this slide.
    pub speaker_notes: String,
}

impl SlideDescription {
    /// Create a slide description.
    pub fn new(content: SlideContent, speaker_notes: impl Into<String>) -> Self {
        Self {
            content,
            speaker_notes: speaker_notes.into(),
        }
    }

    /// The slide kind as a lowercase tag ("title", "content", ...).
    pub fn slide_type(&self) -> &'static str {
        self.content.slide_type()
    }
}

/// Payload of a slide, one shape per slide kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum SlideContent {
    Title(TitleSlide),
    Content(ContentSlide),
    Code(CodeSlide),
    Visual(VisualSlide),
    Conclusion(ConclusionSlide),
}

impl SlideContent {
    /// The slide kind as a lowercase tag.
    pub fn slide_type(&self) -> &'static str {
        match self {
            SlideContent::Title(_) => "title",
            SlideContent::Content(_) => "content",
            SlideContent::Code(_) => "code",
            SlideContent::Visual(_) => "visual",
            SlideContent::Conclusion(_) => "conclusion",
        }
    }
}

/// Opening slide with the article metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TitleSlide {
    pub title: String,
    pub author: String,
    pub date: String,
    pub tags: Vec<String>,
}

/// A section summary: heading, condensed body and a few bullets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentSlide {
    pub heading: String,
    pub body: String,
    pub bullet_points: Vec<String>,
}

/// A code listing with the sentence(s) that introduce it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeSlide {
    pub language: String,
    pub code: String,
    pub context: String,
}

/// An image or diagram.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualSlide {
    pub alt_text: String,
    pub file_path: String,
    pub caption: String,
}

/// Closing slide with takeaways and a call to action.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConclusionSlide {
    pub heading: String,
    pub takeaways: Vec<String>,
    pub cta: String,
}
