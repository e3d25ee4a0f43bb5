//! Core domain types, article parsing, and slide planning
//! for markdown-to-presentation conversion.

pub mod error;
pub mod parser;
pub mod planner;
pub mod slides;
pub mod text;
pub mod types;

pub use error::{Error, Result};
pub use parser::ArticleParser;
pub use planner::SlidePlanner;
pub use slides::{
    CodeSlide, ConclusionSlide, ContentSlide, SlideContent, SlideDescription, TitleSlide,
    VisualSlide,
};
pub use types::{CodeBlock, Document, ImageReference, Section};
