//! PPTX (Office Open XML) renderer for planned slides.
//!
//! Lays each [`slides_core::SlideDescription`] out as text boxes, shapes and
//! pictures, then writes a .pptx ZIP package.

pub mod config;
pub mod image;
pub mod package;
pub mod renderer;
pub mod shape;
pub mod template;
pub mod theme;

pub use config::PptxConfig;
pub use package::{PresentationMetadata, SlideCanvas};
pub use renderer::PptxRenderer;
pub use theme::{ColorScheme, Rgb, ThemeTable};
