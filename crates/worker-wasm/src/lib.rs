//! WASM-compatible wrapper for article slide planning and rendering.
//!
//! This crate exposes the planner and the PPTX renderer to JavaScript
//! for use in Cloudflare Workers.

use serde::{Deserialize, Serialize};
use slides_core::{ArticleParser, SlideDescription, SlidePlanner};
use slides_pptx::{PptxConfig, PptxRenderer, PresentationMetadata};
use std::io::Cursor;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of planning an article.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlanResult {
    /// Article title from the frontmatter, or "Untitled".
    pub title: String,
    /// Slide count estimated from the document structure.
    pub estimated_slides: usize,
    /// The planned slides, in order.
    pub slides: Vec<SlideDescription>,
}

/// Plan the slides for a markdown article.
///
/// # Arguments
/// * `markdown` - The article text, optionally with YAML frontmatter
///
/// # Returns
/// A JavaScript object `{ title, estimated_slides, slides }`.
#[wasm_bindgen]
pub fn plan_article(markdown: &str) -> Result<JsValue, JsValue> {
    let result = plan_article_impl(markdown);

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn plan_article_impl(markdown: &str) -> PlanResult {
    let doc = ArticleParser::new().parse_content(markdown);
    let planner = SlidePlanner::new();

    PlanResult {
        estimated_slides: planner.estimate_slide_count(&doc),
        slides: planner.create_slide_plan(&doc),
        title: doc.title,
    }
}

/// Render a markdown article to PPTX bytes.
///
/// # Arguments
/// * `markdown` - The article text
/// * `theme` - Color theme name (`light`, `dark` or `technical`); defaults when absent
///
/// # Returns
/// A `Uint8Array` holding the .pptx file, or throws on error.
#[wasm_bindgen]
pub fn render_article(markdown: &str, theme: Option<String>) -> Result<js_sys::Uint8Array, JsValue> {
    let bytes = render_article_impl(markdown, theme.as_deref()).map_err(|e| JsValue::from_str(&e))?;
    Ok(js_sys::Uint8Array::from(bytes.as_slice()))
}

fn render_article_impl(markdown: &str, theme: Option<&str>) -> Result<Vec<u8>, String> {
    let doc = ArticleParser::new().parse_content(markdown);
    let slides = SlidePlanner::new().create_slide_plan(&doc);

    let mut config = PptxConfig::new();
    if let Some(theme) = theme.filter(|t| !t.is_empty()) {
        config = config.with_theme(theme);
    }

    let metadata = PresentationMetadata {
        title: doc.title.clone(),
        author: doc.author.clone(),
        subject: doc.tags.join(", "),
    };

    let cursor = PptxRenderer::new(config)
        .render_to_writer(&slides, Cursor::new(Vec::new()), &metadata)
        .map_err(|e| format!("PPTX rendering error: {}", e))?;

    Ok(cursor.into_inner())
}
