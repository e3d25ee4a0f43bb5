//! Maps planned slides onto shapes and writes the presentation.

use crate::config::{inches, PptxConfig};
use crate::image::LoadedImage;
use crate::package::{write_package, PresentationMetadata, SlideCanvas};
use crate::shape::{Align, Rect, Shape, TextStyle};
use crate::theme::{ColorScheme, Rgb, ThemeTable};
use slides_core::planner::TAKEAWAYS_HEADING;
use slides_core::{
    CodeSlide, ConclusionSlide, ContentSlide, Result, SlideContent, SlideDescription, TitleSlide,
    VisualSlide,
};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

/// Code listings longer than this are cut and marked with an ellipsis.
const MAX_CODE_LINES: usize = 20;

/// At most this many bullets or takeaways are drawn.
const MAX_LIST_ITEMS: usize = 5;

/// Renders slide descriptions into PPTX packages.
#[derive(Debug, Clone)]
pub struct PptxRenderer {
    config: PptxConfig,
    themes: ThemeTable,
    base_dir: Option<PathBuf>,
}

impl PptxRenderer {
    /// Create a renderer with the built-in themes.
    pub fn new(config: PptxConfig) -> Self {
        Self::with_themes(config, ThemeTable::builtin())
    }

    /// Create a renderer with a caller-supplied theme table.
    pub fn with_themes(config: PptxConfig, themes: ThemeTable) -> Self {
        Self {
            config,
            themes,
            base_dir: None,
        }
    }

    /// Resolve relative image paths against `dir` instead of the working directory.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &PptxConfig {
        &self.config
    }

    /// Render slides to a file, creating parent directories as needed.
    pub fn render(
        &self,
        slides: &[SlideDescription],
        output_path: impl AsRef<Path>,
        metadata: &PresentationMetadata,
    ) -> Result<()> {
        let output_path = output_path.as_ref();

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(output_path)?;
        let mut writer = self.render_to_writer(slides, BufWriter::new(file), metadata)?;
        writer.flush()?;

        log::debug!("Wrote {}", output_path.display());
        Ok(())
    }

    /// Render slides into any seekable writer and hand it back.
    pub fn render_to_writer<W: Write + Seek>(
        &self,
        slides: &[SlideDescription],
        writer: W,
        metadata: &PresentationMetadata,
    ) -> Result<W> {
        let canvases = self.layout(slides);
        write_package(writer, &canvases, self.config.slide_size_emu(), metadata)
    }

    /// Render slides to a file, reporting the outcome instead of an error.
    pub fn generate_presentation(
        &self,
        slides: &[SlideDescription],
        output_path: impl AsRef<Path>,
        metadata: &PresentationMetadata,
    ) -> bool {
        let output_path = output_path.as_ref();
        match self.render(slides, output_path, metadata) {
            Ok(()) => {
                log::info!(
                    "Generated presentation with {} slides: {}",
                    slides.len(),
                    output_path.display()
                );
                true
            }
            Err(e) => {
                log::error!("Failed to generate presentation {}: {}", output_path.display(), e);
                false
            }
        }
    }

    /// Lay out every slide.
    pub fn layout(&self, slides: &[SlideDescription]) -> Vec<SlideCanvas> {
        let colors = self.themes.resolve(&self.config.theme);
        let total = slides.len();

        slides
            .iter()
            .enumerate()
            .map(|(idx, slide)| {
                let mut canvas = SlideCanvas::new(colors.background);
                let layout = SlideLayout {
                    config: &self.config,
                    colors: &colors,
                    base_dir: self.base_dir.as_deref(),
                };

                match &slide.content {
                    SlideContent::Title(title) => layout.title(&mut canvas, title),
                    SlideContent::Content(content) => layout.content(&mut canvas, content),
                    SlideContent::Code(code) => layout.code(&mut canvas, code),
                    SlideContent::Visual(visual) => layout.visual(&mut canvas, visual),
                    SlideContent::Conclusion(conclusion) => layout.conclusion(&mut canvas, conclusion),
                }

                if self.config.include_footer && self.config.include_slide_numbers {
                    layout.footer(&mut canvas, idx + 1, total);
                }

                canvas
            })
            .collect()
    }
}

/// Per-slide drawing helpers bound to one config and color scheme.
struct SlideLayout<'a> {
    config: &'a PptxConfig,
    colors: &'a ColorScheme,
    base_dir: Option<&'a Path>,
}

impl SlideLayout<'_> {
    fn style(&self, size_pt: f64, color: Rgb) -> TextStyle {
        TextStyle::new(size_pt, color).font(self.config.default_font.as_str())
    }

    /// Full-width box at the given vertical position.
    fn full_width(&self, y: f64, height: f64) -> Rect {
        Rect::inches(self.config.margin, y, self.config.content_width(), height)
    }

    /// Indented box used for bullet lists.
    fn list_item(&self, y: f64, height: f64) -> Rect {
        let x = self.config.margin + 0.5;
        Rect::inches(x, y, self.config.page_width - self.config.margin - 1.0, height)
    }

    fn title(&self, canvas: &mut SlideCanvas, slide: &TitleSlide) {
        canvas.push(Shape::text_box(
            self.full_width(1.5, 1.5),
            slide.title.as_str(),
            self.style(54.0, self.colors.primary)
                .bold()
                .align(Align::Center)
                .wrapped(),
        ));

        canvas.push(Shape::text_box(
            self.full_width(3.2, 0.5),
            slide.author.as_str(),
            self.style(24.0, self.colors.text).align(Align::Center),
        ));

        let meta = format!("{} | {}", slide.date, slide.tags.join(", "));
        canvas.push(Shape::text_box(
            self.full_width(4.0, 1.0),
            meta,
            self.style(12.0, self.colors.secondary).align(Align::Center),
        ));
    }

    fn content(&self, canvas: &mut SlideCanvas, slide: &ContentSlide) {
        canvas.push(Shape::text_box(
            self.full_width(0.4, 0.8),
            slide.heading.as_str(),
            self.style(40.0, self.colors.primary).bold(),
        ));

        canvas.push(Shape::text_box(
            self.full_width(1.4, 2.0),
            slide.body.as_str(),
            self.style(18.0, self.colors.text).wrapped(),
        ));

        for (i, bullet) in slide.bullet_points.iter().take(MAX_LIST_ITEMS).enumerate() {
            canvas.push(Shape::text_box(
                self.list_item(3.6 + i as f64 * 0.35, 0.3),
                format!("• {}", bullet),
                self.style(14.0, self.colors.text),
            ));
        }
    }

    fn code(&self, canvas: &mut SlideCanvas, slide: &CodeSlide) {
        canvas.push(Shape::text_box(
            Rect::inches(self.config.margin, 0.4, 3.0, 0.3),
            format!("Code: {}", slide.language.to_uppercase()),
            self.style(10.0, self.colors.secondary),
        ));

        canvas.push(Shape::Rectangle {
            rect: self.full_width(1.0, 4.0),
            fill: self.colors.code_background,
            outline: Some(self.colors.accent),
        });

        canvas.push(Shape::text_box(
            Rect::inches(
                self.config.margin + 0.2,
                1.2,
                self.config.content_width() - 0.4,
                3.6,
            ),
            truncate_code(&slide.code),
            TextStyle::new(10.0, self.colors.text)
                .font(self.config.code_font.as_str())
                .wrapped()
                .anchored_top(),
        ));
    }

    fn image_path(&self, file_path: &str) -> PathBuf {
        let path = Path::new(file_path);
        match self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn visual(&self, canvas: &mut SlideCanvas, slide: &VisualSlide) {
        match LoadedImage::load(self.image_path(&slide.file_path)) {
            Some(image) => {
                let width = inches(self.config.content_width());
                let height = image.height_for_width(width);
                let index = canvas.embed(image);
                let origin = Rect::inches(self.config.margin, 0.5, 0.0, 0.0);
                canvas.push(Shape::Picture {
                    rect: Rect {
                        cx: width,
                        cy: height,
                        ..origin
                    },
                    image: index,
                    description: slide.alt_text.clone(),
                });
            }
            None => log::debug!("Image '{}' omitted from slide", slide.file_path),
        }

        if !slide.alt_text.is_empty() {
            canvas.push(Shape::text_box(
                self.full_width(4.8, 0.7),
                slide.alt_text.as_str(),
                self.style(12.0, self.colors.text).italic().align(Align::Center),
            ));
        }
    }

    fn conclusion(&self, canvas: &mut SlideCanvas, slide: &ConclusionSlide) {
        let heading = if slide.heading.is_empty() {
            TAKEAWAYS_HEADING
        } else {
            slide.heading.as_str()
        };
        canvas.push(Shape::text_box(
            self.full_width(0.4, 0.6),
            heading,
            self.style(40.0, self.colors.primary).bold(),
        ));

        for (i, takeaway) in slide.takeaways.iter().take(MAX_LIST_ITEMS).enumerate() {
            canvas.push(Shape::text_box(
                self.list_item(1.3 + i as f64 * 0.65, 0.5),
                format!("✓ {}", takeaway),
                self.style(16.0, self.colors.text),
            ));
        }

        canvas.push(Shape::text_box(
            self.full_width(4.5, 0.8),
            slide.cta.as_str(),
            self.style(14.0, self.colors.secondary).align(Align::Center),
        ));
    }

    fn footer(&self, canvas: &mut SlideCanvas, number: usize, total: usize) {
        canvas.push(Shape::text_box(
            Rect::inches(
                self.config.page_width - 1.0,
                self.config.page_height - 0.325,
                0.8,
                0.25,
            ),
            format!("{}/{}", number, total),
            self.style(8.0, self.colors.text).align(Align::Right),
        ));
    }
}

/// Keep the first lines of a listing, marking the cut.
fn truncate_code(code: &str) -> String {
    let lines: Vec<&str> = code.split('\n').collect();
    if lines.len() <= MAX_CODE_LINES {
        return code.to_string();
    }

    let mut kept = lines[..MAX_CODE_LINES].join("\n");
    kept.push_str("\n...");
    kept
}
