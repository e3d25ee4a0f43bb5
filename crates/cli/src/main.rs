//! CLI tool for turning markdown articles into presentations.

use anyhow::{Context, Result};
use clap::Parser;
use slides_core::{ArticleParser, Document, SlideDescription, SlidePlanner};
use slides_pptx::{PptxConfig, PptxRenderer, PresentationMetadata};
use std::path::{Path, PathBuf};

/// Create a slide deck from a markdown article.
#[derive(Parser, Debug)]
#[command(name = "slides-create")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input markdown article
    input: PathBuf,

    /// Output .pptx file (default: input path with a .pptx extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// YAML file with renderer settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Color theme (light, dark, technical)
    #[arg(short, long)]
    theme: Option<String>,

    /// Aspect ratio as W:H, e.g. 16:9 or 4:3
    #[arg(long)]
    aspect_ratio: Option<String>,

    /// Font for non-code text
    #[arg(long)]
    font: Option<String>,

    /// Font for code listings
    #[arg(long)]
    code_font: Option<String>,

    /// Leave out the footer
    #[arg(long)]
    no_footer: bool,

    /// Leave out slide numbers
    #[arg(long)]
    no_slide_numbers: bool,

    /// Print the slide plan as JSON instead of rendering
    #[arg(long)]
    plan: bool,

    /// Print the estimated slide count and exit
    #[arg(long)]
    estimate: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let parser = ArticleParser::new();
    let doc = parser
        .parse_file(&args.input)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;

    let planner = SlidePlanner::new();

    if args.estimate {
        println!("{}", planner.estimate_slide_count(&doc));
        return Ok(());
    }

    let slides = planner.create_slide_plan(&doc);
    if args.verbose {
        eprintln!("Planned {} slides for \"{}\"", slides.len(), doc.title);
    }

    if args.plan {
        let json = serde_json::to_string_pretty(&slides).context("Failed to serialize slide plan")?;
        println!("{}", json);
        return Ok(());
    }

    let config = build_config(&args)?;
    let output_path = get_output_path(&args.input, args.output.as_deref());

    let article_dir = args.input.parent().unwrap_or_else(|| Path::new(""));
    render(&slides, &doc, config, article_dir, &output_path)?;
    if args.verbose {
        eprintln!("Written to: {}", output_path.display());
    }

    Ok(())
}

/// Start from the config file (or defaults) and apply command-line overrides.
fn build_config(args: &Args) -> Result<PptxConfig> {
    let mut config = match &args.config {
        Some(path) => PptxConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PptxConfig::new(),
    };

    if let Some(theme) = &args.theme {
        config = config.with_theme(theme.as_str());
    }
    if let Some(ratio) = &args.aspect_ratio {
        config = config
            .with_aspect_ratio(ratio)
            .with_context(|| format!("Invalid aspect ratio '{}'", ratio))?;
    }
    if let Some(font) = &args.font {
        config = config.with_default_font(font.as_str());
    }
    if let Some(font) = &args.code_font {
        config = config.with_code_font(font.as_str());
    }
    if args.no_footer {
        config = config.with_footer(false);
    }
    if args.no_slide_numbers {
        config = config.with_slide_numbers(false);
    }

    Ok(config)
}

/// Render the plan, attaching the article's metadata to the package.
///
/// Relative image paths are resolved against `article_dir`.
fn render(
    slides: &[SlideDescription],
    doc: &Document,
    config: PptxConfig,
    article_dir: &Path,
    output_path: &Path,
) -> Result<()> {
    let metadata = PresentationMetadata {
        title: doc.title.clone(),
        author: doc.author.clone(),
        subject: doc.tags.join(", "),
    };

    PptxRenderer::new(config)
        .with_base_dir(article_dir)
        .render(slides, output_path, &metadata)
        .with_context(|| format!("Failed to write {}", output_path.display()))
}

/// Determine the output path for an article.
fn get_output_path(input_path: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => input_path.with_extension("pptx"),
    }
}
