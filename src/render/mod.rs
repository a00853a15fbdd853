pub mod fonts;
pub mod layout;
pub mod pdf;

use std::path::Path;

use anyhow::Context as _;

use crate::cli::RenderArgs;
use crate::formats::Record;

use self::fonts::FontSet;
pub use self::layout::{Layout, Measure, Weight, layout};

pub const DEFAULT_SUBHEADING: &str = "Información de la pareja";
pub const DEFAULT_TOC_TITLE: &str = "Índice / Table of Contents";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderStyle {
    /// Continuous flow: title, then body lines.
    Flow,
    /// Continuous flow framed by rule lines and labels.
    Sheet,
    /// One page per record with bold headings.
    Book,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub style: RenderStyle,
    pub normalize_typography: bool,
    pub table_of_contents: bool,
    pub page_numbers: bool,
    pub subheading: String,
    pub toc_title: String,
}

impl RenderOptions {
    pub fn for_style(style: RenderStyle) -> Self {
        let book = style == RenderStyle::Book;
        Self {
            style,
            normalize_typography: style == RenderStyle::Flow,
            table_of_contents: book,
            page_numbers: book,
            subheading: DEFAULT_SUBHEADING.to_owned(),
            toc_title: DEFAULT_TOC_TITLE.to_owned(),
        }
    }

    pub fn needs_bold(&self) -> bool {
        self.style == RenderStyle::Book || self.table_of_contents
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    /// 1-based page where the record's content begins.
    pub page: usize,
}

pub fn normalize_typography(text: &str) -> String {
    text.replace('…', "...").replace('—', "-")
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let options = args.options();
    let records = crate::record_store::read_records(&args.input, args.input_format)
        .context("read records")?;
    tracing::info!(records = records.len(), input = %args.input.display(), "read records");

    let bold = options.needs_bold().then_some(args.bold_font.as_path());
    let fonts = FontSet::load(&args.font, bold)?;

    let pages = render_to_file(&records, &options, &fonts, &args.title, &args.out)?;
    println!(
        "PDF generated: {} ({} records, {pages} pages)",
        args.out.display(),
        records.len()
    );
    Ok(())
}

pub fn render_pdf(
    records: &[Record],
    options: &RenderOptions,
    fonts: &FontSet,
    title: &str,
) -> anyhow::Result<(Layout, Vec<u8>)> {
    if options.needs_bold() && fonts.bold.is_none() {
        anyhow::bail!("{:?} style needs a bold font", options.style);
    }

    let layout = layout(records, options, fonts);
    let missing = missing_glyphs(&layout, fonts);
    if !missing.is_empty() {
        tracing::warn!(chars = %missing, "font has no glyphs for some characters");
    }
    let bytes = pdf::write(&layout, fonts, title).context("write pdf")?;
    Ok((layout, bytes))
}

/// Distinct characters in the layout that the chosen faces cannot draw.
pub fn missing_glyphs(layout: &Layout, fonts: &FontSet) -> String {
    let mut missing = Vec::new();
    for run in layout.pages.iter().flat_map(|page| &page.runs) {
        let face = fonts.face(run.weight);
        for ch in run.text.chars() {
            if !ch.is_whitespace() && !face.covers(ch) && !missing.contains(&ch) {
                missing.push(ch);
            }
        }
    }
    missing.into_iter().collect()
}

/// Renders and writes the document; returns the number of pages.
pub fn render_to_file(
    records: &[Record],
    options: &RenderOptions,
    fonts: &FontSet,
    title: &str,
    out: &Path,
) -> anyhow::Result<usize> {
    let (layout, bytes) = render_pdf(records, options, fonts, title)?;

    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create pdf output dir: {}", parent.display()))?;
    }
    std::fs::write(out, bytes).with_context(|| format!("write pdf: {}", out.display()))?;

    tracing::info!(pages = layout.pages.len(), out = %out.display(), "pdf written");
    Ok(layout.pages.len())
}
