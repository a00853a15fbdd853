//! Page composition in millimetres, top-left origin.
//!
//! Mirrors the classic single-column report model: A4, 10 mm margins, an
//! automatic page break 15 mm above the bottom edge, and text cells that wrap
//! at spaces.

use crate::formats::Record;

use super::{RenderOptions, RenderStyle, TocEntry, normalize_typography};

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 10.0;
pub const BREAK_MARGIN: f32 = 15.0;
/// Inner padding of a text cell.
pub const CELL_MARGIN: f32 = 1.0;

const MM_PER_PT: f32 = 25.4 / 72.0;
const RULE: &str = "_________________________";
const TOC_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

pub trait Measure {
    /// Width of `text` in millimetres.
    fn text_width(&self, text: &str, weight: Weight, size_pt: f32) -> f32;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    /// Distance of the baseline from the top edge.
    pub baseline: f32,
    pub size_pt: f32,
    pub weight: Weight,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub runs: Vec<TextRun>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub pages: Vec<Page>,
    /// One entry per record, in record order.
    pub toc: Vec<TocEntry>,
}

impl Layout {
    pub fn uses_bold(&self) -> bool {
        self.pages
            .iter()
            .flat_map(|page| &page.runs)
            .any(|run| run.weight == Weight::Bold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

struct Composer<'a, M: ?Sized> {
    measure: &'a M,
    pages: Vec<Page>,
    y: f32,
    weight: Weight,
    size_pt: f32,
}

impl<'a, M: Measure + ?Sized> Composer<'a, M> {
    fn new(measure: &'a M) -> Self {
        Self {
            measure,
            pages: Vec::new(),
            y: MARGIN,
            weight: Weight::Regular,
            size_pt: 12.0,
        }
    }

    fn set_font(&mut self, weight: Weight, size_pt: f32) {
        self.weight = weight;
        self.size_pt = size_pt;
    }

    fn add_page(&mut self) {
        self.pages.push(Page::default());
        self.y = MARGIN;
    }

    /// 1-based number of the current page.
    fn page_no(&self) -> usize {
        self.pages.len()
    }

    fn ln(&mut self, height: f32) {
        self.y += height;
    }

    /// Lays out `text` as wrapped lines of `line_height`; returns the page the
    /// first line landed on.
    fn multi_cell(&mut self, line_height: f32, text: &str, align: Align) -> usize {
        if self.pages.is_empty() {
            self.add_page();
        }

        let max_width = PAGE_WIDTH - 2.0 * MARGIN - 2.0 * CELL_MARGIN;
        let mut first_page = None;
        for line in text.split('\n') {
            for wrapped in self.wrap(line, max_width) {
                if self.y + line_height > PAGE_HEIGHT - BREAK_MARGIN {
                    self.add_page();
                }
                first_page.get_or_insert(self.page_no());

                if !wrapped.is_empty() {
                    let width = self.measure.text_width(&wrapped, self.weight, self.size_pt);
                    let offset = match align {
                        Align::Left => 0.0,
                        Align::Center => ((max_width - width) / 2.0).max(0.0),
                    };
                    let run = TextRun {
                        text: wrapped,
                        x: MARGIN + CELL_MARGIN + offset,
                        baseline: self.y + line_height / 2.0 + 0.3 * self.size_pt * MM_PER_PT,
                        size_pt: self.size_pt,
                        weight: self.weight,
                    };
                    if let Some(page) = self.pages.last_mut() {
                        page.runs.push(run);
                    }
                }
                self.y += line_height;
            }
        }

        first_page.unwrap_or_else(|| self.page_no())
    }

    fn wrap(&self, text: &str, max_width: f32) -> Vec<String> {
        let fits = |candidate: &str| {
            self.measure.text_width(candidate, self.weight, self.size_pt) <= max_width
        };

        let mut lines = Vec::new();
        let mut current = String::new();
        for word in text.split(' ').filter(|word| !word.is_empty()) {
            let candidate = if current.is_empty() {
                word.to_owned()
            } else {
                format!("{current} {word}")
            };
            if fits(&candidate) {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if fits(word) {
                current = word.to_owned();
                continue;
            }

            for ch in word.chars() {
                current.push(ch);
                if !fits(&current) && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }

        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn footer(&mut self, text: &str, page_index: usize) {
        let size_pt = 10.0;
        let height = 10.0;
        let max_width = PAGE_WIDTH - 2.0 * MARGIN - 2.0 * CELL_MARGIN;
        let width = self.measure.text_width(text, Weight::Regular, size_pt);
        let run = TextRun {
            text: text.to_owned(),
            x: MARGIN + CELL_MARGIN + ((max_width - width) / 2.0).max(0.0),
            baseline: PAGE_HEIGHT - BREAK_MARGIN + height / 2.0 + 0.3 * size_pt * MM_PER_PT,
            size_pt,
            weight: Weight::Regular,
        };
        if let Some(page) = self.pages.get_mut(page_index) {
            page.runs.push(run);
        }
    }
}

pub fn layout<M: Measure + ?Sized>(records: &[Record], options: &RenderOptions, measure: &M) -> Layout {
    let mut composer = Composer::new(measure);
    let mut toc = Vec::with_capacity(records.len());

    if options.style != RenderStyle::Book {
        composer.add_page();
    }

    for record in records {
        let (title, body) = (record.title.trim(), record.body_text.trim());
        let (title, body) = if options.normalize_typography {
            (normalize_typography(title), normalize_typography(body))
        } else {
            (title.to_owned(), body.to_owned())
        };

        let page = match options.style {
            RenderStyle::Flow => flow_record(&mut composer, &title, &body),
            RenderStyle::Sheet => sheet_record(&mut composer, &title, &body, &options.subheading),
            RenderStyle::Book => book_record(&mut composer, &title, &body, &options.subheading),
        };
        toc.push(TocEntry { title, page });
    }

    if options.table_of_contents {
        toc_pages(&mut composer, &options.toc_title, &toc);
    }

    if options.page_numbers {
        let total = composer.pages.len();
        for index in 0..total {
            composer.footer(&format!("Page {}/{total}", index + 1), index);
        }
    }

    Layout {
        pages: composer.pages,
        toc,
    }
}

fn flow_record<M: Measure + ?Sized>(c: &mut Composer<'_, M>, title: &str, body: &str) -> usize {
    c.set_font(Weight::Regular, 12.0);
    let page = c.multi_cell(10.0, title, Align::Left);
    c.ln(5.0);
    for line in body.split('\n') {
        c.multi_cell(10.0, line, Align::Left);
    }
    c.ln(10.0);
    page
}

fn sheet_record<M: Measure + ?Sized>(
    c: &mut Composer<'_, M>,
    title: &str,
    body: &str,
    subheading: &str,
) -> usize {
    c.set_font(Weight::Regular, 12.0);
    let page = c.multi_cell(8.0, RULE, Align::Left);
    c.ln(3.0);
    c.multi_cell(8.0, &format!("Pareja: {title}"), Align::Left);
    c.ln(4.0);
    c.multi_cell(8.0, &format!("{subheading}:"), Align::Left);
    c.ln(4.0);
    for line in body.split('\n') {
        c.multi_cell(8.0, line, Align::Left);
    }
    c.ln(4.0);
    c.multi_cell(8.0, RULE, Align::Left);
    c.ln(10.0);
    page
}

fn book_record<M: Measure + ?Sized>(
    c: &mut Composer<'_, M>,
    title: &str,
    body: &str,
    subheading: &str,
) -> usize {
    c.add_page();
    let page = c.page_no();

    c.set_font(Weight::Bold, 18.0);
    c.multi_cell(10.0, title, Align::Left);
    c.ln(5.0);

    c.set_font(Weight::Bold, 14.0);
    c.multi_cell(8.0, subheading, Align::Left);
    c.ln(5.0);

    c.set_font(Weight::Regular, 12.0);
    for line in body.split('\n') {
        c.multi_cell(8.0 * 1.5, line, Align::Left);
    }
    c.ln(5.0);
    page
}

fn toc_pages<M: Measure + ?Sized>(c: &mut Composer<'_, M>, toc_title: &str, entries: &[TocEntry]) {
    c.add_page();
    c.set_font(Weight::Bold, 18.0);
    c.multi_cell(10.0, toc_title, Align::Center);
    c.ln(10.0);

    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|entry| entry.title.to_lowercase());

    c.set_font(Weight::Regular, 12.0);
    for entry in &sorted {
        c.multi_cell(8.0, &toc_line(entry), Align::Left);
    }
}

/// `• title ....... page`, dot-filled to a fixed title width.
pub fn toc_line(entry: &TocEntry) -> String {
    let dots = ".".repeat(TOC_WIDTH.saturating_sub(entry.title.chars().count()));
    format!("• {} {dots} {}", entry.title, entry.page)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is half an em wide.
    struct HalfEm;

    impl Measure for HalfEm {
        fn text_width(&self, text: &str, _weight: Weight, size_pt: f32) -> f32 {
            text.chars().count() as f32 * size_pt * MM_PER_PT * 0.5
        }
    }

    fn texts(page: &Page) -> Vec<&str> {
        page.runs.iter().map(|run| run.text.as_str()).collect()
    }

    fn footer_free(style: RenderStyle) -> RenderOptions {
        RenderOptions {
            page_numbers: false,
            table_of_contents: false,
            ..RenderOptions::for_style(style)
        }
    }

    #[test]
    fn book_lays_out_one_page_per_record_and_sorted_toc() {
        let records = vec![
            Record::new("B", "https://e.x/b", "x"),
            Record::new("a", "https://e.x/a", "line1\nline2"),
        ];
        let options = RenderOptions {
            page_numbers: false,
            ..RenderOptions::for_style(RenderStyle::Book)
        };

        let layout = layout(&records, &options, &HalfEm);

        assert_eq!(layout.pages.len(), 3);
        assert_eq!(texts(&layout.pages[0]), vec!["B", "Información de la pareja", "x"]);
        assert_eq!(
            texts(&layout.pages[1]),
            vec!["a", "Información de la pareja", "line1", "line2"]
        );
        assert_eq!(
            layout.toc,
            vec![
                TocEntry { title: "B".to_owned(), page: 1 },
                TocEntry { title: "a".to_owned(), page: 2 },
            ]
        );

        let toc_page = texts(&layout.pages[2]);
        assert_eq!(toc_page[0], "Índice / Table of Contents");
        assert!(toc_page[1].starts_with("• a ....") && toc_page[1].ends_with(" 2"));
        assert!(toc_page[2].starts_with("• B ....") && toc_page[2].ends_with(" 1"));
    }

    #[test]
    fn book_headings_are_bold_and_body_uses_wider_spacing() {
        let records = vec![Record::new("A", "", "line1\nline2")];

        let layout = layout(&records, &footer_free(RenderStyle::Book), &HalfEm);
        let runs = &layout.pages[0].runs;

        assert_eq!(runs[0].weight, Weight::Bold);
        assert_eq!(runs[0].size_pt, 18.0);
        assert_eq!(runs[1].weight, Weight::Bold);
        assert_eq!(runs[1].size_pt, 14.0);
        assert_eq!(runs[2].weight, Weight::Regular);
        assert!((runs[3].baseline - runs[2].baseline - 12.0).abs() < 1e-3);
        assert!(layout.uses_bold());
    }

    #[test]
    fn flow_breaks_pages_at_the_bottom_margin() {
        let body = (1..=30).map(|n| format!("linea {n}")).collect::<Vec<_>>().join("\n");
        let records = vec![Record::new("Title", "", body)];

        let layout = layout(&records, &footer_free(RenderStyle::Flow), &HalfEm);

        assert_eq!(layout.pages.len(), 2);
        // Title plus 25 body lines fit above the 282 mm break line.
        assert_eq!(layout.pages[0].runs.len(), 26);
        assert_eq!(texts(&layout.pages[1]), vec!["linea 26", "linea 27", "linea 28", "linea 29", "linea 30"]);
        for page in &layout.pages {
            for run in &page.runs {
                assert!(run.baseline < PAGE_HEIGHT - BREAK_MARGIN);
            }
        }
        assert!(!layout.uses_bold());
    }

    #[test]
    fn flow_keeps_records_in_input_order_on_one_page() {
        let records = vec![
            Record::new("A", "", "line1\nline2"),
            Record::new("B", "", "x"),
        ];

        let layout = layout(&records, &footer_free(RenderStyle::Flow), &HalfEm);

        assert_eq!(layout.pages.len(), 1);
        assert_eq!(texts(&layout.pages[0]), vec!["A", "line1", "line2", "B", "x"]);
        assert_eq!(layout.toc.iter().map(|e| e.page).collect::<Vec<_>>(), vec![1, 1]);
    }

    #[test]
    fn sheet_frames_each_record_with_rules_and_labels() {
        let records = vec![Record::new("Ana y Bruno", "", "Texto")];

        let layout = layout(&records, &footer_free(RenderStyle::Sheet), &HalfEm);

        assert_eq!(
            texts(&layout.pages[0]),
            vec![
                RULE,
                "Pareja: Ana y Bruno",
                "Información de la pareja:",
                "Texto",
                RULE
            ]
        );
    }

    #[test]
    fn sheet_label_follows_the_subheading_option() {
        let records = vec![Record::new("Ana y Bruno", "", "Texto")];
        let options = RenderOptions {
            subheading: "Sobre la pareja".to_owned(),
            ..footer_free(RenderStyle::Sheet)
        };

        let layout = layout(&records, &options, &HalfEm);

        assert_eq!(texts(&layout.pages[0])[2], "Sobre la pareja:");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed_before_layout() {
        let records = vec![Record::new("  Ana \n", "", "\n  Texto con sangría\n\nFin.\n")];

        let layout = layout(&records, &footer_free(RenderStyle::Flow), &HalfEm);

        assert_eq!(texts(&layout.pages[0]), vec!["Ana", "Texto con sangría", "Fin."]);
        assert_eq!(layout.toc[0].title, "Ana");
    }

    #[test]
    fn long_paragraphs_wrap_within_the_text_width() {
        let words = vec!["palabra"; 40];
        let records = vec![Record::new("T", "", words.join(" "))];

        let layout = layout(&records, &footer_free(RenderStyle::Flow), &HalfEm);
        let body = &layout.pages[0].runs[1..];

        assert!(body.len() > 1);
        let max_width = PAGE_WIDTH - 2.0 * MARGIN - 2.0 * CELL_MARGIN;
        for run in body {
            assert!(HalfEm.text_width(&run.text, run.weight, run.size_pt) <= max_width);
        }
        let rejoined = body.iter().map(|r| r.text.as_str()).collect::<Vec<_>>().join(" ");
        assert_eq!(rejoined, words.join(" "));
    }

    #[test]
    fn overlong_words_are_broken_by_characters() {
        let word = "x".repeat(200);
        let records = vec![Record::new("T", "", word.clone())];

        let layout = layout(&records, &footer_free(RenderStyle::Flow), &HalfEm);
        let body = &layout.pages[0].runs[1..];

        assert_eq!(body.len(), 3);
        assert_eq!(body.iter().map(|r| r.text.as_str()).collect::<String>(), word);
    }

    #[test]
    fn blank_body_lines_keep_their_height() {
        let records = vec![Record::new("T", "", "uno\n\ndos")];

        let layout = layout(&records, &footer_free(RenderStyle::Flow), &HalfEm);
        let runs = &layout.pages[0].runs;

        assert_eq!(texts(&layout.pages[0]), vec!["T", "uno", "dos"]);
        assert!((runs[2].baseline - runs[1].baseline - 20.0).abs() < 1e-3);
    }

    #[test]
    fn normalization_replaces_ellipsis_and_em_dash() {
        let records = vec![Record::new("Fin…", "", "Espera… —dijo—")];
        let options = RenderOptions {
            normalize_typography: true,
            ..footer_free(RenderStyle::Flow)
        };

        let layout = layout(&records, &options, &HalfEm);

        assert_eq!(texts(&layout.pages[0]), vec!["Fin...", "Espera... -dijo-"]);
    }

    #[test]
    fn without_normalization_text_is_untouched() {
        let records = vec![Record::new("T", "", "Espera… —dijo—")];
        let options = RenderOptions {
            normalize_typography: false,
            ..footer_free(RenderStyle::Flow)
        };

        let layout = layout(&records, &options, &HalfEm);

        assert_eq!(texts(&layout.pages[0])[1], "Espera… —dijo—");
    }

    #[test]
    fn page_numbers_go_on_every_page() {
        let records = vec![Record::new("A", "", "a"), Record::new("B", "", "b")];

        let layout = layout(&records, &RenderOptions::for_style(RenderStyle::Book), &HalfEm);

        assert_eq!(layout.pages.len(), 3);
        for (index, page) in layout.pages.iter().enumerate() {
            let footer = page.runs.last().map(|run| run.text.as_str());
            assert_eq!(footer, Some(format!("Page {}/3", index + 1).as_str()));
        }
    }

    #[test]
    fn toc_line_dot_fills_to_fixed_width() {
        let short = toc_line(&TocEntry {
            title: "Ana".to_owned(),
            page: 4,
        });
        assert_eq!(short, format!("• Ana {} 4", ".".repeat(57)));

        let long = toc_line(&TocEntry {
            title: "x".repeat(70),
            page: 12,
        });
        assert_eq!(long, format!("• {}  12", "x".repeat(70)));
    }
}
