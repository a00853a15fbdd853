use printpdf::{IndirectFontRef, Mm, PdfDocument};

use super::fonts::FontSet;
use super::layout::{Layout, PAGE_HEIGHT, PAGE_WIDTH, Weight};

const LAYER: &str = "text";

pub fn write(layout: &Layout, fonts: &FontSet, title: &str) -> anyhow::Result<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);

    let regular = doc
        .add_external_font(fonts.regular.bytes())
        .map_err(|err| anyhow::anyhow!("embed font {}: {err:?}", fonts.regular.path.display()))?;
    let bold = match (&fonts.bold, layout.uses_bold()) {
        (Some(face), true) => Some(
            doc.add_external_font(face.bytes())
                .map_err(|err| anyhow::anyhow!("embed font {}: {err:?}", face.path.display()))?,
        ),
        (None, true) => anyhow::bail!("layout uses bold text but no bold font was loaded"),
        (_, false) => None,
    };

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER)
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for run in &page.runs {
            let font: &IndirectFontRef = match (run.weight, &bold) {
                (Weight::Bold, Some(bold)) => bold,
                _ => &regular,
            };
            layer.use_text(
                run.text.as_str(),
                run.size_pt,
                Mm(run.x),
                Mm(PAGE_HEIGHT - run.baseline),
                font,
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|err| anyhow::anyhow!("serialize pdf: {err:?}"))
}
