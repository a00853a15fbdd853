use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use super::layout::{Measure, Weight};

const MM_PER_PT: f32 = 25.4 / 72.0;

/// A TrueType face kept as raw bytes for embedding, with its advance widths.
#[derive(Debug, Clone)]
pub struct FontFace {
    pub path: PathBuf,
    bytes: Vec<u8>,
    units_per_em: f32,
    advances: HashMap<char, u16>,
    fallback_advance: u16,
}

impl FontFace {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font: {}", path.display()))?;
        Self::from_bytes(path.to_path_buf(), bytes)
            .with_context(|| format!("parse font: {}", path.display()))
    }

    pub fn from_bytes(path: PathBuf, bytes: Vec<u8>) -> anyhow::Result<Self> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|err| anyhow::anyhow!("invalid TrueType data: {err}"))?;

        let mut advances = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|codepoint| {
                    let Some(ch) = char::from_u32(codepoint) else {
                        return;
                    };
                    if let Some(advance) = subtable
                        .glyph_index(codepoint)
                        .and_then(|glyph| face.glyph_hor_advance(glyph))
                    {
                        advances.entry(ch).or_insert(advance);
                    }
                });
            }
        }
        if advances.is_empty() {
            anyhow::bail!("font has no unicode character map");
        }

        let units_per_em = f32::from(face.units_per_em());
        let fallback_advance = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .unwrap_or(face.units_per_em() / 2);

        Ok(Self {
            path,
            units_per_em,
            advances,
            fallback_advance,
            bytes,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn covers(&self, ch: char) -> bool {
        self.advances.contains_key(&ch)
    }

    pub fn text_width(&self, text: &str, size_pt: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|ch| u32::from(*self.advances.get(&ch).unwrap_or(&self.fallback_advance)))
            .sum();
        units as f32 / self.units_per_em * size_pt * MM_PER_PT
    }
}

#[derive(Debug, Clone)]
pub struct FontSet {
    pub regular: FontFace,
    pub bold: Option<FontFace>,
}

impl FontSet {
    pub fn load(regular: &Path, bold: Option<&Path>) -> anyhow::Result<Self> {
        let regular = FontFace::load(regular).context("load regular font")?;
        let bold = bold
            .map(|path| FontFace::load(path).context("load bold font"))
            .transpose()?;
        Ok(Self { regular, bold })
    }

    pub fn face(&self, weight: Weight) -> &FontFace {
        match (weight, &self.bold) {
            (Weight::Bold, Some(bold)) => bold,
            _ => &self.regular,
        }
    }
}

impl Measure for FontSet {
    fn text_width(&self, text: &str, weight: Weight, size_pt: f32) -> f32 {
        self.face(weight).text_width(text, size_pt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEJAVU_SANS: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

    #[test]
    fn rejects_non_font_bytes() {
        let err = FontFace::from_bytes(PathBuf::from("x.ttf"), b"not a font".to_vec());
        assert!(err.is_err());
    }

    #[test]
    fn missing_font_file_is_an_error() {
        let err = FontSet::load(Path::new("/nonexistent/font.ttf"), None).expect_err("missing");
        assert!(format!("{err:#}").contains("load regular font"));
    }

    #[test]
    fn system_font_covers_spanish_and_measures_proportionally() -> anyhow::Result<()> {
        let path = Path::new(DEJAVU_SANS);
        if !path.exists() {
            eprintln!("skipping: {DEJAVU_SANS} not installed");
            return Ok(());
        }

        let face = FontFace::load(path)?;
        for ch in "áéíóúñÑüÜ¿¡«»•".chars() {
            assert!(face.covers(ch), "missing glyph for {ch:?}");
        }
        assert!(face.text_width("MMMM", 12.0) > face.text_width("iiii", 12.0));
        let single = face.text_width("a", 12.0);
        assert!((face.text_width("aa", 12.0) - 2.0 * single).abs() < 1e-4);
        assert!((face.text_width("a", 24.0) - 2.0 * single).abs() < 1e-4);
        Ok(())
    }
}
