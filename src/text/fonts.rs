use std::{
    borrow::Cow,
    path::Path,
    sync::{Mutex, MutexGuard},
};

use anyhow::Context as _;

use crate::foundation::error::{TokenError, TokenResult};

/// Width of `text` at a given font size; the seam the layout algorithms are tested through.
pub trait TextMeasure {
    fn measure(&self, text: &str, font_size: f64) -> f64;
}

/// One registered font family and the glyph source used to draw it.
#[derive(Clone)]
pub struct FontFace {
    /// Family name as reported by the font's name table.
    pub family: String,
    pub(crate) data: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

/// Glyph positioned relative to the start of the shaped line, on its baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// Single-line shaping result.
#[derive(Clone, Debug)]
pub struct ShapedText {
    pub glyphs: Vec<PlacedGlyph>,
    pub width: f64,
    pub ascent: f64,
    pub descent: f64,
    pub font_size: f32,
    pub(crate) font: vello_cpu::peniko::FontData,
}

struct ShapingContexts {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
}

/// Fonts available to the token renderer.
///
/// Families are looked up case-insensitively; unknown families fall back to the first loaded
/// face. An empty book makes text rendering a no-op (callers log and skip).
pub struct FontBook {
    faces: Vec<FontFace>,
    contexts: Mutex<ShapingContexts>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

/// Common locations of a sans-serif fallback face.
const SYSTEM_FALLBACKS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

impl FontBook {
    pub fn new() -> Self {
        Self {
            faces: Vec::new(),
            contexts: Mutex::new(ShapingContexts {
                font_ctx: parley::FontContext::default(),
                layout_ctx: parley::LayoutContext::new(),
            }),
        }
    }

    /// Register a font from raw bytes and return its family name.
    pub fn add_font_bytes(&mut self, bytes: Vec<u8>) -> TokenResult<String> {
        let blob = parley::fontique::Blob::from(bytes.clone());
        let family = {
            let mut ctx = self.lock();
            let families = ctx.font_ctx.collection.register_fonts(blob, None);
            let family_id = families
                .first()
                .map(|(id, _)| *id)
                .ok_or_else(|| TokenError::validation("no font families registered from font bytes"))?;
            ctx.font_ctx
                .collection
                .family_name(family_id)
                .ok_or_else(|| TokenError::validation("registered font family has no name"))?
                .to_string()
        };

        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        if !self.faces.iter().any(|f| f.family.eq_ignore_ascii_case(&family)) {
            self.faces.push(FontFace {
                family: family.clone(),
                data,
            });
        }
        tracing::debug!(family, "registered font");
        Ok(family)
    }

    /// Load every `.ttf`, `.otf` and `.ttc` file directly under `dir`. Unreadable fonts are
    /// skipped with a warning.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> TokenResult<usize> {
        let dir = dir.as_ref();
        let mut paths = std::fs::read_dir(dir)
            .with_context(|| format!("read font dir '{}'", dir.display()))?
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|s| s.to_str())
                        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
            })
            .collect::<Vec<_>>();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let res = std::fs::read(&path)
                .map_err(|e| TokenError::Other(e.into()))
                .and_then(|bytes| self.add_font_bytes(bytes));
            match res {
                Ok(_) => loaded += 1,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping font"),
            }
        }
        Ok(loaded)
    }

    /// A book holding the first system sans-serif face found, or an empty book.
    pub fn with_system_fallback() -> Self {
        let mut book = Self::new();
        book.add_system_fallback();
        book
    }

    /// Register the first available system fallback face. Returns `false` if none was found.
    pub fn add_system_fallback(&mut self) -> bool {
        for path in SYSTEM_FALLBACKS {
            if let Ok(bytes) = std::fs::read(path)
                && self.add_font_bytes(bytes).is_ok()
            {
                return true;
            }
        }
        false
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.faces.iter().map(|f| f.family.as_str())
    }

    /// Face for `family`, falling back to the first loaded face.
    pub fn face(&self, family: &str) -> Option<&FontFace> {
        self.faces
            .iter()
            .find(|f| f.family.eq_ignore_ascii_case(family.trim()))
            .or_else(|| self.faces.first())
    }

    fn lock(&self) -> MutexGuard<'_, ShapingContexts> {
        self.contexts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Shape `text` as a single unbroken line.
    pub fn shape(
        &self,
        face: &FontFace,
        text: &str,
        font_size: f64,
        letter_spacing: f64,
    ) -> TokenResult<ShapedText> {
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(TokenError::validation("font size must be finite and > 0"));
        }
        let size = font_size as f32;

        let mut guard = self.lock();
        let ShapingContexts {
            font_ctx,
            layout_ctx,
        } = &mut *guard;
        let mut builder = layout_ctx.ranged_builder(font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(face.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size));
        if letter_spacing != 0.0 {
            builder.push_default(parley::style::StyleProperty::LetterSpacing(
                letter_spacing as f32,
            ));
        }
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let mut glyphs = Vec::new();
        let (mut ascent, mut descent, mut baseline) = (0.0f64, 0.0f64, None);
        for line in layout.lines() {
            let metrics = line.metrics();
            let line_baseline = *baseline.get_or_insert(metrics.baseline);
            ascent = ascent.max(f64::from(metrics.ascent));
            descent = descent.max(f64::from(metrics.descent));
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| PlacedGlyph {
                    id: g.id as u32,
                    x: g.x,
                    y: g.y - line_baseline,
                }));
            }
        }

        Ok(ShapedText {
            glyphs,
            width: f64::from(layout.width()),
            ascent,
            descent,
            font_size: size,
            font: face.data.clone(),
        })
    }

    /// Measurement adapter bound to one face and letter spacing.
    pub fn measurer<'a>(&'a self, face: &'a FontFace, letter_spacing: f64) -> FontMeasure<'a> {
        FontMeasure {
            book: self,
            face,
            letter_spacing,
        }
    }
}

/// [`TextMeasure`] backed by real shaping.
pub struct FontMeasure<'a> {
    book: &'a FontBook,
    face: &'a FontFace,
    letter_spacing: f64,
}

impl TextMeasure for FontMeasure<'_> {
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        match self.book.shape(self.face, text, font_size, self.letter_spacing) {
            Ok(shaped) => shaped.width,
            Err(e) => {
                tracing::warn!(error = %e, "text measure failed");
                0.0
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
