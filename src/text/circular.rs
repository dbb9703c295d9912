use crate::text::fonts::TextMeasure;

const ELLIPSIS: &str = "\u{2026}";
/// Font shrink factor per fitting step.
const FIT_STEP: f64 = 0.95;

/// Inputs to [`calculate_circular_text_layout`]. All lengths in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircularTextParams {
    /// Token diameter.
    pub diameter: f64,
    pub font_size: f64,
    /// Line height multiplier applied to `font_size`.
    pub line_height: f64,
    /// Top of the first row, measured from the top of the token.
    pub start_y: f64,
    /// Total horizontal inset subtracted from every chord.
    pub padding: f64,
    pub max_lines: usize,
}

/// One wrapped row.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub text: String,
    /// Top of the row, from the top of the token.
    pub top: f64,
    /// Measured width of `text`.
    pub width: f64,
    /// Chord width available to this row.
    pub max_width: f64,
}

/// Wrapped ability text, shared between icon placement and drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLayoutResult {
    pub lines: Vec<TextLine>,
    /// `lines.len() × line_height_px`.
    pub total_height: f64,
    pub start_y: f64,
    pub font_size: f64,
    pub line_height_px: f64,
    /// Some words did not fit.
    pub truncated: bool,
}

impl TextLayoutResult {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Bottom edge of the text block.
    pub fn bottom(&self) -> f64 {
        self.start_y + self.total_height
    }
}

/// Usable width of the row spanning `[top, top + height)` inside a circle of `diameter`.
///
/// The row edge farther from the center bounds the chord.
pub fn chord_width(diameter: f64, top: f64, height: f64, padding: f64) -> f64 {
    let r = diameter / 2.0;
    let dy = (top - r).abs().max((top + height - r).abs());
    2.0 * (r * r - dy * dy).max(0.0).sqrt() - padding
}

enum Piece<'a> {
    Word(&'a str),
    Break,
}

fn pieces(text: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    for (i, para) in text.split('\n').enumerate() {
        if i > 0 {
            out.push(Piece::Break);
        }
        out.extend(para.split_whitespace().map(Piece::Word));
    }
    out
}

/// Greedily wrap `text` into rows whose widths follow the circle's chords.
///
/// Rows are added until `max_lines` is reached or the next row cannot hold the longest remaining
/// word. Leftover words set `truncated`, and the last row gets an ellipsis.
pub fn calculate_circular_text_layout(
    text: &str,
    params: &CircularTextParams,
    measure: &dyn TextMeasure,
) -> TextLayoutResult {
    let lh = params.font_size * params.line_height;
    let size = params.font_size;
    let pieces = pieces(text);
    let word_widths: Vec<f64> = pieces
        .iter()
        .map(|p| match p {
            Piece::Word(w) => measure.measure(w, size),
            Piece::Break => 0.0,
        })
        .collect();

    let mut lines: Vec<TextLine> = Vec::new();
    let mut next = 0;
    // Leading and repeated breaks never produce empty rows at the start.
    while matches!(pieces.get(next), Some(Piece::Break)) {
        next += 1;
    }

    while next < pieces.len() && lines.len() < params.max_lines {
        let top = params.start_y + lines.len() as f64 * lh;
        let max_width = chord_width(params.diameter, top, lh, params.padding);
        let longest = word_widths[next..].iter().copied().fold(0.0, f64::max);
        if max_width <= 0.0 || longest > max_width {
            break;
        }

        let mut row = String::new();
        while let Some(piece) = pieces.get(next) {
            match piece {
                Piece::Break => {
                    next += 1;
                    break;
                }
                Piece::Word(w) => {
                    let candidate = if row.is_empty() {
                        (*w).to_string()
                    } else {
                        format!("{row} {w}")
                    };
                    if !row.is_empty() && measure.measure(&candidate, size) > max_width {
                        break;
                    }
                    row = candidate;
                    next += 1;
                }
            }
        }
        if row.is_empty() {
            continue;
        }
        let width = measure.measure(&row, size);
        lines.push(TextLine {
            text: row,
            top,
            width,
            max_width,
        });
    }

    let truncated = pieces[next.min(pieces.len())..]
        .iter()
        .any(|p| matches!(p, Piece::Word(_)));
    if truncated && let Some(last) = lines.last_mut() {
        add_ellipsis(last, measure, size);
    }

    TextLayoutResult {
        total_height: lines.len() as f64 * lh,
        lines,
        start_y: params.start_y,
        font_size: size,
        line_height_px: lh,
        truncated,
    }
}

fn add_ellipsis(line: &mut TextLine, measure: &dyn TextMeasure, size: f64) {
    let mut words: Vec<&str> = line.text.split(' ').collect();
    while !words.is_empty() {
        let candidate = format!("{}{ELLIPSIS}", words.join(" "));
        let width = measure.measure(&candidate, size);
        if width <= line.max_width {
            line.text = candidate;
            line.width = width;
            return;
        }
        words.pop();
    }
}

/// Shrink the font in 5 % steps until the text fits untruncated or `min_font_size` is reached.
pub fn fit_circular_text_layout(
    text: &str,
    params: &CircularTextParams,
    min_font_size: f64,
    measure: &dyn TextMeasure,
) -> TextLayoutResult {
    let mut p = *params;
    let mut layout = calculate_circular_text_layout(text, &p, measure);
    while layout.truncated && p.font_size * FIT_STEP >= min_font_size {
        p.font_size *= FIT_STEP;
        layout = calculate_circular_text_layout(text, &p, measure);
    }
    if layout.truncated {
        tracing::debug!(font_size = p.font_size, "ability text truncated at minimum size");
    }
    layout
}

#[cfg(test)]
#[path = "../../tests/unit/text/circular.rs"]
mod tests;
