use std::f64::consts::{PI, TAU};

use crate::{
    foundation::{
        core::{Affine, Point},
        error::TokenResult,
    },
    model::color::Color,
    render::canvas::{Clip, Shadow, TokenCanvas},
    text::fonts::{FontBook, FontFace, TextMeasure},
};

/// Default largest arc a curved label may span.
pub const DEFAULT_MAX_ARC: f64 = 0.7 * PI;

/// Where along the circle a curved label is centered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArcPosition {
    /// Centered on the top, reading clockwise; glyphs stand outward.
    Top,
    /// Centered on the bottom, reading left to right with glyphs upright.
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvedTextParams {
    pub center: Point,
    /// Radius of the baseline circle.
    pub radius: f64,
    pub font_size: f64,
    pub letter_spacing: f64,
    pub position: ArcPosition,
    /// Largest span in radians; clamped to `(0, 2π]`.
    pub max_arc: f64,
}

/// One character placed on the arc.
#[derive(Clone, Debug, PartialEq)]
pub struct CurvedGlyph {
    pub text: String,
    /// Angle of the glyph center, in radians (0 = +x axis, y down).
    pub angle: f64,
    pub width: f64,
    /// Maps the glyph's own baseline origin (left edge) onto the arc.
    pub transform: Affine,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CurvedTextLayout {
    pub glyphs: Vec<CurvedGlyph>,
    /// Sum of the uncompressed angular increments.
    pub natural_span: f64,
    /// Span actually occupied.
    pub span: f64,
    /// Increments were scaled down to fit `max_arc`.
    pub compressed: bool,
}

/// Place each character of `text` along a circular arc.
///
/// Every character advances the angle by `(width + letter_spacing) / radius`. When the total
/// exceeds `max_arc`, all increments are scaled uniformly so the label spans exactly `max_arc`.
pub fn layout_curved_text(
    text: &str,
    params: &CurvedTextParams,
    measure: &dyn TextMeasure,
) -> CurvedTextLayout {
    let radius = params.radius.max(f64::EPSILON);
    let chars: Vec<(String, f64)> = text
        .chars()
        .map(|c| {
            let s = c.to_string();
            let w = measure.measure(&s, params.font_size);
            (s, w)
        })
        .collect();

    let increments: Vec<f64> = chars
        .iter()
        .map(|(_, w)| ((w + params.letter_spacing) / radius).max(0.0))
        .collect();
    let natural_span: f64 = increments.iter().sum();

    let max_arc = if params.max_arc.is_finite() && params.max_arc > 0.0 {
        params.max_arc.min(TAU)
    } else {
        DEFAULT_MAX_ARC
    };
    let compressed = natural_span > max_arc;
    let scale = if compressed { max_arc / natural_span } else { 1.0 };
    let span = natural_span * scale;

    let mut glyphs = Vec::with_capacity(chars.len());
    let mut travelled = 0.0;
    for ((s, w), inc) in chars.into_iter().zip(increments) {
        let inc = inc * scale;
        let offset = travelled + inc / 2.0;
        travelled += inc;

        let (angle, frame) = match params.position {
            ArcPosition::Top => {
                let angle = -PI / 2.0 - span / 2.0 + offset;
                let frame = Affine::rotate(angle + PI / 2.0) * Affine::translate((0.0, -radius));
                (angle, frame)
            }
            ArcPosition::Bottom => {
                let angle = PI / 2.0 + span / 2.0 - offset;
                let frame = Affine::rotate(angle - PI / 2.0) * Affine::translate((0.0, radius));
                (angle, frame)
            }
        };
        let transform = Affine::translate(params.center.to_vec2())
            * frame
            * Affine::translate((-w / 2.0, 0.0));
        glyphs.push(CurvedGlyph {
            text: s,
            angle,
            width: w,
            transform,
        });
    }

    CurvedTextLayout {
        glyphs,
        natural_span,
        span,
        compressed,
    }
}

/// Shape and draw a curved label, with an optional blurred shadow underneath.
pub(crate) fn draw_curved_text(
    canvas: &mut TokenCanvas,
    fonts: &FontBook,
    face: &FontFace,
    text: &str,
    params: &CurvedTextParams,
    color: Color,
    shadow: Option<Shadow>,
) -> TokenResult<CurvedTextLayout> {
    let layout = layout_curved_text(text, params, &fonts.measurer(face, 0.0));
    let shaped = layout
        .glyphs
        .iter()
        .filter(|g| !g.text.trim().is_empty())
        .map(|g| Ok((fonts.shape(face, &g.text, params.font_size, 0.0)?, g.transform)))
        .collect::<TokenResult<Vec<_>>>()?;

    canvas.paint_with_shadow(Clip::Token, color, shadow, |p, c| {
        for (glyph, transform) in &shaped {
            p.draw_glyphs(glyph, *transform, c);
        }
        Ok(())
    })?;
    Ok(layout)
}

#[cfg(test)]
#[path = "../../tests/unit/text/curved.rs"]
mod tests;
