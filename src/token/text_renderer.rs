use crate::{
    foundation::{
        core::{Affine, Point},
        error::TokenResult,
    },
    model::{color::Color, options::GenerationOptions},
    render::canvas::{Clip, Shadow, TokenCanvas},
    text::{
        circular::{CircularTextParams, TextLayoutResult, fit_circular_text_layout},
        curved::{ArcPosition, CurvedTextParams, DEFAULT_MAX_ARC, draw_curved_text},
        fonts::{FontBook, FontFace},
    },
};

/// Baseline radius of bottom labels, as a fraction of the token radius.
const BOTTOM_BASELINE: f64 = 0.84;
/// Baseline radius of top labels, as a fraction of the token radius.
const TOP_BASELINE: f64 = 0.78;

/// Which text style a label uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TextRole {
    CharacterName,
    Ability,
    Reminder,
    Meta,
}

/// Draws every text element of a token from the current options.
pub(crate) struct TokenTextRenderer<'a> {
    fonts: &'a FontBook,
    options: &'a GenerationOptions,
}

impl<'a> TokenTextRenderer<'a> {
    pub(crate) fn new(fonts: &'a FontBook, options: &'a GenerationOptions) -> Self {
        Self { fonts, options }
    }

    fn scale(&self) -> f64 {
        self.options.dpi.scale()
    }

    fn face(&self, role: TextRole) -> Option<&'a FontFace> {
        let o = self.options;
        let family = match role {
            TextRole::CharacterName => &o.character_name_font,
            TextRole::Ability => &o.ability_text_font,
            TextRole::Reminder => &o.reminder_text_font,
            TextRole::Meta => &o.meta_text_font,
        };
        let face = self.fonts.face(family);
        if face.is_none() {
            tracing::warn!(family, "no font loaded, skipping text");
        }
        face
    }

    fn color(&self, role: TextRole) -> Color {
        let o = self.options;
        match role {
            TextRole::CharacterName => o.character_name_color,
            TextRole::Ability => o.ability_text_color,
            TextRole::Reminder => o.reminder_text_color,
            TextRole::Meta => o.meta_text_color,
        }
    }

    fn spacing(&self, role: TextRole) -> f64 {
        let s = &self.options.font_spacing;
        let px = match role {
            TextRole::CharacterName => s.character_name,
            TextRole::Ability => s.ability_text,
            TextRole::Reminder => s.reminder_text,
            TextRole::Meta => s.meta_text,
        };
        px * self.scale()
    }

    fn shadow(&self, role: TextRole) -> Option<Shadow> {
        let s = &self.options.text_shadow;
        let blur = match role {
            TextRole::CharacterName => s.character_name,
            TextRole::Ability => s.ability_text,
            TextRole::Reminder => s.reminder_text,
            TextRole::Meta => s.meta_text,
        };
        (blur > 0.0).then_some(Shadow {
            color: s.color,
            blur_px: blur * self.scale(),
        })
    }

    /// Wrap ability text inside the token circle, shrinking the font if needed.
    pub(crate) fn layout_ability(&self, text: &str, diameter: f64) -> Option<TextLayoutResult> {
        let face = self.face(TextRole::Ability)?;
        let o = self.options;
        let font_size = o.ability_font_size * diameter;
        let params = CircularTextParams {
            diameter,
            font_size,
            line_height: o.ability_line_height,
            start_y: o.ability_text_top * diameter,
            padding: o.circular_padding * diameter,
            max_lines: o.ability_max_lines,
        };
        let measure = self.fonts.measurer(face, self.spacing(TextRole::Ability));
        let layout = fit_circular_text_layout(
            text,
            &params,
            font_size * o.ability_min_font_scale,
            &measure,
        );
        (!layout.is_empty()).then_some(layout)
    }

    /// Draw a precomputed wrapped block, each row centered horizontally.
    pub(crate) fn draw_wrapped(
        &self,
        canvas: &mut TokenCanvas,
        layout: &TextLayoutResult,
        role: TextRole,
    ) -> TokenResult<()> {
        let Some(face) = self.face(role) else {
            return Ok(());
        };
        let spacing = self.spacing(role);
        let diameter = canvas.diameter();
        let mut rows = Vec::with_capacity(layout.lines.len());
        for line in &layout.lines {
            let shaped = self.fonts.shape(face, &line.text, layout.font_size, spacing)?;
            let x = (diameter - shaped.width) / 2.0;
            let baseline =
                line.top + (layout.line_height_px + shaped.ascent - shaped.descent) / 2.0;
            rows.push((shaped, Affine::translate((x, baseline))));
        }

        canvas.paint_with_shadow(Clip::Token, self.color(role), self.shadow(role), |p, c| {
            for (shaped, transform) in &rows {
                p.draw_glyphs(shaped, *transform, c);
            }
            Ok(())
        })
    }

    /// Draw a label along the top or bottom arc.
    pub(crate) fn draw_arc_label(
        &self,
        canvas: &mut TokenCanvas,
        text: &str,
        role: TextRole,
        font_fraction: f64,
        position: ArcPosition,
    ) -> TokenResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        let Some(face) = self.face(role) else {
            return Ok(());
        };
        let uppercase = self.options.uppercase_names
            && matches!(role, TextRole::CharacterName | TextRole::Meta);
        let text = if uppercase {
            text.to_uppercase()
        } else {
            text.to_string()
        };

        let radius = canvas.diameter() / 2.0;
        let baseline = match position {
            ArcPosition::Top => TOP_BASELINE,
            ArcPosition::Bottom => BOTTOM_BASELINE,
        };
        let params = CurvedTextParams {
            center: canvas.center(),
            radius: radius * baseline,
            font_size: font_fraction * canvas.diameter(),
            letter_spacing: self.spacing(role),
            position,
            max_arc: DEFAULT_MAX_ARC,
        };
        let layout = draw_curved_text(
            canvas,
            self.fonts,
            face,
            &text,
            &params,
            self.color(role),
            self.shadow(role),
        )?;
        if layout.compressed {
            tracing::debug!(text, "curved label compressed to fit");
        }
        Ok(())
    }

    pub(crate) fn draw_character_name(&self, canvas: &mut TokenCanvas, name: &str) -> TokenResult<()> {
        self.draw_arc_label(
            canvas,
            name,
            TextRole::CharacterName,
            self.options.name_font_size,
            ArcPosition::Bottom,
        )
    }

    pub(crate) fn draw_reminder_text(&self, canvas: &mut TokenCanvas, text: &str) -> TokenResult<()> {
        self.draw_arc_label(
            canvas,
            text,
            TextRole::Reminder,
            self.options.reminder_font_size,
            ArcPosition::Bottom,
        )
    }

    /// Wrapped meta text vertically centered on `center_y`.
    pub(crate) fn draw_meta_block(
        &self,
        canvas: &mut TokenCanvas,
        text: &str,
        center_y: f64,
    ) -> TokenResult<()> {
        let Some(face) = self.face(TextRole::Meta) else {
            return Ok(());
        };
        let diameter = canvas.diameter();
        let font_size = self.options.meta_font_size * diameter;
        let line_height = 1.1;
        let measure = self.fonts.measurer(face, self.spacing(TextRole::Meta));
        let mut params = CircularTextParams {
            diameter,
            font_size,
            line_height,
            start_y: center_y - font_size * line_height / 2.0,
            padding: 0.1 * diameter,
            max_lines: 3,
        };
        let first = fit_circular_text_layout(text, &params, font_size * 0.5, &measure);
        params.font_size = first.font_size;
        params.start_y = center_y - first.total_height / 2.0;
        let layout = fit_circular_text_layout(text, &params, first.font_size * 0.5, &measure);
        self.draw_wrapped(canvas, &layout, TextRole::Meta)
    }

    /// Reminder-count badge in the upper left of the token.
    pub(crate) fn draw_count_badge(&self, canvas: &mut TokenCanvas, count: usize) -> TokenResult<()> {
        let d = canvas.diameter();
        let center = Point::new(0.22 * d, 0.22 * d);
        let radius = 0.065 * d;
        let badge = self.options.badge_color;
        canvas.paint(Clip::Token, |p| {
            p.fill_circle(center, radius, badge);
            Ok(())
        })?;

        let Some(face) = self.face(TextRole::CharacterName) else {
            return Ok(());
        };
        let shaped = self.fonts.shape(face, &count.to_string(), radius * 1.2, 0.0)?;
        let origin = Point::new(
            center.x - shaped.width / 2.0,
            center.y + (shaped.ascent - shaped.descent) / 2.0,
        );
        let color = self.options.badge_text_color;
        canvas.paint(Clip::Token, |p| {
            p.draw_glyphs(&shaped, Affine::translate(origin.to_vec2()), color);
            Ok(())
        })
    }
}
