use crate::{
    foundation::core::{Point, Rect},
    model::{options::IconTransform, token::TokenKind},
};

/// Gap kept between the ability text block and the icon, as a fraction of the diameter.
const TEXT_GAP: f64 = 0.02;
/// Top of the curved name band on character tokens, as a fraction of the diameter.
const NAME_BAND_TOP: f64 = 0.80;
/// Smallest icon squeezed under ability text, as a fraction of the diameter.
const MIN_TEXT_ICON: f64 = 0.30;

/// Vertical extent of the ability text block, in pixels from the top of the token.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextBlock {
    pub start_y: f64,
    pub total_height: f64,
}

impl TextBlock {
    pub fn bottom(&self) -> f64 {
        self.start_y + self.total_height
    }
}

/// Inputs to [`IconLayoutStrategy::calculate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IconLayoutContext {
    pub diameter: f64,
    pub icon: IconTransform,
    /// Present when ability text is drawn on a character token.
    pub text_block: Option<TextBlock>,
}

/// Square area the artwork is drawn into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IconPlacement {
    /// Top-left corner.
    pub position: Point,
    /// Edge length.
    pub size: f64,
}

impl IconPlacement {
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.size, self.size))
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.size / 2.0,
            self.position.y + self.size / 2.0,
        )
    }
}

/// Artwork placement rule per token kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IconLayoutStrategy {
    /// Icon shrinks into the band between the ability text and the name.
    CharacterWithAbility,
    /// Large icon above the curved name.
    CharacterNameOnly,
    /// Icon above the curved reminder text.
    Reminder,
    /// Centered artwork on script-level tokens.
    Meta,
}

impl IconLayoutStrategy {
    pub fn select(kind: TokenKind, has_ability_text: bool) -> Self {
        match kind {
            TokenKind::Character if has_ability_text => Self::CharacterWithAbility,
            TokenKind::Character => Self::CharacterNameOnly,
            TokenKind::Reminder => Self::Reminder,
            TokenKind::ScriptName | TokenKind::Almanac | TokenKind::Pandemonium => Self::Meta,
        }
    }

    pub fn calculate(self, ctx: &IconLayoutContext) -> IconPlacement {
        let d = ctx.diameter;
        let (size, center_y) = match self {
            Self::CharacterNameOnly => (0.64 * d, 0.44 * d),
            Self::Reminder => (0.58 * d, 0.42 * d),
            Self::Meta => (0.62 * d, 0.50 * d),
            Self::CharacterWithAbility => match ctx.text_block {
                Some(block) => {
                    let top = block.bottom() + TEXT_GAP * d;
                    let available = NAME_BAND_TOP * d - top;
                    let size = available.clamp(MIN_TEXT_ICON * d, 0.64 * d);
                    (size, top + size / 2.0)
                }
                None => (0.64 * d, 0.44 * d),
            },
        };

        let size = (size * ctx.icon.scale).max(0.0);
        let center = Point::new(
            d / 2.0 + ctx.icon.offset_x * d,
            center_y + ctx.icon.offset_y * d,
        );
        IconPlacement {
            position: Point::new(center.x - size / 2.0, center.y - size / 2.0),
            size,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/strategy.rs"]
mod tests;
