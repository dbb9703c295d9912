use crate::foundation::error::{TokenError, TokenResult};

pub use kurbo::{Affine, Point, Rect};

/// Largest token edge in pixels; `vello_cpu` surfaces are addressed with `u16`.
pub const MAX_TOKEN_PX: u32 = u16::MAX as u32;

/// Resolution of the rendered output in dots per inch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Dpi(pub u32);

impl Dpi {
    /// Standard print resolution.
    pub const PRINT: Dpi = Dpi(300);
    /// High resolution print output.
    pub const HIGH: Dpi = Dpi(600);

    /// Reject zero DPI.
    pub fn validate(self) -> TokenResult<Self> {
        if self.0 == 0 {
            return Err(TokenError::validation("dpi must be > 0"));
        }
        Ok(self)
    }

    /// Scale factor relative to 300 DPI; pixel quantities in options are authored at 300 DPI.
    pub fn scale(self) -> f64 {
        f64::from(self.0) / f64::from(Self::PRINT.0)
    }
}

impl Default for Dpi {
    fn default() -> Self {
        Self::PRINT
    }
}

/// Pixel edge of a token with nominal diameter `inches` rendered at `dpi`.
pub fn pixel_diameter(inches: f64, dpi: Dpi) -> TokenResult<u32> {
    let dpi = dpi.validate()?;
    if !inches.is_finite() || inches <= 0.0 {
        return Err(TokenError::validation("token diameter must be finite and > 0"));
    }
    let px = (inches * f64::from(dpi.0)).round();
    if px < 1.0 || px > f64::from(MAX_TOKEN_PX) {
        return Err(TokenError::validation(format!(
            "token pixel diameter {px} out of range (1..={MAX_TOKEN_PX})"
        )));
    }
    Ok(px as u32)
}
