use crate::{
    foundation::{
        core::{Affine, Rect},
        error::{TokenError, TokenResult},
    },
    model::color::Color,
    render::canvas::Painter,
};

/// Square module matrix of an encoded QR code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    /// Encode `data` with medium error correction.
    pub fn encode(data: &str) -> TokenResult<Self> {
        if data.trim().is_empty() {
            return Err(TokenError::validation("qr payload must not be empty"));
        }
        let code = qrcode::QrCode::with_error_correction_level(data.as_bytes(), qrcode::EcLevel::M)
            .map_err(|e| TokenError::render(format!("qr encode: {e}")))?;
        let dark = code
            .to_colors()
            .into_iter()
            .map(|c| c == qrcode::Color::Dark)
            .collect();
        Ok(Self {
            width: code.width(),
            dark,
        })
    }

    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }

    /// Dark modules merged into horizontal runs, in module coordinates.
    fn runs(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..self.width).flat_map(move |y| {
            let mut runs = Vec::new();
            let mut x = 0;
            while x < self.width {
                if !self.is_dark(x, y) {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < self.width && self.is_dark(x, y) {
                    x += 1;
                }
                runs.push((y, start, x));
            }
            runs
        })
    }
}

/// Fill the dark modules of `matrix` scaled into the square `dest`.
pub(crate) fn draw_qr(painter: &mut Painter<'_>, matrix: &QrMatrix, dest: Rect, color: Color) {
    let n = matrix.width() as f64;
    if n == 0.0 {
        return;
    }
    let module = dest.width().min(dest.height()) / n;
    let mut path = kurbo::BezPath::new();
    for (y, x0, x1) in matrix.runs() {
        let (y, x0, x1) = (y as f64, x0 as f64, x1 as f64);
        path.move_to((x0, y));
        path.line_to((x1, y));
        path.line_to((x1, y + 1.0));
        path.line_to((x0, y + 1.0));
        path.close_path();
    }
    let transform = Affine::translate((dest.x0, dest.y0)) * Affine::scale(module);
    painter.fill_path(&path, transform, color);
}
