use std::{io::Cursor, path::Path};

use anyhow::Context as _;

use crate::{
    assets::decode::DecodedImage,
    foundation::{
        core::{Affine, MAX_TOKEN_PX, Point, Rect},
        error::{TokenError, TokenResult},
    },
    model::color::Color,
    render::{
        blur::shadow_blur,
        composite::{over_in_place, unpremultiply},
    },
    text::fonts::ShapedText,
};

const PATH_TOLERANCE: f64 = 0.1;

/// Whether a layer is clipped to the token circle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Clip {
    /// Clip to the inscribed circle.
    Token,
    /// Draw over the full square; used by decorations allowed to bleed to the edge.
    None,
}

/// How an image is fit into a destination rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFit {
    /// Fill the rectangle, cropping the overflow.
    Cover,
    /// Fit entirely inside the rectangle, preserving aspect ratio.
    Contain,
}

/// Blurred copy of a layer drawn underneath it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Color,
    pub blur_px: f64,
}

impl Shadow {
    fn is_visible(&self) -> bool {
        self.blur_px.is_finite() && self.blur_px > 0.0 && self.color.a > 0
    }
}

/// Square premultiplied RGBA8 surface a token is rendered into.
pub struct TokenCanvas {
    size: u16,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for TokenCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCanvas")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl TokenCanvas {
    /// Transparent canvas of `diameter × diameter` pixels.
    pub fn new(diameter: u32) -> TokenResult<Self> {
        if diameter == 0 || diameter > MAX_TOKEN_PX {
            return Err(TokenError::validation(format!(
                "canvas diameter {diameter} out of range (1..={MAX_TOKEN_PX})"
            )));
        }
        let size = diameter as u16;
        Ok(Self {
            size,
            pixmap: vello_cpu::Pixmap::new(size, size),
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.size)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.size)
    }

    pub fn diameter(&self) -> f64 {
        f64::from(self.size)
    }

    pub fn center(&self) -> Point {
        let r = self.diameter() / 2.0;
        Point::new(r, r)
    }

    /// Premultiplied RGBA8 pixels, row-major.
    pub fn premul_rgba8(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Straight-alpha RGBA8 pixels, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        unpremultiply(self.premul_rgba8())
    }

    /// Straight-alpha pixel at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = ((y * self.width() + x) * 4) as usize;
        let px = unpremultiply(&self.premul_rgba8()[i..i + 4]);
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn encode_png(&self) -> TokenResult<Vec<u8>> {
        let img = image::RgbaImage::from_raw(self.width(), self.height(), self.to_rgba8())
            .ok_or_else(|| TokenError::render("canvas buffer does not match its size"))?;
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode token png")?;
        Ok(buf)
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> TokenResult<()> {
        let path = path.as_ref();
        image::save_buffer_with_format(
            path,
            &self.to_rgba8(),
            self.width(),
            self.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }

    fn clip_path(&self) -> vello_cpu::kurbo::BezPath {
        circle_path(self.center(), self.diameter() / 2.0)
    }

    fn render_layer(
        &self,
        clip: Clip,
        draw: impl FnOnce(&mut Painter<'_>) -> TokenResult<()>,
    ) -> TokenResult<vello_cpu::Pixmap> {
        let mut ctx = vello_cpu::RenderContext::new(self.size, self.size);
        if clip == Clip::Token {
            ctx.push_clip_layer(&self.clip_path());
        }
        draw(&mut Painter { ctx: &mut ctx })?;
        if clip == Clip::Token {
            ctx.pop_layer();
        }
        ctx.flush();
        let mut layer = vello_cpu::Pixmap::new(self.size, self.size);
        ctx.render_to_pixmap(&mut layer);
        Ok(layer)
    }

    /// Draw one layer and composite it over the canvas.
    pub(crate) fn paint(
        &mut self,
        clip: Clip,
        draw: impl FnOnce(&mut Painter<'_>) -> TokenResult<()>,
    ) -> TokenResult<()> {
        let layer = self.render_layer(clip, draw)?;
        over_in_place(
            self.pixmap.data_as_u8_slice_mut(),
            layer.data_as_u8_slice(),
            1.0,
        )
    }

    /// Draw a layer twice: once in the shadow color, blurred, then in `color` on top.
    pub(crate) fn paint_with_shadow(
        &mut self,
        clip: Clip,
        color: Color,
        shadow: Option<Shadow>,
        draw: impl Fn(&mut Painter<'_>, Color) -> TokenResult<()>,
    ) -> TokenResult<()> {
        if let Some(shadow) = shadow.filter(Shadow::is_visible) {
            let layer = self.render_layer(clip, |p| draw(p, shadow.color))?;
            let blurred = shadow_blur(
                layer.data_as_u8_slice(),
                self.width(),
                self.height(),
                shadow.blur_px,
            )?;
            over_in_place(self.pixmap.data_as_u8_slice_mut(), &blurred, 1.0)?;
        }
        self.paint(clip, |p| draw(p, color))
    }
}

/// Drawing operations available inside a [`TokenCanvas`] layer.
pub(crate) struct Painter<'a> {
    ctx: &'a mut vello_cpu::RenderContext,
}

impl Painter<'_> {
    pub(crate) fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color.to_paint());
        self.ctx.fill_path(&circle_path(center, radius));
    }

    pub(crate) fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color.to_paint());
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            rect.x0, rect.y0, rect.x1, rect.y1,
        ));
    }

    pub(crate) fn fill_path(&mut self, path: &kurbo::BezPath, transform: Affine, color: Color) {
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint(color.to_paint());
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    /// Draw `image` fit into `dest`.
    pub(crate) fn draw_image(&mut self, image: &DecodedImage, dest: Rect, fit: ImageFit) {
        let (iw, ih) = (f64::from(image.width), f64::from(image.height));
        if iw <= 0.0 || ih <= 0.0 || dest.width() <= 0.0 || dest.height() <= 0.0 {
            return;
        }
        let (sx, sy) = (dest.width() / iw, dest.height() / ih);
        let s = match fit {
            ImageFit::Cover => sx.max(sy),
            ImageFit::Contain => sx.min(sy),
        };
        let x = dest.x0 + (dest.width() - iw * s) / 2.0;
        let y = dest.y0 + (dest.height() - ih * s) / 2.0;

        let crop = fit == ImageFit::Cover;
        if crop {
            self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            let mut clip = vello_cpu::kurbo::BezPath::new();
            clip.move_to((dest.x0, dest.y0));
            clip.line_to((dest.x1, dest.y0));
            clip.line_to((dest.x1, dest.y1));
            clip.line_to((dest.x0, dest.y1));
            clip.close_path();
            self.ctx.push_clip_layer(&clip);
        }
        self.ctx.set_transform(affine_to_cpu(
            Affine::translate((x, y)) * Affine::scale(s),
        ));
        self.ctx.set_paint(image.paint());
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
        if crop {
            self.ctx.pop_layer();
        }
    }

    /// Draw shaped glyphs; `transform` maps the line origin (start of baseline).
    pub(crate) fn draw_glyphs(&mut self, shaped: &ShapedText, transform: Affine, color: Color) {
        if shaped.glyphs.is_empty() {
            return;
        }
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint(color.to_paint());
        let glyphs = shaped.glyphs.iter().map(|g| vello_cpu::Glyph {
            id: g.id,
            x: g.x,
            y: g.y,
        });
        self.ctx
            .glyph_run(&shaped.font)
            .font_size(shaped.font_size)
            .fill_glyphs(glyphs);
    }
}

pub(crate) fn circle_path(center: Point, radius: f64) -> vello_cpu::kurbo::BezPath {
    use kurbo::Shape as _;

    let circle = kurbo::Circle::new(center, radius.max(0.0));
    let mut p = vello_cpu::kurbo::BezPath::new();
    for el in circle.path_elements(PATH_TOLERANCE) {
        p.push(el);
    }
    p
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        out.push(el);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
