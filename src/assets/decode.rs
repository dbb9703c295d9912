use std::sync::Arc;

use crate::{
    assets::svg_raster,
    foundation::error::{TokenError, TokenResult},
};

/// A decoded artwork image held as a premultiplied `vello_cpu` pixmap.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    pixmap: Arc<vello_cpu::Pixmap>,
}

impl DecodedImage {
    /// Wrap premultiplied RGBA8 bytes.
    pub fn from_premul_rgba8(bytes: &[u8], width: u32, height: u32) -> TokenResult<Self> {
        let pixmap = pixmap_from_premul_bytes(bytes, width, height)?;
        Ok(Self {
            width,
            height,
            pixmap: Arc::new(pixmap),
        })
    }

    /// Wrap straight-alpha RGBA8 bytes.
    pub fn from_rgba8(mut bytes: Vec<u8>, width: u32, height: u32) -> TokenResult<Self> {
        premultiply_rgba8_in_place(&mut bytes);
        Self::from_premul_rgba8(&bytes, width, height)
    }

    /// Approximate memory footprint used by the cache budget.
    pub fn estimated_bytes(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height) * 4
    }

    /// Image paint ready for `RenderContext::set_paint`.
    pub(crate) fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::clone(&self.pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn premul_bytes(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }
}

/// Decode encoded image bytes (PNG, JPEG, WebP, GIF or SVG).
pub fn decode_image(bytes: &[u8]) -> TokenResult<DecodedImage> {
    if looks_like_svg(bytes) {
        return decode_svg(bytes);
    }
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| TokenError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(TokenError::decode("image has zero size"));
    }
    DecodedImage::from_rgba8(rgba.into_raw(), width, height)
}

fn decode_svg(bytes: &[u8]) -> TokenResult<DecodedImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| TokenError::decode(format!("parse svg tree: {e}")))?;
    let (w, h) = svg_raster::svg_raster_size(&tree)?;
    let rgba = svg_raster::rasterize_svg_to_premul_rgba8(&tree, w, h)?;
    DecodedImage::from_premul_rgba8(&rgba, w, h)
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let Ok(text) = std::str::from_utf8(head) else {
        return false;
    };
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> TokenResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| TokenError::decode("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| TokenError::decode("image height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(TokenError::decode("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    let opaque = bytes.chunks_exact(4).all(|px| px[3] == 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, opaque))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
