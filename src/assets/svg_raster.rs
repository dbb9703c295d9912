use crate::foundation::error::{TokenError, TokenResult};

/// Smallest edge an SVG asset is rasterized at; artwork is drawn at up to print resolution.
const MIN_RASTER_EDGE: f64 = 1024.0;
const MAX_DIM: u32 = 8192;

/// Raster size for an SVG asset: its intrinsic size, scaled up so the longer edge reaches
/// [`MIN_RASTER_EDGE`] and the aspect ratio is preserved.
pub fn svg_raster_size(tree: &usvg::Tree) -> TokenResult<(u32, u32)> {
    let size = tree.size();
    let (w, h) = (f64::from(size.width()), f64::from(size.height()));
    if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
        return Err(TokenError::decode("svg has invalid width/height"));
    }

    let scale = (MIN_RASTER_EDGE / w.max(h)).max(1.0);
    let w = (w * scale).ceil().max(1.0) as u32;
    let h = (h * scale).ceil().max(1.0) as u32;
    if w > MAX_DIM || h > MAX_DIM {
        return Err(TokenError::decode(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> TokenResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| TokenError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}
