use crate::foundation::error::{TokenError, TokenResult};

/// Pixel rectangle `[x0, x1) × [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Region {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

/// Gaussian blur of a premultiplied RGBA8 buffer for text shadows.
///
/// `blur_px` follows the canvas `shadowBlur` convention: sigma is half of it. Only the bounding
/// box of visible pixels, grown by the kernel radius, is processed; everything else stays
/// transparent.
pub fn shadow_blur(src: &[u8], width: u32, height: u32, blur_px: f64) -> TokenResult<Vec<u8>> {
    let (w, h) = (width as usize, height as usize);
    let expected_len = w
        .checked_mul(h)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| TokenError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(TokenError::render(
            "shadow_blur expects src matching width*height*4",
        ));
    }
    if !blur_px.is_finite() || blur_px <= 0.0 {
        return Ok(src.to_vec());
    }

    let sigma = (blur_px / 2.0).max(0.5);
    let radius = (sigma * 3.0).ceil() as usize;
    let kernel = gaussian_kernel_q16(radius, sigma)?;

    let Some(region) = visible_bounds(src, w, h).map(|r| grow(r, radius, w, h)) else {
        return Ok(src.to_vec());
    };

    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];
    horizontal_pass(src, &mut tmp, w, region, &kernel);
    vertical_pass(&tmp, &mut out, w, region, &kernel);
    Ok(out)
}

fn visible_bounds(src: &[u8], w: usize, h: usize) -> Option<Region> {
    let mut r: Option<Region> = None;
    for y in 0..h {
        for x in 0..w {
            if src[(y * w + x) * 4 + 3] == 0 {
                continue;
            }
            let b = r.get_or_insert(Region {
                x0: x,
                y0: y,
                x1: x + 1,
                y1: y + 1,
            });
            b.x0 = b.x0.min(x);
            b.x1 = b.x1.max(x + 1);
            b.y1 = y + 1;
        }
    }
    r
}

fn grow(r: Region, by: usize, w: usize, h: usize) -> Region {
    Region {
        x0: r.x0.saturating_sub(by),
        y0: r.y0.saturating_sub(by),
        x1: (r.x1 + by).min(w),
        y1: (r.y1 + by).min(h),
    }
}

/// Normalized kernel in Q16 fixed point; weights sum to exactly 65536.
fn gaussian_kernel_q16(radius: usize, sigma: f64) -> TokenResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(TokenError::validation("blur sigma must be > 0"));
    }
    let denom = 2.0 * sigma * sigma;
    let r = radius as i64;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = i as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    let acc: i64 = weights.iter().map(|&q| i64::from(q)).sum();
    let mid = weights.len() / 2;
    weights[mid] = (i64::from(weights[mid]) + 65536 - acc).clamp(0, 65536) as u32;
    Ok(weights)
}

// Samples outside the buffer count as transparent so shadows fade at the canvas edge.
fn horizontal_pass(src: &[u8], dst: &mut [u8], w: usize, r: Region, k: &[u32]) {
    let radius = k.len() / 2;
    for y in r.y0..r.y1 {
        for x in r.x0..r.x1 {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let Some(sx) = (x + ki).checked_sub(radius).filter(|&sx| sx < w) else {
                    continue;
                };
                let idx = (y * w + sx) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = (y * w + x) * 4;
            for c in 0..4 {
                dst[out + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], w: usize, r: Region, k: &[u32]) {
    let radius = k.len() / 2;
    let h = src.len() / 4 / w;
    for y in r.y0..r.y1 {
        for x in r.x0..r.x1 {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let Some(sy) = (y + ki).checked_sub(radius).filter(|&sy| sy < h) else {
                    continue;
                };
                let idx = (sy * w + x) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = (y * w + x) * 4;
            for c in 0..4 {
                dst[out + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
