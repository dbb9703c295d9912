use std::f64::consts::PI;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    assets::decode::DecodedImage,
    foundation::{
        core::{Affine, Point, Rect},
        error::TokenResult,
        math::derive_seed,
    },
    model::options::LeafOptions,
    render::canvas::{Clip, ImageFit, TokenCanvas},
};

/// Distance of leaf centers from the token center, as a fraction of the radius.
const LEAF_RING: f64 = 0.90;
/// Leaf length as a fraction of the diameter.
const LEAF_SIZE: f64 = 0.11;

/// One leaf on the top arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeafPlacement {
    pub center: Point,
    /// Rotation of the leaf's long axis, in radians.
    pub angle: f64,
    pub size: f64,
}

/// Random source for leaf placement: seeded per entity when `seed` is set.
pub(crate) fn leaf_rng(seed: Option<u64>, entity: &str) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(derive_seed(seed, entity)),
        None => StdRng::from_entropy(),
    }
}

/// Pick leaf positions among evenly spaced slots on the top arc.
///
/// Each slot independently receives a leaf with `probability`, up to `max_leaves`. No random
/// numbers are drawn when leaves are disabled.
pub fn leaf_placements(leaf: &LeafOptions, diameter: f64, rng: &mut impl Rng) -> Vec<LeafPlacement> {
    if leaf.max_leaves == 0 || leaf.slots == 0 || leaf.probability <= 0.0 {
        return Vec::new();
    }
    let r = diameter / 2.0;
    let span = leaf.arc_span_degrees.clamp(0.0, 360.0).to_radians();
    let slots = leaf.slots as usize;
    let step = if slots > 1 { span / (slots - 1) as f64 } else { 0.0 };
    let first = -PI / 2.0 - if slots > 1 { span / 2.0 } else { 0.0 };
    let p = leaf.probability.clamp(0.0, 1.0);

    let mut out = Vec::new();
    for i in 0..slots {
        if out.len() >= leaf.max_leaves as usize {
            break;
        }
        if !rng.gen_bool(p) {
            continue;
        }
        let theta = first + step * i as f64;
        out.push(LeafPlacement {
            center: Point::new(r + LEAF_RING * r * theta.cos(), r + LEAF_RING * r * theta.sin()),
            angle: theta + PI / 2.0,
            size: LEAF_SIZE * diameter,
        });
    }
    out
}

/// Unit leaf outline along the x axis, from `(-0.5, 0)` to `(0.5, 0)`.
fn leaf_path() -> kurbo::BezPath {
    let mut p = kurbo::BezPath::new();
    p.move_to((-0.5, 0.0));
    p.quad_to((0.0, -0.32), (0.5, 0.0));
    p.quad_to((0.0, 0.32), (-0.5, 0.0));
    p.close_path();
    p
}

/// Draw leaves outside the circular clip, using `image` when given and vector leaves otherwise.
pub(crate) fn draw_leaves(
    canvas: &mut TokenCanvas,
    leaves: &[LeafPlacement],
    leaf: &LeafOptions,
    image: Option<&DecodedImage>,
) -> TokenResult<()> {
    if leaves.is_empty() {
        return Ok(());
    }
    let path = leaf_path();
    canvas.paint(Clip::None, |p| {
        for l in leaves {
            match image {
                Some(img) => {
                    let half = l.size / 2.0;
                    let dest = Rect::new(
                        l.center.x - half,
                        l.center.y - half,
                        l.center.x + half,
                        l.center.y + half,
                    );
                    p.draw_image(img, dest, ImageFit::Contain);
                }
                None => {
                    let transform = Affine::translate(l.center.to_vec2())
                        * Affine::rotate(l.angle)
                        * Affine::scale(l.size);
                    p.fill_path(&path, transform, leaf.color);
                }
            }
        }
        Ok(())
    })
}

/// Setup flower overlay across the top of the artwork area.
pub(crate) fn draw_setup_flower(canvas: &mut TokenCanvas, image: &DecodedImage) -> TokenResult<()> {
    let d = canvas.diameter();
    let dest = Rect::new(0.15 * d, 0.02 * d, 0.85 * d, 0.40 * d);
    canvas.paint(Clip::Token, |p| {
        p.draw_image(image, dest, ImageFit::Contain);
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/unit/token/decorations.rs"]
mod tests;
