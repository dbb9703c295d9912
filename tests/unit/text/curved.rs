use super::*;

struct FixedWidth;

impl TextMeasure for FixedWidth {
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * 0.5
    }
}

fn params(spacing: f64, position: ArcPosition) -> CurvedTextParams {
    CurvedTextParams {
        center: Point::new(150.0, 150.0),
        radius: 120.0,
        font_size: 20.0,
        letter_spacing: spacing,
        position,
        max_arc: DEFAULT_MAX_ARC,
    }
}

#[test]
fn span_is_sum_of_increments() {
    let layout = layout_curved_text("IMP", &params(0.0, ArcPosition::Top), &FixedWidth);
    assert_eq!(layout.glyphs.len(), 3);
    let expected = 3.0 * 10.0 / 120.0;
    assert!((layout.natural_span - expected).abs() < 1e-12);
    assert!((layout.span - expected).abs() < 1e-12);
    assert!(!layout.compressed);
}

#[test]
fn letter_spacing_increases_span() {
    let tight = layout_curved_text("BARON", &params(0.0, ArcPosition::Top), &FixedWidth);
    let loose = layout_curved_text("BARON", &params(3.0, ArcPosition::Top), &FixedWidth);
    assert!(loose.natural_span > tight.natural_span);
    assert!((loose.natural_span - tight.natural_span - 5.0 * 3.0 / 120.0).abs() < 1e-12);
}

#[test]
fn top_label_is_centered_on_top() {
    let layout = layout_curved_text("ABC", &params(0.0, ArcPosition::Top), &FixedWidth);
    let mid = &layout.glyphs[1];
    assert!((mid.angle + PI / 2.0).abs() < 1e-12);
    // The middle glyph's center sits at the top of the baseline circle.
    let p = mid.transform * Point::new(mid.width / 2.0, 0.0);
    assert!((p.x - 150.0).abs() < 1e-9);
    assert!((p.y - 30.0).abs() < 1e-9);
    // Reads clockwise: angles increase.
    assert!(layout.glyphs[0].angle < layout.glyphs[2].angle);
}

#[test]
fn bottom_label_reads_left_to_right() {
    let layout = layout_curved_text("ABC", &params(0.0, ArcPosition::Bottom), &FixedWidth);
    let first = &layout.glyphs[0];
    let last = &layout.glyphs[2];
    let pf = first.transform * Point::new(first.width / 2.0, 0.0);
    let pl = last.transform * Point::new(last.width / 2.0, 0.0);
    assert!(pf.x < pl.x);
    let mid = &layout.glyphs[1];
    let pm = mid.transform * Point::new(mid.width / 2.0, 0.0);
    assert!((pm.y - 270.0).abs() < 1e-9);
}

#[test]
fn long_names_are_compressed_to_max_arc() {
    let text = "THE VERY LONG NAME OF A HOMEBREW CHARACTER";
    let layout = layout_curved_text(text, &params(0.0, ArcPosition::Top), &FixedWidth);
    assert!(layout.natural_span > DEFAULT_MAX_ARC);
    assert!(layout.compressed);
    assert!((layout.span - DEFAULT_MAX_ARC).abs() < 1e-9);
    assert_eq!(layout.glyphs.len(), text.chars().count());

    let mut p = params(0.0, ArcPosition::Top);
    p.max_arc = 10.0;
    p.radius = 5.0;
    let wrapped = layout_curved_text(text, &p, &FixedWidth);
    assert!(wrapped.span <= TAU + 1e-9);
}
