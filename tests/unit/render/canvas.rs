use super::*;

#[test]
fn rejects_zero_diameter() {
    assert!(TokenCanvas::new(0).unwrap_err().is_validation());
}

#[test]
fn token_clip_keeps_corners_transparent() {
    let mut canvas = TokenCanvas::new(64).unwrap();
    canvas
        .paint(Clip::Token, |p| {
            p.fill_rect(Rect::new(0.0, 0.0, 64.0, 64.0), Color::rgb(200, 10, 10));
            Ok(())
        })
        .unwrap();
    assert_eq!(canvas.pixel(32, 32), Some([200, 10, 10, 255]));
    assert_eq!(canvas.pixel(0, 0).unwrap()[3], 0);
    assert_eq!(canvas.pixel(63, 63).unwrap()[3], 0);
    assert_eq!(canvas.pixel(64, 0), None);
}

#[test]
fn unclipped_layer_reaches_corners() {
    let mut canvas = TokenCanvas::new(32).unwrap();
    canvas
        .paint(Clip::None, |p| {
            p.fill_rect(Rect::new(0.0, 0.0, 32.0, 32.0), Color::WHITE);
            Ok(())
        })
        .unwrap();
    assert_eq!(canvas.pixel(0, 0), Some([255, 255, 255, 255]));
}

#[test]
fn layers_composite_in_order() {
    let mut canvas = TokenCanvas::new(32).unwrap();
    canvas
        .paint(Clip::None, |p| {
            p.fill_rect(Rect::new(0.0, 0.0, 32.0, 32.0), Color::BLACK);
            Ok(())
        })
        .unwrap();
    canvas
        .paint(Clip::None, |p| {
            p.fill_circle(Point::new(16.0, 16.0), 8.0, Color::WHITE);
            Ok(())
        })
        .unwrap();
    assert_eq!(canvas.pixel(16, 16), Some([255, 255, 255, 255]));
    assert_eq!(canvas.pixel(1, 1), Some([0, 0, 0, 255]));
}

#[test]
fn shadow_spreads_beyond_the_shape() {
    let draw = |p: &mut Painter<'_>, c: Color| {
        p.fill_rect(Rect::new(24.0, 24.0, 40.0, 40.0), c);
        Ok(())
    };
    let mut plain = TokenCanvas::new(64).unwrap();
    plain
        .paint_with_shadow(Clip::None, Color::WHITE, None, draw)
        .unwrap();
    assert_eq!(plain.pixel(20, 32).unwrap()[3], 0);

    let mut shadowed = TokenCanvas::new(64).unwrap();
    let shadow = Shadow {
        color: Color::BLACK,
        blur_px: 8.0,
    };
    shadowed
        .paint_with_shadow(Clip::None, Color::WHITE, Some(shadow), draw)
        .unwrap();
    assert!(shadowed.pixel(20, 32).unwrap()[3] > 0);
    assert_eq!(shadowed.pixel(32, 32), Some([255, 255, 255, 255]));
}

#[test]
fn cover_image_fills_destination() {
    let img = DecodedImage::from_rgba8([0u8, 0, 255, 255].repeat(4 * 2), 4, 2).unwrap();
    let mut canvas = TokenCanvas::new(16).unwrap();
    canvas
        .paint(Clip::None, |p| {
            p.draw_image(&img, Rect::new(0.0, 0.0, 16.0, 16.0), ImageFit::Cover);
            Ok(())
        })
        .unwrap();
    assert_eq!(canvas.pixel(8, 1), Some([0, 0, 255, 255]));
    assert_eq!(canvas.pixel(8, 14), Some([0, 0, 255, 255]));

    let mut contain = TokenCanvas::new(16).unwrap();
    contain
        .paint(Clip::None, |p| {
            p.draw_image(&img, Rect::new(0.0, 0.0, 16.0, 16.0), ImageFit::Contain);
            Ok(())
        })
        .unwrap();
    assert_eq!(contain.pixel(8, 1).unwrap()[3], 0);
    assert_eq!(contain.pixel(8, 8), Some([0, 0, 255, 255]));
}

#[test]
fn png_encoding_roundtrips_size() {
    let canvas = TokenCanvas::new(10).unwrap();
    let png = canvas.encode_png().unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (10, 10));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.png");
    canvas.save_png(&path).unwrap();
    assert!(path.exists());
}
