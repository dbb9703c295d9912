use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, px.repeat((w * h) as usize)).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_premultiplies_and_estimates_size() {
    let img = decode_image(&png_bytes(3, 2, [255, 0, 0, 128])).unwrap();
    assert_eq!((img.width, img.height), (3, 2));
    assert_eq!(img.estimated_bytes(), 24);
    assert_eq!(&img.premul_bytes()[..4], &[128, 0, 0, 128]);
}

#[test]
fn decode_rejects_garbage() {
    assert!(matches!(
        decode_image(b"definitely not an image"),
        Err(TokenError::Decode(_))
    ));
    assert!(matches!(
        decode_image(&png_bytes(2, 2, [1, 2, 3, 4])[..20]),
        Err(TokenError::Decode(_))
    ));
}

#[test]
fn decode_svg_rasterizes_at_least_min_edge() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10">
        <rect width="20" height="10" fill="#00ff00"/></svg>"##;
    let img = decode_image(svg).unwrap();
    assert_eq!(img.width, 1024);
    assert_eq!(img.height, 512);
    let mid = ((256 * 1024 + 512) * 4) as usize;
    assert_eq!(&img.premul_bytes()[mid..mid + 4], &[0, 255, 0, 255]);
}

#[test]
fn pixmap_rejects_mismatched_len() {
    assert!(DecodedImage::from_premul_rgba8(&[0; 12], 2, 2).is_err());
}
