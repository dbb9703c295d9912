use super::*;

#[test]
fn zero_blur_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(shadow_blur(&src, 1, 2, 0.0).unwrap(), src);
}

#[test]
fn empty_layer_stays_empty() {
    let src = vec![0u8; 16 * 16 * 4];
    assert_eq!(shadow_blur(&src, 16, 16, 6.0).unwrap(), src);
}

#[test]
fn blur_spreads_energy_and_preserves_it() {
    let (w, h) = (21u32, 21u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((10 * w + 10) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = shadow_blur(&src, w, h, 3.0).unwrap();
    let nonzero = out.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(nonzero > 1);
    assert!(out[center + 3] < 255);

    let sum_a: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 12);
}

#[test]
fn kernel_sums_to_one_in_q16() {
    let k = gaussian_kernel_q16(4, 1.5).unwrap();
    assert_eq!(k.len(), 9);
    assert_eq!(k.iter().sum::<u32>(), 65536);
    assert!(gaussian_kernel_q16(2, 0.0).is_err());
}

#[test]
fn rejects_mismatched_buffer() {
    assert!(shadow_blur(&[0u8; 12], 2, 2, 2.0).is_err());
}
