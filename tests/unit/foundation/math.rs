use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(255, 0), 0);
    assert_eq!(mul_div255_u16(127, 128), 64);
}

#[test]
fn transparent_layer_leaves_frame_untouched() {
    let mut dst = vec![10u8, 20, 30, 255, 40, 50, 60, 255];
    let before = dst.clone();
    composite_premul_over_opaque(&mut dst, &[0u8; 8]);
    assert_eq!(dst, before);
}

#[test]
fn opaque_layer_replaces_pixel() {
    let mut dst = vec![10u8, 20, 30, 255];
    composite_premul_over_opaque(&mut dst, &[200, 100, 0, 255]);
    assert_eq!(dst, vec![200, 100, 0, 255]);
}

#[test]
fn half_alpha_blends_over_frame() {
    // Premultiplied white @ 50% over black gives mid grey.
    let mut dst = vec![0u8, 0, 0, 255];
    composite_premul_over_opaque(&mut dst, &[128, 128, 128, 128]);
    assert_eq!(dst, vec![128, 128, 128, 255]);
}
