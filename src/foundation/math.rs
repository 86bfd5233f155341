pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Composite a premultiplied RGBA8 layer over an opaque straight RGBA8 frame in place.
pub(crate) fn composite_premul_over_opaque(dst: &mut [u8], layer_premul: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(layer_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 0 {
            continue;
        }
        if a == 255 {
            d[..3].copy_from_slice(&s[..3]);
            d[3] = 255;
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let v = u16::from(s[c]) + mul_div255_u16(u16::from(d[c]), inv);
            d[c] = v.min(255) as u8;
        }
        d[3] = 255;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
