use image::Rgba;

use super::TRANSPARENT;

/// Porter-Duff source-over on straight (non-premultiplied) RGBA.
pub fn blend_source_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let src_a = u32::from(src[3]);
    if src_a == 0 {
        return;
    }
    if src_a == 255 {
        *dst = src;
        return;
    }

    let dst_a = u32::from(dst[3]);
    // Scaled by 255 * 255 to stay in integers.
    let dst_weight = dst_a * (255 - src_a);
    let out_a_scaled = src_a * 255 + dst_weight;
    if out_a_scaled == 0 {
        *dst = TRANSPARENT;
        return;
    }

    for channel in 0..3 {
        let src_c = u32::from(src[channel]);
        let dst_c = u32::from(dst[channel]);
        let numerator = src_c * src_a * 255 + dst_c * dst_weight;
        dst[channel] = ((numerator + out_a_scaled / 2) / out_a_scaled) as u8;
    }
    dst[3] = ((out_a_scaled + 127) / 255).min(255) as u8;
}

pub fn clear_pixel(dst: &mut Rgba<u8>) {
    *dst = TRANSPARENT;
}
