use image::RgbaImage;

use super::StrokeStyle;

/// Per-channel distance from the seed color a base pixel may have and still join the region.
pub const DEFAULT_FILL_TOLERANCE: u8 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillReport {
    pub painted: usize,
    pub visited: usize,
}

/// Grows a 4-connected region over the base photo from `start` and paints it into the mask.
///
/// A candidate joins when it is in bounds, unvisited, unpainted in the mask
/// (alpha 0), and each RGB channel is within `tolerance` of the seed pixel.
/// Painted mask pixels are hard borders. Uses an explicit stack.
pub fn flood_fill(
    base: &RgbaImage,
    mask: &mut RgbaImage,
    start: (u32, u32),
    style: &StrokeStyle,
    tolerance: u8,
) -> FillReport {
    let (width, height) = base.dimensions();
    let mut report = FillReport::default();
    if mask.dimensions() != (width, height) || start.0 >= width || start.1 >= height {
        return report;
    }

    let seed = *base.get_pixel(start.0, start.1);
    let paint = style.paint();
    let row = width as usize;
    let mut visited = vec![false; row * height as usize];
    let mut stack: Vec<(u32, u32)> = Vec::with_capacity(1024);
    stack.push(start);

    while let Some((x, y)) = stack.pop() {
        if x >= width || y >= height {
            continue;
        }
        let index = y as usize * row + x as usize;
        if visited[index] {
            continue;
        }
        visited[index] = true;
        report.visited += 1;

        if mask.get_pixel(x, y)[3] != 0 {
            continue;
        }
        let candidate = base.get_pixel(x, y);
        let within = (0..3).all(|channel| candidate[channel].abs_diff(seed[channel]) <= tolerance);
        if !within {
            continue;
        }

        mask.put_pixel(x, y, paint);
        report.painted += 1;

        // Wrapping keeps x-1 at 0 and y-1 at 0 out of bounds for the check above.
        stack.push((x.wrapping_add(1), y));
        stack.push((x.wrapping_sub(1), y));
        stack.push((x, y.wrapping_add(1)));
        stack.push((x, y.wrapping_sub(1)));
    }

    tracing::debug!(
        start_x = start.0,
        start_y = start.1,
        painted = report.painted,
        visited = report.visited,
        "flood fill finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::tools::DEFAULT_ACCENT_COLOR;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn style() -> StrokeStyle {
        StrokeStyle::new(10, 1.0, DEFAULT_ACCENT_COLOR)
    }

    /// 20x20 white photo split by a black vertical wall at x = 10.
    fn split_base() -> RgbaImage {
        RgbaImage::from_fn(20, 20, |x, _| if x == 10 { BLACK } else { WHITE })
    }

    #[test]
    fn fill_stops_at_color_edges() {
        let base = split_base();
        let mut mask = RgbaImage::new(20, 20);
        let report = flood_fill(&base, &mut mask, (2, 2), &style(), DEFAULT_FILL_TOLERANCE);

        assert_eq!(report.painted, 10 * 20);
        assert_eq!(mask.get_pixel(9, 19)[3], 255);
        assert_eq!(mask.get_pixel(10, 5)[3], 0);
        assert_eq!(mask.get_pixel(15, 5)[3], 0);
    }

    #[test]
    fn tolerance_is_per_channel() {
        // Every channel differs by exactly 30, which still joins; 31 on one channel does not.
        let base = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => Rgba([100, 100, 100, 255]),
            1 => Rgba([130, 70, 130, 255]),
            _ => Rgba([131, 100, 100, 255]),
        });
        let mut mask = RgbaImage::new(3, 1);
        let report = flood_fill(&base, &mut mask, (0, 0), &style(), DEFAULT_FILL_TOLERANCE);
        assert_eq!(report.painted, 2);
        assert_eq!(mask.get_pixel(2, 0)[3], 0);
    }

    #[test]
    fn painted_mask_pixels_are_hard_borders() {
        let base = RgbaImage::from_pixel(20, 20, WHITE);
        let mut mask = RgbaImage::new(20, 20);
        let wall = Rgba([9, 9, 9, 40]);
        for y in 0..20 {
            mask.put_pixel(10, y, wall);
        }
        let report = flood_fill(&base, &mut mask, (0, 0), &style(), DEFAULT_FILL_TOLERANCE);

        assert_eq!(report.painted, 10 * 20);
        for y in 0..20 {
            assert_eq!(*mask.get_pixel(10, y), wall);
            assert_eq!(mask.get_pixel(15, y)[3], 0);
        }
    }

    #[test]
    fn start_on_painted_pixel_is_noop() {
        let base = RgbaImage::from_pixel(5, 5, WHITE);
        let mut mask = RgbaImage::new(5, 5);
        mask.put_pixel(2, 2, Rgba([1, 1, 1, 1]));
        let before = mask.clone();
        let report = flood_fill(&base, &mut mask, (2, 2), &style(), DEFAULT_FILL_TOLERANCE);
        assert_eq!(report.painted, 0);
        assert_eq!(mask, before);
    }

    #[test]
    fn out_of_bounds_start_is_noop() {
        let base = RgbaImage::from_pixel(5, 5, WHITE);
        let mut mask = RgbaImage::new(5, 5);
        let report = flood_fill(&base, &mut mask, (5, 0), &style(), DEFAULT_FILL_TOLERANCE);
        assert_eq!(report, FillReport::default());
        assert_eq!(mask, RgbaImage::new(5, 5));
    }

    #[test]
    fn repeated_fill_on_fresh_mask_is_deterministic() {
        let base = RgbaImage::from_fn(32, 32, |x, y| {
            let shade = ((x * 7 + y * 13) % 90) as u8;
            Rgba([shade, shade, shade, 255])
        });
        let mut first = RgbaImage::new(32, 32);
        let mut second = RgbaImage::new(32, 32);
        flood_fill(&base, &mut first, (16, 16), &style(), DEFAULT_FILL_TOLERANCE);
        flood_fill(&base, &mut second, (16, 16), &style(), DEFAULT_FILL_TOLERANCE);
        assert_eq!(first, second);
    }

    #[test]
    fn fill_paints_with_configured_opacity() {
        let base = RgbaImage::from_pixel(4, 4, WHITE);
        let mut mask = RgbaImage::new(4, 4);
        let style = StrokeStyle::new(10, 0.5, DEFAULT_ACCENT_COLOR);
        flood_fill(&base, &mut mask, (0, 0), &style, DEFAULT_FILL_TOLERANCE);
        assert!(mask.pixels().all(|pixel| *pixel == Rgba([255, 64, 129, 128])));
    }

    #[test]
    fn large_uniform_region_does_not_recurse() {
        let base = RgbaImage::from_pixel(1024, 512, WHITE);
        let mut mask = RgbaImage::new(1024, 512);
        let report = flood_fill(&base, &mut mask, (0, 0), &style(), DEFAULT_FILL_TOLERANCE);
        assert_eq!(report.painted, 1024 * 512);
    }
}
