//! マッチ箇所の確認用画像
//!
//! 閾値以上の箇所をすべて探して赤枠で囲む。結果はスロット対応表には使わない。

use super::correlate::{global_max, BestMatch, CorrelationSurface};
use image::{Luma, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

/// 見つけた箇所を塗りつぶすときの下側許容差
const FLOOD_LOWER_TOLERANCE: f32 = 0.1;

/// 閾値以上のピークをすべて返す
///
/// 最大値を取り出すたびに、その周辺（4近傍で連続し、隣より0.1以上は下がらない領域）を
/// 0で塗りつぶしてから次の最大値を探す。
pub fn find_peaks(surface: &CorrelationSurface, threshold: f32) -> Vec<BestMatch> {
    let mut working = surface.clone();
    for pixel in working.pixels_mut() {
        if pixel[0] < threshold {
            *pixel = Luma([0.0]);
        }
    }

    let mut peaks = Vec::new();
    while let Some(peak) = global_max(&working) {
        if peak.score < threshold || peak.score <= 0.0 {
            break;
        }
        peaks.push(peak);
        flood_clear(&mut working, peak.x, peak.y);
    }
    peaks
}

fn flood_clear(surface: &mut CorrelationSurface, x: u32, y: u32) {
    let (width, height) = surface.dimensions();
    let mut stack = vec![(x, y, surface.get_pixel(x, y)[0])];

    while let Some((x, y, neighbour)) = stack.pop() {
        let value = surface.get_pixel(x, y)[0];
        if value <= 0.0 || value < neighbour - FLOOD_LOWER_TOLERANCE {
            continue;
        }
        surface.put_pixel(x, y, Luma([0.0]));

        if x > 0 {
            stack.push((x - 1, y, value));
        }
        if x + 1 < width {
            stack.push((x + 1, y, value));
        }
        if y > 0 {
            stack.push((x, y - 1, value));
        }
        if y + 1 < height {
            stack.push((x, y + 1, value));
        }
    }
}

/// ピーク位置にテンプレートサイズの赤枠を描く
pub fn draw_matches(image: &mut RgbImage, peaks: &[BestMatch], template_size: (u32, u32)) {
    let (width, height) = template_size;
    for peak in peaks {
        let rect = Rect::at(peak.x as i32, peak.y as i32).of_size(width.max(1), height.max(1));
        draw_hollow_rect_mut(image, rect, Rgb([255, 0, 0]));
        // 2px幅
        if width > 2 && height > 2 {
            let inner = Rect::at(peak.x as i32 + 1, peak.y as i32 + 1).of_size(width - 2, height - 2);
            draw_hollow_rect_mut(image, inner, Rgb([255, 0, 0]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_peaks_separates_regions() {
        let mut surface = CorrelationSurface::new(10, 3);
        // 左のピーク（なだらかに下がる）
        surface.put_pixel(1, 1, Luma([0.95]));
        surface.put_pixel(2, 1, Luma([0.9]));
        // 右のピーク
        surface.put_pixel(7, 1, Luma([0.85]));
        // 閾値未満
        surface.put_pixel(4, 0, Luma([0.5]));

        let peaks = find_peaks(&surface, 0.8);
        let points: Vec<(u32, u32)> = peaks.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(points, vec![(1, 1), (7, 1)]);
    }

    #[test]
    fn test_find_peaks_none_above_threshold() {
        let surface = CorrelationSurface::from_pixel(4, 4, Luma([0.3]));
        assert!(find_peaks(&surface, 0.8).is_empty());
    }

    #[test]
    fn test_draw_matches_marks_border() {
        let mut image = RgbImage::new(20, 20);
        let peaks = vec![BestMatch { score: 0.9, x: 5, y: 5 }];
        draw_matches(&mut image, &peaks, (6, 6));

        assert_eq!(image.get_pixel(5, 5), &Rgb([255, 0, 0]));
        assert_eq!(image.get_pixel(10, 10), &Rgb([255, 0, 0]));
        assert_eq!(image.get_pixel(8, 8), &Rgb([0, 0, 0]));
    }
}
