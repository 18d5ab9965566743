//! 正規化相互相関
//!
//! テンプレートマッチの相関計算を `Correlator` として切り出し、
//! 既定実装として平均を引いた正規化相互相関（TM_CCOEFF_NORMED相当）を持つ。

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::template_matching::{find_extremes, match_template_parallel, MatchTemplateMethod};

/// 相関マップ（左上座標ごとの相関値）
pub type CorrelationSurface = ImageBuffer<Luma<f32>, Vec<f32>>;

/// 相関の最大値とその位置（テンプレート左上の座標）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch {
    pub score: f32,
    pub x: u32,
    pub y: u32,
}

/// 画像とテンプレートの相関を計算する
pub trait Correlator: Send + Sync {
    /// テンプレートが対象より大きい場合は `None`
    fn correlate(&self, target: &GrayImage, template: &GrayImage) -> Option<CorrelationSurface>;

    fn best_match(&self, target: &GrayImage, template: &GrayImage) -> Option<BestMatch> {
        self.correlate(target, template)
            .and_then(|surface| global_max(&surface))
    }
}

/// 最大値の位置を返す（同値の場合は行優先で最初のもの）
pub fn global_max(surface: &CorrelationSurface) -> Option<BestMatch> {
    if surface.width() == 0 || surface.height() == 0 {
        return None;
    }
    let extremes = find_extremes(surface);
    let (x, y) = extremes.max_value_location;
    Some(BestMatch {
        score: extremes.max_value,
        x,
        y,
    })
}

/// 平均を引いた正規化相互相関
///
/// 窓内の分散が0（真っ白・真っ黒の領域）の位置は0とする。
#[derive(Debug, Clone, Copy, Default)]
pub struct CcoeffNormed;

impl Correlator for CcoeffNormed {
    fn correlate(&self, target: &GrayImage, template: &GrayImage) -> Option<CorrelationSurface> {
        let (width, height) = target.dimensions();
        let (t_width, t_height) = template.dimensions();
        if t_width == 0 || t_height == 0 || t_width > width || t_height > height {
            return None;
        }

        let (tw, th) = (t_width as usize, t_height as usize);
        let n = (tw * th) as f64;

        let t_mean = template.pixels().map(|p| p[0] as f64).sum::<f64>() / n;
        let t_sum_sq: f64 = template
            .pixels()
            .map(|p| (p[0] as f64 - t_mean).powi(2))
            .sum();

        // Σ(T - T平均)·I = Σ T·I - T平均·ΣI
        let cross_raw = match_template_parallel(target, template, MatchTemplateMethod::CrossCorrelation);
        let integral = IntegralImages::new(target);

        let mut surface = CorrelationSurface::new(cross_raw.width(), cross_raw.height());
        for (x, y, out) in surface.enumerate_pixels_mut() {
            let (sum, sum_sq) = integral.window(x as usize, y as usize, tw, th);
            let cross = cross_raw.get_pixel(x, y)[0] as f64 - t_mean * sum;
            let variance = sum_sq - sum * sum / n;
            let denominator = (t_sum_sq * variance).sqrt();

            out[0] = if denominator > f64::EPSILON {
                (cross / denominator).clamp(-1.0, 1.0) as f32
            } else {
                0.0
            };
        }

        Some(surface)
    }
}

/// 窓内の総和・二乗和を求めるための積分画像
struct IntegralImages {
    stride: usize,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl IntegralImages {
    fn new(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        let stride = width as usize + 1;
        let mut sum = vec![0.0; stride * (height as usize + 1)];
        let mut sum_sq = vec![0.0; stride * (height as usize + 1)];

        for (x, y, pixel) in image.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            let value = pixel[0] as f64;
            let at = (y + 1) * stride + x + 1;
            sum[at] = value + sum[at - stride] + sum[at - 1] - sum[at - stride - 1];
            sum_sq[at] =
                value * value + sum_sq[at - stride] + sum_sq[at - 1] - sum_sq[at - stride - 1];
        }

        Self { stride, sum, sum_sq }
    }

    fn window(&self, x: usize, y: usize, width: usize, height: usize) -> (f64, f64) {
        let top_left = y * self.stride + x;
        let top_right = top_left + width;
        let bottom_left = (y + height) * self.stride + x;
        let bottom_right = bottom_left + width;

        let area = |table: &[f64]| {
            table[bottom_right] - table[bottom_left] - table[top_right] + table[top_left]
        };
        (area(&self.sum), area(&self.sum_sq))
    }
}
