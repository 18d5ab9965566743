//! キャラクター画像マッチング
//!
//! スクリーンショットを編成ごとの帯に切り出し、各帯でアイコンを照合して
//! スロット番号 → キャラクター名リスト を作る。
//!
//! ## 処理フロー
//! 1. 帯に分割（範囲外なら全体を失敗）
//! 2. 帯を二値化してアイコンと照合
//! 3. 位置で並べ替えてスロットに登録

pub mod annotate;
pub mod correlate;
pub mod segment;
pub mod template;

pub use correlate::{BestMatch, CcoeffNormed, Correlator};
pub use segment::{BandLayout, BandRect};
pub use template::TemplateMatcher;

use crate::error::{FormationOcrError, Result};
use crate::scanner::ReferenceIcon;
use formation_ocr_common::SlotMap;
use image::{imageops, GrayImage, RgbImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// マッチング設定
#[derive(Debug, Clone)]
pub struct MatchOptions {
    pub layout: BandLayout,
    pub threshold: f32,
    pub binarize_threshold: u8,
    /// 帯画像の出力先（`None` なら保存しない）
    pub work_dir: Option<PathBuf>,
    /// 確認用画像を出力する（`work_dir` が必要）
    pub annotate: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            layout: BandLayout::default(),
            threshold: 0.8,
            binarize_threshold: 128,
            work_dir: None,
            annotate: false,
        }
    }
}

/// スクリーンショットからスロット対応表を作る
pub fn build_slot_map(
    screenshot: &Path,
    catalog: &[ReferenceIcon],
    correlator: &dyn Correlator,
    options: &MatchOptions,
) -> Result<SlotMap> {
    if catalog.is_empty() {
        return Err(FormationOcrError::matching("キャラクター画像がありません"));
    }

    let image = image::open(screenshot).map_err(|e| {
        FormationOcrError::matching_with(
            format!("画像を読み込めません: {}", screenshot.display()),
            e,
        )
    })?;

    let bands = options.layout.segment(&image)?;

    let prefix = format!(
        "{}_{}",
        chrono::Local::now().format("%Y%m%d%H%M%S%3f"),
        screenshot
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "screenshot".to_string())
    );
    if let Some(dir) = &options.work_dir {
        let saved = segment::save_bands(&bands, dir, &prefix)?;
        debug!(count = saved.len(), dir = %dir.display(), "帯画像を保存");
    }

    let matcher = TemplateMatcher::new(
        correlator,
        catalog,
        options.threshold,
        options.binarize_threshold,
    );

    let mut slots = SlotMap::new();
    for (index, band) in bands.iter().enumerate() {
        let binary = matcher.binarize_band(&imageops::grayscale(band));
        let accepted = matcher.match_band(&binary);

        if options.annotate {
            if let Some(dir) = &options.work_dir {
                let annotated = annotate_band(&matcher, correlator, &binary, band);
                let path = dir.join(format!("{}_{}_matches.png", prefix, index + 1));
                annotated.save(&path).map_err(|e| {
                    FormationOcrError::matching_with(
                        format!("確認用画像を保存できません: {}", path.display()),
                        e,
                    )
                })?;
            }
        }

        let slot = slots.push_band(accepted.into_values());
        info!(
            slot,
            names = ?slots.get(slot).unwrap_or_default(),
            "キャラクターを検出"
        );
    }

    Ok(slots)
}

/// 閾値以上の全箇所を赤枠で囲んだ帯画像を作る
fn annotate_band(
    matcher: &TemplateMatcher<'_>,
    correlator: &dyn Correlator,
    binary: &GrayImage,
    band: &RgbImage,
) -> RgbImage {
    let mut canvas = band.clone();
    for template in matcher.templates() {
        let Some(surface) = correlator.correlate(binary, &template.image) else {
            continue;
        };
        let peaks = annotate::find_peaks(&surface, matcher.threshold());
        if !peaks.is_empty() {
            debug!(name = %template.name, peaks = peaks.len(), "確認用に描画");
        }
        annotate::draw_matches(&mut canvas, &peaks, template.image.dimensions());
    }
    canvas
}
