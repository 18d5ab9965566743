//! キャラクターアイコンのテンプレートマッチ

use super::correlate::Correlator;
use crate::scanner::ReferenceIcon;
use formation_ocr_common::MatchCandidate;
use image::GrayImage;
use imageproc::contrast::{self, ThresholdType};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// 輝度で二値化する（閾値より大きければ白）
pub fn binarize(image: &GrayImage, level: u8) -> GrayImage {
    contrast::threshold(image, level, ThresholdType::Binary)
}

/// 二値化済みのアイコン
#[derive(Debug, Clone)]
pub struct BinaryTemplate {
    pub name: String,
    pub image: GrayImage,
}

/// 帯画像1枚に対してカタログ全体を照合する
pub struct TemplateMatcher<'a> {
    correlator: &'a dyn Correlator,
    templates: Vec<BinaryTemplate>,
    threshold: f32,
    binarize_threshold: u8,
}

impl<'a> TemplateMatcher<'a> {
    pub fn new(
        correlator: &'a dyn Correlator,
        catalog: &[ReferenceIcon],
        threshold: f32,
        binarize_threshold: u8,
    ) -> Self {
        let templates = catalog
            .iter()
            .map(|icon| BinaryTemplate {
                name: icon.name.clone(),
                image: binarize(&icon.image, binarize_threshold),
            })
            .collect();

        Self {
            correlator,
            templates,
            threshold,
            binarize_threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn templates(&self) -> &[BinaryTemplate] {
        &self.templates
    }

    pub fn binarize_band(&self, band: &GrayImage) -> GrayImage {
        binarize(band, self.binarize_threshold)
    }

    /// 二値化済みの帯画像に対して各アイコンの最大相関を求め、閾値以上のものを返す
    ///
    /// 同じキャラクター名が複数採用された場合はカタログ順で最初のものを残す。
    pub fn match_band(&self, band: &GrayImage) -> HashMap<String, MatchCandidate> {
        // アイコンごとの照合は独立しているので並列に計算し、採用はカタログ順に行う
        let scored: Vec<Option<MatchCandidate>> = self
            .templates
            .par_iter()
            .map(|template| {
                let best = self.correlator.best_match(band, &template.image)?;
                debug!(name = %template.name, score = best.score, x = best.x, y = best.y, "相関");
                (best.score >= self.threshold).then(|| MatchCandidate {
                    name: template.name.clone(),
                    row: best.y,
                    column: best.x,
                    score: best.score,
                })
            })
            .collect();

        let mut accepted = HashMap::new();
        for candidate in scored.into_iter().flatten() {
            accepted.entry(candidate.name.clone()).or_insert(candidate);
        }
        accepted
    }
}
