//! 帯画像の切り出し
//!
//! 戦況画面の編成欄は縦に並んでおり、下に行くほど行間がわずかに広がる。
//! 初期矩形から切り出すたびに、基本間隔 + 累積増分だけ下へずらす。

use crate::error::{FormationOcrError, Result};
use image::{DynamicImage, GenericImageView, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 切り出し矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// 帯の配置（偵察情報画面を基準とした座標）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandLayout {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// 帯の枚数
    pub count: u32,
    /// 帯ごとの基本間隔
    pub spacing: u32,
    /// 間隔の増分（帯ごとに累積）
    pub spacing_step: u32,
}

impl Default for BandLayout {
    fn default() -> Self {
        Self {
            x: 280,
            y: 210,
            width: 1000,
            height: 80,
            count: 4,
            spacing: 95,
            spacing_step: 5,
        }
    }
}

impl BandLayout {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.count == 0 {
            return Err(FormationOcrError::Config(
                "band_layout の幅・高さ・枚数は1以上にしてください".into(),
            ));
        }
        self.rects()?;
        Ok(())
    }

    /// 各帯の矩形を上から順に返す（座標が u32 に収まらなければ設定エラー）
    pub fn rects(&self) -> Result<Vec<BandRect>> {
        let overflow = || {
            FormationOcrError::Config(format!(
                "band_layout の座標が大きすぎます: y={} spacing={} spacing_step={} count={}",
                self.y, self.spacing, self.spacing_step, self.count
            ))
        };

        let mut rects = Vec::with_capacity(self.count as usize);
        let mut y = self.y;
        let mut growth: u32 = 0;

        for i in 0..self.count {
            if i > 0 {
                y = self
                    .spacing
                    .checked_add(growth)
                    .and_then(|step| y.checked_add(step))
                    .ok_or_else(overflow)?;
                growth = growth.checked_add(self.spacing_step).ok_or_else(overflow)?;
            }
            rects.push(BandRect {
                x: self.x,
                y,
                width: self.width,
                height: self.height,
            });
        }

        Ok(rects)
    }

    /// スクリーンショットを帯に分割する
    ///
    /// 1枚でも画像外にはみ出す矩形があれば何も切り出さずにエラーを返す。
    pub fn segment(&self, image: &DynamicImage) -> Result<Vec<RgbImage>> {
        let (width, height) = image.dimensions();
        let rects = self
            .rects()
            .map_err(|e| FormationOcrError::matching_with("帯の配置が不正です", e))?;

        if let Some(rect) = rects.iter().find(|r| {
            u64::from(r.x) + u64::from(r.width) > u64::from(width)
                || u64::from(r.y) + u64::from(r.height) > u64::from(height)
        }) {
            return Err(FormationOcrError::matching(format!(
                "切り出し範囲が画像外です: ({}, {}, {}x{}) / 画像 {}x{}",
                rect.x, rect.y, rect.width, rect.height, width, height
            )));
        }

        Ok(rects
            .iter()
            .map(|r| image.crop_imm(r.x, r.y, r.width, r.height).to_rgb8())
            .collect())
    }
}

/// 帯画像を `<prefix>_<n>.png` として保存する
pub fn save_bands(bands: &[RgbImage], dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut paths = Vec::with_capacity(bands.len());
    for (i, band) in bands.iter().enumerate() {
        let path = dir.join(format!("{}_{}.png", prefix, i + 1));
        band.save(&path).map_err(|e| {
            FormationOcrError::matching_with(
                format!("帯画像を保存できません: {}", path.display()),
                e,
            )
        })?;
        paths.push(path);
    }
    Ok(paths)
}
