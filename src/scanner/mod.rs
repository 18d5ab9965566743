use crate::error::{FormationOcrError, Result};
use image::GrayImage;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// キャラクターアイコン（テンプレート画像）
#[derive(Debug, Clone)]
pub struct ReferenceIcon {
    /// 論理キャラクター名（ファイル名の最初の `_` より前）
    pub name: String,
    pub path: PathBuf,
    pub image: GrayImage,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// ファイル名からキャラクター名を取り出す
///
/// 同じキャラクターの別衣装などを `名前_2.png` のように複数登録できる。
pub fn logical_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let name = stem.split('_').next().unwrap_or_default();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn is_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// フォルダ直下の画像ファイルをファイル名順に列挙する
pub fn scan_catalog_files(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(FormationOcrError::Validation(format!(
            "キャラクター画像フォルダが見つかりません: {}",
            folder.display()
        )));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1) // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.is_file() && is_image_extension(path))
        .collect();

    // 同名キャラクターは先勝ちなので順序を固定する
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// キャラクターアイコンを読み込む
pub fn load_catalog(folder: &Path) -> Result<Vec<ReferenceIcon>> {
    let mut icons = Vec::new();

    for path in scan_catalog_files(folder)? {
        let Some(name) = logical_name(&path) else {
            debug!(path = %path.display(), "キャラクター名を取得できないファイルをスキップ");
            continue;
        };

        let image = image::open(&path)
            .map_err(|e| {
                FormationOcrError::matching_with(
                    format!("アイコン画像を読み込めません: {}", path.display()),
                    e,
                )
            })?
            .to_luma8();

        icons.push(ReferenceIcon { name, path, image });
    }

    if icons.is_empty() {
        return Err(FormationOcrError::matching(format!(
            "キャラクター画像がありません: {}",
            folder.display()
        )));
    }

    debug!(count = icons.len(), "キャラクター画像を読み込み");
    Ok(icons)
}
