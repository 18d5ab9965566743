//! OCRエンジン連携
//!
//! コアはOCRの中身を知らず、`OcrEngine` から1つのテキストを受け取るだけ。

use crate::error::{FormationOcrError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// 画像からテキストを取り出す
pub trait OcrEngine: Send + Sync {
    fn extract_text(&self, image: &Path) -> Result<String>;
}

/// OCR設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// tesseract 実行ファイル
    pub command: String,
    /// 学習モデルの言語
    pub language: String,
    /// tessdata フォルダ
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            command: "tesseract".into(),
            language: "jpn".into(),
            tessdata_dir: None,
        }
    }
}

/// OCR済みテキストファイルを読む
///
/// 外部のドキュメントOCRサービスで変換したテキストもこれで渡す。
#[derive(Debug, Clone)]
pub struct TextFileOcr {
    path: PathBuf,
}

impl TextFileOcr {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OcrEngine for TextFileOcr {
    fn extract_text(&self, _image: &Path) -> Result<String> {
        std::fs::read_to_string(&self.path).map_err(|e| {
            FormationOcrError::Ocr(format!(
                "OCRテキストを読み込めません: {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// tesseract CLI を実行する
#[derive(Debug, Clone)]
pub struct TesseractCli {
    settings: OcrSettings,
}

impl TesseractCli {
    pub fn new(settings: OcrSettings) -> Self {
        Self { settings }
    }

    fn args(&self, image: &Path) -> Vec<String> {
        let mut args = vec![
            image.display().to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.settings.language.clone(),
        ];
        if let Some(dir) = &self.settings.tessdata_dir {
            args.push("--tessdata-dir".to_string());
            args.push(dir.display().to_string());
        }
        args
    }
}

impl OcrEngine for TesseractCli {
    fn extract_text(&self, image: &Path) -> Result<String> {
        if self.settings.language.trim().is_empty() {
            return Err(FormationOcrError::Validation(
                "OCRの言語(ocr.language)を指定してください".into(),
            ));
        }
        if let Some(dir) = &self.settings.tessdata_dir {
            if !dir.is_dir() {
                return Err(FormationOcrError::Validation(format!(
                    "指定されたtessdataのパスが存在しません: {}",
                    dir.display()
                )));
            }
        }

        let args = self.args(image);
        debug!(command = %self.settings.command, ?args, "OCR実行");

        let output = Command::new(&self.settings.command)
            .args(&args)
            .output()
            .map_err(|e| {
                FormationOcrError::Ocr(format!("{} を起動できません: {}", self.settings.command, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FormationOcrError::Ocr(format!(
                "{} が失敗しました ({}): {}",
                self.settings.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
