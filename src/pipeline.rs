//! 変換パイプライン
//!
//! 入力チェック → OCR → キャラクター画像マッチング → テキスト解析 → Lv補正
//! を1回の同期処理として実行する。途中で失敗した場合は部分的な結果を返さない。

use crate::config::Config;
use crate::error::{FormationOcrError, Result};
use crate::matcher::{self, Correlator, MatchOptions};
use crate::ocr::OcrEngine;
use crate::scanner;
use formation_ocr_common::{
    reconcile_levels, FormationParser, HeaderTokens, ParserOptions, ReportRecord, SlotMap,
};
use std::path::PathBuf;
use tracing::info;

/// 1回の変換に必要な入力
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub image: PathBuf,
    pub base_names: Vec<String>,
    pub headers: HeaderTokens,
    pub character_matching: bool,
    /// キャラクターアイコン画像フォルダ（マッチング時は必須）
    pub catalog_dir: Option<PathBuf>,
    pub match_options: MatchOptions,
    pub level_correction: bool,
}

impl ConversionRequest {
    /// 設定ファイルの値から組み立てる
    pub fn from_config(config: &Config, image: PathBuf) -> Self {
        Self {
            image,
            base_names: config.base_names.clone(),
            headers: config.headers.clone(),
            character_matching: config.character_matching,
            catalog_dir: config.catalog_dir.clone(),
            match_options: MatchOptions {
                layout: config.band_layout.clone(),
                threshold: config.match_threshold,
                binarize_threshold: config.binarize_threshold,
                work_dir: Some(config.resolved_work_dir()),
                annotate: config.annotate_matches,
            },
            level_correction: config.level_correction,
        }
    }

    /// 処理開始前の入力チェック
    pub fn validate(&self) -> Result<()> {
        if self.image.as_os_str().is_empty() {
            return Err(FormationOcrError::Validation("画像ファイルを選択してください".into()));
        }
        if !self.image.is_file() {
            return Err(FormationOcrError::Validation(format!(
                "指定されたファイルが存在しません: {}",
                self.image.display()
            )));
        }
        if self.base_names.iter().all(|name| name.trim().is_empty()) {
            return Err(FormationOcrError::Validation(
                "陣地名リストが設定されていません（config --add-base-name で追加してください）"
                    .into(),
            ));
        }
        if self.character_matching {
            match &self.catalog_dir {
                None => {
                    return Err(FormationOcrError::Validation(
                        "キャラクター画像フォルダを指定してください".into(),
                    ))
                }
                Some(dir) if !dir.is_dir() => {
                    return Err(FormationOcrError::Validation(format!(
                        "キャラクター画像フォルダが見つかりません: {}",
                        dir.display()
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// キャラクター画像マッチングのみを実行する
pub fn match_characters(
    request: &ConversionRequest,
    correlator: &dyn Correlator,
) -> Result<Option<SlotMap>> {
    if !request.character_matching {
        return Ok(None);
    }
    let Some(dir) = &request.catalog_dir else {
        return Err(FormationOcrError::Validation(
            "キャラクター画像フォルダを指定してください".into(),
        ));
    };

    let catalog = scanner::load_catalog(dir)?;
    let slots = matcher::build_slot_map(&request.image, &catalog, correlator, &request.match_options)?;
    Ok(Some(slots))
}

/// テキスト解析とLv補正（マッチング結果は任意）
pub fn parse_report(
    request: &ConversionRequest,
    text: &str,
    slots: Option<&SlotMap>,
) -> Result<ReportRecord> {
    let parser = FormationParser::new(ParserOptions {
        base_names: request.base_names.clone(),
        headers: request.headers.clone(),
    })
    .map_err(FormationOcrError::Parsing)?;

    let mut report = parser.parse(text, slots).map_err(FormationOcrError::Parsing)?;

    // キャラクターや進化状況によって1～240のLvがありうるので、範囲ではなく最頻値で補正する
    if request.level_correction {
        for formation in &mut report.formations {
            reconcile_levels(formation);
        }
    }

    Ok(report)
}

/// スクリーンショット1枚を編成情報に変換する
pub fn convert(
    request: &ConversionRequest,
    ocr: &dyn OcrEngine,
    correlator: &dyn Correlator,
) -> Result<ReportRecord> {
    request.validate()?;

    let text = ocr.extract_text(&request.image)?;
    info!(chars = text.chars().count(), "OCRテキストを取得");

    let slots = match_characters(request, correlator)?;
    if let Some(slots) = &slots {
        info!(slots = slots.len(), "キャラクター画像マッチング完了");
    }

    let report = parse_report(request, &text, slots.as_ref())?;
    info!(
        base_name = %report.base_name,
        formations = report.formations.len(),
        "変換完了"
    );
    Ok(report)
}
