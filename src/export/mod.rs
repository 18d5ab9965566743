//! 変換結果の出力
//!
//! MMG形式（PascalCaseのJSON）で書き出す。

use crate::error::Result;
use formation_ocr_common::ReportRecord;
use std::path::Path;

/// JSON文字列に変換する
pub fn to_json(report: &ReportRecord, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    Ok(json)
}

/// ファイルへ保存する（`None` なら標準出力）
pub fn write_report(report: &ReportRecord, output: Option<&Path>, pretty: bool) -> Result<()> {
    let json = to_json(report, pretty)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)?;
        }
        None => println!("{}", json),
    }
    Ok(())
}
