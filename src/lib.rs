//! ギルドバトル戦況スクリーンショットから編成情報を抽出する
//!
//! 解析ロジック（テキスト解析・Lv補正）は `formation-ocr-common` にあり、
//! このクレートは画像マッチング・OCR連携・CLIを担当する。

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod matcher;
pub mod ocr;
pub mod pipeline;
pub mod scanner;
