//! 編成情報の型定義
//!
//! CLIとパイプラインで共有される型:
//! - CharacterRecord: キャラクター名とLv
//! - FormationRecord: プレイヤー1人分の編成
//! - ReportRecord: 最終出力（陣地名 + 合計パーティ数 + 編成一覧）
//!
//! シリアライズ時のフィールド名はMMG形式（PascalCase）に合わせる。

use serde::{Deserialize, Serialize};

/// 数値フィールドの未設定値
pub const UNSET: i32 = -1;

/// キャラクター情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CharacterRecord {
    /// キャラクター名（画像マッチングできなかった場合は空文字）
    #[serde(default)]
    pub name: String,

    /// レベル（想定範囲 1～240、-1 は未設定）
    #[serde(default = "unset_i32")]
    pub level: i32,
}

impl Default for CharacterRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            level: UNSET,
        }
    }
}

impl CharacterRecord {
    pub fn new(name: impl Into<String>, level: i32) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }
}

/// 編成情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FormationRecord {
    #[serde(default)]
    pub player_name: String,

    /// キャラクター情報（最大5）
    #[serde(default, rename = "CharacterDtos")]
    pub characters: Vec<CharacterRecord>,

    #[serde(default = "unset_i32")]
    pub formation_position: i32,

    #[serde(default = "unset_i32")]
    pub rank: i32,

    #[serde(default = "unset_i64")]
    pub combat_power: i64,
}

impl Default for FormationRecord {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            characters: Vec::new(),
            formation_position: UNSET,
            rank: UNSET,
            combat_power: UNSET as i64,
        }
    }
}

/// 戦況レポート（1スクリーンショット分）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportRecord {
    /// 陣地名
    #[serde(default)]
    pub base_name: String,

    /// 合計パーティ数
    #[serde(default)]
    pub sum_party_num: i32,

    /// 編成一覧
    #[serde(default)]
    pub formations: Vec<FormationRecord>,
}

fn unset_i32() -> i32 {
    UNSET
}

fn unset_i64() -> i64 {
    UNSET as i64
}
