//! 見出し文字列モジュール
//!
//! OCRテキストを区切るアンカーとなる見出し（合計パーティ数・ランク・戦闘力）を定義する。
//! ゲームの表示言語ごとにプリセットを持つ。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 見出しトークン
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderTokens {
    /// 合計パーティ数
    pub party_count: String,
    /// ランク
    pub rank: String,
    /// 戦闘力
    pub combat_power: String,
}

impl Default for HeaderTokens {
    fn default() -> Self {
        Self::japanese()
    }
}

impl HeaderTokens {
    /// 組み込みプリセットを取得
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "ja" | "jpn" | "japanese" | "日本語" => Some(Self::japanese()),
            "en" | "eng" | "english" => Some(Self::english()),
            _ => None,
        }
    }

    /// 日本語クライアントの見出し
    pub fn japanese() -> Self {
        Self {
            party_count: "合計パーティ数".into(),
            rank: "ランク".into(),
            combat_power: "戦闘力".into(),
        }
    }

    /// 英語クライアントの見出し
    pub fn english() -> Self {
        Self {
            party_count: "total party count".into(),
            rank: "rank".into(),
            combat_power: "combat power".into(),
        }
    }

    /// 空の見出しは全行にマッチしてしまうため拒否する
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("party_count", &self.party_count),
            ("rank", &self.rank),
            ("combat_power", &self.combat_power),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("見出し `{}` が空です", field)));
            }
        }
        Ok(())
    }
}
