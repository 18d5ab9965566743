//! スロット組み立てモジュール
//!
//! 帯画像ごとのマッチ結果を画面上の並び順（上→下、左→右）に整列し、
//! 編成スロット番号 → キャラクター名リスト の対応表を作る。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// テンプレートマッチの採用候補
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// 論理キャラクター名
    pub name: String,
    /// 帯画像内の行座標（左上Y）
    pub row: u32,
    /// 帯画像内の列座標（左上X）
    pub column: u32,
    /// 相関値（0～1）
    pub score: f32,
}

/// Y座標を行バケットに量子化する
///
/// 10進表記の先頭1桁の直後に小数点を挿入して実数として読み、切り上げる
/// （205 → 2.05 → 3、401 → 4.01 → 5）。テンプレートごとに数pxずれる高さを
/// 同じバケットに寄せるための経験則で、一般的な丸めではない。
///
/// 1桁の座標は "5." → 5 のようにそのままの値になる。0 は 0。
/// 200 → 2.00 → 2 と 201 → 3 が別バケットになるのも既知の挙動。
pub fn quantize_row(row: u32) -> u32 {
    let digits = row.to_string();
    let (head, tail) = digits.split_at(1);
    format!("{}.{}", head, tail)
        .parse::<f64>()
        .map(|value| value.ceil() as u32)
        .unwrap_or(row)
}

/// 編成スロット番号（1始まり）→ キャラクター名リスト
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMap {
    slots: BTreeMap<u32, Vec<String>>,
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 帯1枚分の候補を並べ替えて次のスロットに登録し、そのスロット番号を返す
    ///
    /// 並び順は（量子化した行, 列）の昇順。座標が完全に一致した場合は名前順で、
    /// 入力順に依存しない。
    pub fn push_band<I>(&mut self, candidates: I) -> u32
    where
        I: IntoIterator<Item = MatchCandidate>,
    {
        let mut ordered: Vec<(u32, MatchCandidate)> = candidates
            .into_iter()
            .map(|c| (quantize_row(c.row), c))
            .collect();
        ordered.sort_by(|(row_a, a), (row_b, b)| {
            row_a
                .cmp(row_b)
                .then(a.column.cmp(&b.column))
                .then_with(|| a.name.cmp(&b.name))
        });

        let slot = self.slots.len() as u32 + 1;
        let names = ordered.into_iter().map(|(_, c)| c.name).collect();
        self.slots.insert(slot, names);
        slot
    }

    /// 指定スロットのキャラクター名リスト
    pub fn get(&self, slot: u32) -> Option<&[String]> {
        self.slots.get(&slot).map(|names| names.as_slice())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[String])> {
        self.slots.iter().map(|(slot, names)| (*slot, names.as_slice()))
    }
}
