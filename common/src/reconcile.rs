//! Lv補正モジュール
//!
//! 編成内のキャラクターLvは通常すべて同じ値になるため、
//! 最頻出のLvで全キャラクターを上書きしてOCRの読み違いを補正する。

use crate::types::FormationRecord;

/// 最頻出のLvを取得する
///
/// 出現回数が同じ場合は先に出現した値を優先する。
pub fn most_frequent_level(levels: impl IntoIterator<Item = i32>) -> Option<i32> {
    // 出現順を保持するためVecで数える
    let mut counts: Vec<(i32, usize)> = Vec::new();
    for level in levels {
        match counts.iter_mut().find(|(value, _)| *value == level) {
            Some((_, count)) => *count += 1,
            None => counts.push((level, 1)),
        }
    }

    let mut best: Option<(i32, usize)> = None;
    for (level, count) in counts {
        if best.map_or(true, |(_, max)| count > max) {
            best = Some((level, count));
        }
    }
    best.map(|(level, _)| level)
}

/// 編成内の全キャラクターLvを最頻出値に揃える
///
/// キャラクターがいない編成は何もしない。2回目以降の適用は変化しない。
pub fn reconcile_levels(formation: &mut FormationRecord) {
    let Some(level) = most_frequent_level(formation.characters.iter().map(|c| c.level)) else {
        return;
    };

    for character in &mut formation.characters {
        character.level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CharacterRecord;

    fn formation_with_levels(levels: &[i32]) -> FormationRecord {
        FormationRecord {
            characters: levels
                .iter()
                .map(|&level| CharacterRecord::new("", level))
                .collect(),
            ..Default::default()
        }
    }

    fn levels_of(formation: &FormationRecord) -> Vec<i32> {
        formation.characters.iter().map(|c| c.level).collect()
    }

    #[test]
    fn test_most_frequent_level() {
        assert_eq!(most_frequent_level(vec![10, 10, 20]), Some(10));
        assert_eq!(most_frequent_level(vec![20, 10, 10]), Some(10));
        assert_eq!(most_frequent_level(Vec::new()), None);
    }

    #[test]
    fn test_most_frequent_level_tie_prefers_first() {
        assert_eq!(most_frequent_level(vec![150, 7, 7, 150]), Some(150));
        assert_eq!(most_frequent_level(vec![3, 4, 5]), Some(3));
    }

    #[test]
    fn test_reconcile_levels_uses_mode() {
        let mut formation = formation_with_levels(&[10, 10, 20]);
        reconcile_levels(&mut formation);
        assert_eq!(levels_of(&formation), vec![10, 10, 10]);
    }

    #[test]
    fn test_reconcile_levels_keeps_names() {
        let mut formation = FormationRecord {
            characters: vec![
                CharacterRecord::new("アイリス", 180),
                CharacterRecord::new("", 130),
                CharacterRecord::new("ベラ", 180),
            ],
            ..Default::default()
        };
        reconcile_levels(&mut formation);
        assert_eq!(formation.characters[0].name, "アイリス");
        assert_eq!(formation.characters[1].name, "");
        assert_eq!(levels_of(&formation), vec![180, 180, 180]);
    }

    #[test]
    fn test_reconcile_levels_empty_is_noop() {
        let mut formation = formation_with_levels(&[]);
        reconcile_levels(&mut formation);
        assert!(formation.characters.is_empty());
    }

    #[test]
    fn test_reconcile_levels_idempotent() {
        let mut once = formation_with_levels(&[99, 50, 99, 30, 50]);
        reconcile_levels(&mut once);
        let mut twice = once.clone();
        reconcile_levels(&mut twice);
        assert_eq!(once, twice);
    }
}
