//! 戦況OCRテキストパーサー
//!
//! OCRエンジンが返した行単位のテキストを1回の走査で読み、
//! 陣地名・合計パーティ数・編成情報を取り出す。
//!
//! ## 読み取り順
//! 1. 陣地名（既知の陣地名を含む行が出るまで読み飛ばす）
//! 2. 合計パーティ数（見出し行と整数にならないゴミ行を読み飛ばす）
//! 3. 編成ごとに繰り返し
//!    - プレイヤー名 → Lv行 → 編成位置 → ランク → 戦闘力
//!
//! 空行は常に無視する。画像マッチングを使う場合、マッチングで得られた
//! スロット数を超えた時点で残りの入力は捨てる。
//!
//! ランクが読めないまま戦闘力の見出しに来た場合はランクを -1 とする。
//! 編成位置の後にLv行が来た場合は、その時点の編成をランク・戦闘力未確定(-1)で
//! 確定し、直前に読み飛ばした行を次のプレイヤー名として続ける。

use crate::error::{Error, Result};
use crate::headers::HeaderTokens;
use crate::slots::SlotMap;
use crate::types::{CharacterRecord, FormationRecord, ReportRecord, UNSET};
use regex::Regex;
use tracing::{debug, warn};

/// パーサー設定
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// 既知の陣地名（行にこの文字列が含まれていれば陣地名行とみなす）
    pub base_names: Vec<String>,
    /// 見出しトークン
    pub headers: HeaderTokens,
}

/// 読み取り段階
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    BaseName,
    PartyCount,
    Formation,
}

/// 1編成分の読み取り途中の値
#[derive(Debug, Default)]
struct FormationBuilder {
    player_name: Option<String>,
    characters: Vec<CharacterRecord>,
    position: Option<i32>,
    rank: Option<i32>,
}

impl FormationBuilder {
    fn finish(self, combat_power: i64) -> FormationRecord {
        FormationRecord {
            player_name: self.player_name.unwrap_or_default(),
            characters: self.characters,
            formation_position: self.position.unwrap_or(UNSET),
            rank: self.rank.unwrap_or(UNSET),
            combat_power,
        }
    }
}

/// 戦況OCRテキストパーサー
#[derive(Debug, Clone)]
pub struct FormationParser {
    options: ParserOptions,
}

impl FormationParser {
    pub fn new(options: ParserOptions) -> Result<Self> {
        if options.base_names.iter().all(|name| name.trim().is_empty()) {
            return Err(Error::Config("陣地名リストが空です".into()));
        }
        options.headers.validate()?;
        Ok(Self { options })
    }

    /// OCRテキストをパースする
    ///
    /// # Arguments
    /// * `text` - OCRテキスト（改行はCRLF/LF/CRのいずれでもよい）
    /// * `slots` - 画像マッチングの結果。`None` ならキャラクター名は空文字になる
    ///
    /// # Returns
    /// * `Ok(ReportRecord)` - 戦闘力まで読めた編成と、次の編成のLv行で打ち切られた編成を含む
    /// * `Err` - Lvの数字列が整数に収まらない場合
    pub fn parse(&self, text: &str, slots: Option<&SlotMap>) -> Result<ReportRecord> {
        let headers = &self.options.headers;
        let lines: Vec<&str> = split_lines(text).filter(|line| !line.is_empty()).collect();

        let mut report = ReportRecord::default();
        let mut stage = Stage::BaseName;
        let mut current = FormationBuilder::default();
        let mut pending_levels: Vec<String> = Vec::new();
        let mut slot: u32 = 1;
        // ランク・戦闘力待ちで読み飛ばした直近の行（次のプレイヤー名の候補）
        let mut skipped: Option<&str> = None;

        for (index, &line) in lines.iter().enumerate() {
            match stage {
                Stage::BaseName => {
                    // 稀にゴミ記号が混ざるので既知の陣地名を含むかで判定
                    if let Some(name) = self.find_base_name(line) {
                        report.base_name = name.to_string();
                        stage = Stage::PartyCount;
                    } else {
                        debug!(line, "陣地名以外の行をスキップ");
                    }
                    continue;
                }
                Stage::PartyCount => {
                    // 見出しの前後に「防衛中パーティ」等のゴミが入ることがある
                    if line.contains(&headers.party_count) {
                        continue;
                    }
                    match line.trim().parse::<u32>() {
                        Ok(count) => {
                            report.sum_party_num = count.min(i32::MAX as u32) as i32;
                            stage = Stage::Formation;
                        }
                        Err(_) => debug!(line, "合計パーティ数以外の行をスキップ"),
                    }
                    continue;
                }
                Stage::Formation => {}
            }

            // プレイヤー名（空白だけの名前もそのまま採用）
            if current.player_name.is_none() {
                current.player_name = Some(line.to_string());
                continue;
            }

            let is_level_line = line.to_uppercase().contains("LV");

            // 編成位置の後のLv行は次の編成の始まり（ランク・戦闘力は読めなかった）
            if is_level_line && current.position.is_some() {
                let next_player = skipped.take().unwrap_or_default();
                warn!(
                    slot,
                    player = ?current.player_name,
                    next_player,
                    "ランク・戦闘力を読めないまま次の編成に移行"
                );
                push_formation(&mut report, &mut current, i64::from(UNSET), &mut slot);
                current.player_name = Some(next_player.to_string());
            }

            if is_level_line {
                pending_levels.extend(extract_levels(line));
                continue;
            }

            if !pending_levels.is_empty() {
                let names: &[String] = match slots {
                    Some(map) => match map.get(slot) {
                        Some(names) => names,
                        None => {
                            warn!(
                                slot,
                                matched_slots = map.len(),
                                "マッチング済みスロットを超えたため残りの入力を破棄"
                            );
                            break;
                        }
                    },
                    None => &[],
                };

                for (i, token) in pending_levels.drain(..).enumerate() {
                    let level = token
                        .parse::<i32>()
                        .map_err(|source| Error::InvalidLevel {
                            token: token.clone(),
                            source,
                        })?;
                    let name = names.get(i).cloned().unwrap_or_default();
                    current.characters.push(CharacterRecord::new(name, level));
                }
            }

            if current.position.is_none() {
                match parse_non_negative(line) {
                    Some(position) => current.position = Some(position),
                    None => debug!(line, "編成位置以外の行をスキップ"),
                }
                continue;
            }

            if current.rank.is_none() {
                // 編成位置とランクの間にゴミ数値が入ることがある
                let before_header = lines
                    .get(index + 1)
                    .is_some_and(|next| next.contains(&headers.rank));
                if line.contains(&headers.rank) || before_header {
                    continue;
                }
                // 戦闘力の見出しまで来たらランクは読めなかった
                if line.contains(&headers.combat_power) {
                    debug!(slot, "ランクを読めないまま戦闘力へ");
                    current.rank = Some(UNSET);
                    continue;
                }
                match parse_non_negative(line) {
                    Some(rank) => current.rank = Some(rank),
                    None => {
                        debug!(line, "ランク以外の行をスキップ");
                        skipped = Some(line);
                    }
                }
                continue;
            }

            if line.contains(&headers.combat_power) {
                continue;
            }
            let Some(combat_power) = parse_combat_power(line) else {
                debug!(line, "戦闘力以外の行をスキップ");
                skipped = Some(line);
                continue;
            };

            push_formation(&mut report, &mut current, combat_power, &mut slot);
            skipped = None;
        }

        Ok(report)
    }

    fn find_base_name(&self, line: &str) -> Option<&str> {
        self.options
            .base_names
            .iter()
            .filter(|name| !name.is_empty())
            .find(|name| line.contains(name.as_str()))
            .map(|name| name.as_str())
    }
}

fn push_formation(
    report: &mut ReportRecord,
    current: &mut FormationBuilder,
    combat_power: i64,
    slot: &mut u32,
) {
    let formation = std::mem::take(current).finish(combat_power);
    debug!(slot = *slot, player = %formation.player_name, "編成を追加");
    report.formations.push(formation);
    *slot += 1;
}

/// 改行（CRLF/LF/CR）で分割する
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    lazy_static::lazy_static! {
        static ref NEWLINE_RE: Regex = Regex::new(r"\r\n|\n|\r").unwrap();
    }
    NEWLINE_RE.split(text)
}

/// 数字以外を取り除く
pub fn strip_non_digits(text: &str) -> String {
    lazy_static::lazy_static! {
        static ref NON_DIGIT_RE: Regex = Regex::new(r"[^0-9]").unwrap();
    }
    NON_DIGIT_RE.replace_all(text, "").into_owned()
}

/// Lv行を空白で区切り、各トークンの数字部分を取り出す
///
/// `"Lv07 garbage Lv150"` → `["07", "150"]`
pub fn extract_levels(line: &str) -> Vec<String> {
    line.split(' ')
        .map(strip_non_digits)
        .filter(|digits| !digits.is_empty())
        .collect()
}

fn parse_non_negative(line: &str) -> Option<i32> {
    line.trim().parse::<i32>().ok().filter(|value| *value >= 0)
}

/// `"1,234,567"` → 1234567
fn parse_combat_power(line: &str) -> Option<i64> {
    strip_non_digits(line).parse::<i64>().ok()
}
