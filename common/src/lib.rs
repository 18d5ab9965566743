//! Formation OCR Common Library
//!
//! 戦況スクリーンショットのOCRテキストと画像マッチング結果から
//! 編成情報を組み立てるコアロジック（I/Oなし）

pub mod types;
pub mod error;
pub mod headers;
pub mod slots;
pub mod parser;
pub mod reconcile;

pub use types::{CharacterRecord, FormationRecord, ReportRecord, UNSET};
pub use error::{Error, Result};
pub use headers::HeaderTokens;
pub use slots::{MatchCandidate, SlotMap, quantize_row};
pub use parser::{FormationParser, ParserOptions, extract_levels};
pub use reconcile::{reconcile_levels, most_frequent_level};
