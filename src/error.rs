use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum FormationOcrError {
    #[error("設定エラー: {0}")]
    Config(String),

    /// 処理開始前の入力チェック
    #[error("入力チェックエラー: {0}")]
    Validation(String),

    #[error("キャラクター画像マッチングに失敗しました: {context}")]
    Matching {
        context: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("MMG形式への変換に失敗しました。")]
    Parsing(#[source] formation_ocr_common::Error),

    #[error("OCR実行エラー: {0}")]
    Ocr(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("ワーカー実行エラー: {0}")]
    Worker(String),
}

impl FormationOcrError {
    /// 原因なしのマッチングエラー
    pub fn matching(context: impl Into<String>) -> Self {
        FormationOcrError::Matching {
            context: context.into(),
            source: None,
        }
    }

    /// 原因付きのマッチングエラー
    pub fn matching_with<E>(context: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        FormationOcrError::Matching {
            context: context.into(),
            source: Some(source.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormationOcrError>;
