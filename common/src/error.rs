//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    /// Lv行から取り出した数字列が整数に収まらない
    #[error("Invalid level `{token}`: {source}")]
    InvalidLevel {
        token: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let error = Error::Config("陣地名リストが空です".to_string());
        let display = format!("{}", error);
        assert_eq!(display, "Config error: 陣地名リストが空です");
    }

    #[test]
    fn test_error_invalid_level_keeps_source() {
        let source = "99999999999".parse::<i32>().unwrap_err();
        let error = Error::InvalidLevel {
            token: "99999999999".to_string(),
            source,
        };
        assert!(format!("{}", error).contains("99999999999"));
        assert!(std::error::Error::source(&error).is_some());
    }
}
