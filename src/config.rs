use crate::error::{FormationOcrError, Result};
use crate::matcher::BandLayout;
use crate::ocr::OcrSettings;
use formation_ocr_common::HeaderTokens;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// テンプレートマッチの採用閾値（0～1）
    pub match_threshold: f32,
    /// 二値化の輝度閾値
    pub binarize_threshold: u8,
    /// 既知の陣地名
    pub base_names: Vec<String>,
    pub headers: HeaderTokens,
    pub band_layout: BandLayout,
    /// キャラクターアイコン画像フォルダ
    pub catalog_dir: Option<PathBuf>,
    /// 帯画像・確認用画像の出力先
    pub work_dir: Option<PathBuf>,
    pub character_matching: bool,
    pub level_correction: bool,
    pub annotate_matches: bool,
    pub ocr: OcrSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            match_threshold: 0.8,
            binarize_threshold: 128,
            base_names: Vec::new(),
            headers: HeaderTokens::default(),
            band_layout: BandLayout::default(),
            catalog_dir: None,
            work_dir: None,
            character_matching: true,
            level_correction: true,
            annotate_matches: false,
            ocr: OcrSettings::default(),
        }
    }
}

impl Config {
    /// 設定ファイルを読み込む（ファイルがなければ既定値）
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FormationOcrError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("formation-ocr").join("config.json"))
    }

    /// 帯画像の出力先（未設定ならテンポラリ配下）
    pub fn resolved_work_dir(&self) -> PathBuf {
        self.work_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("formation-ocr"))
    }

    pub fn set_match_threshold(&mut self, threshold: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(FormationOcrError::Config(format!(
                "マッチング閾値は0～1で指定してください: {}",
                threshold
            )));
        }
        self.match_threshold = threshold;
        Ok(())
    }

    /// 陣地名を追加する（重複は無視）
    pub fn add_base_name(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.base_names.iter().any(|n| n == name) {
            return false;
        }
        self.base_names.push(name.to_string());
        true
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(FormationOcrError::Config(format!(
                "match_threshold が範囲外です: {}",
                self.match_threshold
            )));
        }
        self.headers
            .validate()
            .map_err(|e| FormationOcrError::Config(e.to_string()))?;
        self.band_layout.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.match_threshold, 0.8);
        assert_eq!(config.binarize_threshold, 128);
        assert!(config.character_matching);
        assert!(config.level_correction);
        assert!(!config.annotate_matches);
        assert_eq!(config.band_layout.count, 4);
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert!(config.base_names.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.set_match_threshold(0.75).unwrap();
        assert!(config.add_base_name("王都"));
        assert!(!config.add_base_name("王都"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.match_threshold, 0.75);
        assert_eq!(loaded.base_names, vec!["王都".to_string()]);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"base_names": ["GuildBaseAlpha"]}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_names, vec!["GuildBaseAlpha".to_string()]);
        assert_eq!(config.match_threshold, 0.8);
        assert_eq!(config.headers, HeaderTokens::japanese());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut config = Config::default();
        assert!(config.set_match_threshold(1.5).is_err());

        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"match_threshold": -0.1}"#).unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(FormationOcrError::Config(_))
        ));
    }
}
