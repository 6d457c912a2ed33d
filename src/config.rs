use crate::error::{BarcodeCheckError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// カレントディレクトリで探すデフォルト設定ファイル名
pub const DEFAULT_CONFIG_FILE: &str = "barcode-check.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 入力画像フォルダ
    pub images_dir: PathBuf,
    /// 期待値CSV（location_id, expected_barcode）
    pub expected_csv: PathBuf,
    /// 注釈画像・レポートの出力先
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images_raw"),
            expected_csv: PathBuf::from("expected.csv"),
            output_dir: PathBuf::from("outputs"),
        }
    }
}

impl Config {
    /// 設定を読み込む。
    ///
    /// `--config` でパス指定された場合はそのファイルが必須。
    /// 指定なしの場合はカレントの `barcode-check.json` があれば読み、
    /// なければデフォルト値を使う。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(BarcodeCheckError::Config(format!(
                        "設定ファイルがありません: {}",
                        p.display()
                    )));
                }
                Self::load_file(p)
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// CLIオプションによる上書き（指定されたものだけ反映）
    pub fn apply_overrides(
        &mut self,
        expected: Option<PathBuf>,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
    ) {
        if let Some(p) = expected {
            self.expected_csv = p;
        }
        if let Some(p) = input {
            self.images_dir = p;
        }
        if let Some(p) = output {
            self.output_dir = p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.images_dir, PathBuf::from("images_raw"));
        assert_eq!(config.expected_csv, PathBuf::from("expected.csv"));
        assert_eq!(config.output_dir, PathBuf::from("outputs"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = Config::load(Some(Path::new("/nonexistent/barcode-check.json")));
        assert!(matches!(result, Err(BarcodeCheckError::Config(_))));
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let temp_dir = std::env::temp_dir().join("barcode-check-test-config");
        fs::create_dir_all(&temp_dir).unwrap();
        let path = temp_dir.join("partial.json");

        // 一部のキーだけ書いたファイル: 残りはデフォルト値のまま
        fs::write(&path, r#"{"images_dir": "photos"}"#).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.images_dir, PathBuf::from("photos"));
        assert_eq!(config.expected_csv, PathBuf::from("expected.csv"));
        assert_eq!(config.output_dir, PathBuf::from("outputs"));

        fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Some(PathBuf::from("master.csv")), None, Some(PathBuf::from("out")));
        assert_eq!(config.expected_csv, PathBuf::from("master.csv"));
        assert_eq!(config.images_dir, PathBuf::from("images_raw"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }
}
