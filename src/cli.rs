use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "barcode-check")]
#[command(about = "棚札バーコード照合・不一致検出ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（省略時はカレントの barcode-check.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像1枚を照合して注釈画像を保存
    Check {
        /// 対象画像のパス
        #[arg(required = true)]
        image: PathBuf,

        /// ロケーションIDを直接指定（ファイル名からの抽出より優先）
        #[arg(short, long)]
        location: Option<String>,

        /// ロケーションIDを対話入力（抽出結果を初期値にする）
        #[arg(long)]
        prompt: bool,

        /// コード取得モード (auto/filename-only)
        #[arg(short, long, default_value = "auto")]
        mode: DetectionMode,

        /// 注釈画像の保存先（省略時は出力フォルダ/<元名>__<結果>.png）
        #[arg(long)]
        out: Option<PathBuf>,

        /// 期待値CSVのパス（設定を上書き）
        #[arg(short, long)]
        expected: Option<PathBuf>,

        /// 出力フォルダ（設定を上書き）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// フォルダ内の全PNG画像を一括照合
    Batch {
        /// コード取得モード (auto/filename-only)
        #[arg(short, long, default_value = "auto")]
        mode: DetectionMode,

        /// 入力画像フォルダ（設定を上書き）
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// 出力フォルダ（設定を上書き）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 期待値CSVのパス（設定を上書き）
        #[arg(short, long)]
        expected: Option<PathBuf>,
    },

    /// 設定を表示
    Config {
        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// コード取得モード
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetectionMode {
    /// デコーダ優先。検出できなければファイル名にフォールバック
    #[default]
    Auto,
    /// ファイル名のみ（デコーダを使わない）
    FilenameOnly,
}

impl std::str::FromStr for DetectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" | "a" => Ok(DetectionMode::Auto),
            "filename-only" | "filename" | "f" => Ok(DetectionMode::FilenameOnly),
            _ => Err(format!("Unknown mode: {}. Use auto or filename-only", s)),
        }
    }
}

impl std::fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionMode::Auto => write!(f, "auto"),
            DetectionMode::FilenameOnly => write!(f, "filename-only"),
        }
    }
}
