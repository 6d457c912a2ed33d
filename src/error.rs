use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarcodeCheckError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("期待値CSVが見つかりません: {0}")]
    ReferenceNotFound(String),

    #[error("期待値CSVが不正: {0}")]
    MalformedReference(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像保存エラー: {0}")]
    ImageSave(String),

    #[error("ZIP生成エラー: {0}")]
    Archive(String),

    #[error("対話入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BarcodeCheckError>;
