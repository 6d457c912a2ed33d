use crate::error::{BarcodeCheckError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub path: PathBuf,
    pub file_name: String,
}

/// バッチ対象の拡張子（小文字のみ。globと同じ挙動）
const TARGET_EXTENSION: &str = "png";

pub fn scan_images(folder: &Path) -> Result<Vec<ImageEntry>> {
    if !folder.exists() {
        return Err(BarcodeCheckError::FolderNotFound(
            folder.display().to_string(),
        ));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(ext) = path.extension() {
            if ext.to_string_lossy() == TARGET_EXTENSION {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();

                images.push(ImageEntry {
                    path: path.to_path_buf(),
                    file_name,
                });
            }
        }
    }

    // ファイル名でソート（処理順を安定させる）
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}
