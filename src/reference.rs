//! 期待値リファレンス
//!
//! location_id → expected_barcode の対応表をCSVから読み込む。
//! 列はヘッダー名で解決するため、並び順は自由。余分な列は無視する。
//! 期待値は原文のまま保持する（トリムしない。空欄も「空文字列あり」として残す）。

use crate::error::{BarcodeCheckError, Result};
use std::collections::HashMap;
use std::path::Path;

const LOCATION_COLUMN: &str = "location_id";
const BARCODE_COLUMN: &str = "expected_barcode";

/// 期待値の対応表
#[derive(Debug, Clone, Default)]
pub struct ExpectedReference {
    entries: HashMap<String, String>,
}

impl ExpectedReference {
    /// CSVファイルから読み込み
    pub fn from_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BarcodeCheckError::ReferenceNotFound(
                path.display().to_string(),
            ));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_csv_str(&content)
    }

    /// CSV文字列から読み込み
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut lines = content.lines();
        let header = lines
            .next()
            .ok_or_else(|| BarcodeCheckError::MalformedReference("CSVが空です".into()))?;

        let columns = parse_csv_line(header);
        let location_idx = find_column(&columns, LOCATION_COLUMN)?;
        let barcode_idx = find_column(&columns, BARCODE_COLUMN)?;

        let mut entries = HashMap::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let fields = parse_csv_line(line);
            // 列数が足りない行はスキップ
            let location = match fields.get(location_idx) {
                Some(s) => s.trim(),
                None => continue,
            };
            let barcode = match fields.get(barcode_idx) {
                Some(s) => *s,
                None => continue,
            };
            // キーはトリム、値は原文のまま。重複ロケーションは後勝ち
            entries.insert(location.to_string(), barcode.to_string());
        }

        Ok(Self { entries })
    }

    /// ロケーションIDに対応する期待値を取得
    pub fn get(&self, location_id: &str) -> Option<&str> {
        self.entries.get(location_id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn find_column(columns: &[&str], name: &str) -> Result<usize> {
    columns.iter().position(|c| c.trim() == name).ok_or_else(|| {
        BarcodeCheckError::MalformedReference(format!("必須列がありません: {}", name))
    })
}

/// CSV行をパース（ダブルクォート対応）
fn parse_csv_line(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut field_start = 0;

    for (i, c) in line.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == ',' && !in_quotes {
            fields.push(trim_quotes(&line[field_start..i]));
            field_start = i + c.len_utf8();
        }
    }
    // 最後のフィールド
    fields.push(trim_quotes(&line[field_start..]));

    fields
}

/// フィールド全体を囲むダブルクォートだけ外す。空白はそのまま
fn trim_quotes(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}
