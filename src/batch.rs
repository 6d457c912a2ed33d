//! バッチ照合
//!
//! 入力フォルダの全PNGを順に照合し、注釈画像とレポート（CSV / JSON）、
//! 注釈画像をまとめたZIPを出力する。1枚の失敗でバッチ全体は止めず、
//! そのレコードにエラーとして残す。

use crate::annotator::{self, annotated_file_name};
use crate::checker::{self, CodeSource};
use crate::cli::DetectionMode;
use crate::config::Config;
use crate::decoder::BarcodeDecoder;
use crate::error::{BarcodeCheckError, Result};
use crate::parser::parse_filename;
use crate::reference::ExpectedReference;
use crate::scanner::{self, ImageEntry};
use crate::types::DetectionResult;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// 同梱ZIPのファイル名
pub const ARCHIVE_FILE_NAME: &str = "annotated_results.zip";
pub const REPORT_CSV_FILE_NAME: &str = "report.csv";
pub const REPORT_JSON_FILE_NAME: &str = "report.json";

/// バッチの1枚分のレコード
#[derive(Debug, Clone, Serialize)]
pub struct BatchRecord {
    #[serde(rename = "filename")]
    pub file_name: String,
    pub location_id: Option<String>,
    pub detected_code: Option<String>,
    pub expected_code: Option<String>,
    pub result: DetectionResult,
    pub annotated_path: Option<String>,
    /// 処理に失敗したときだけ入る（レポートJSONのみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// バッチ全体のレポート
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub generated_at: String,
    pub total: usize,
    pub pass_count: usize,
    pub fail_count: usize,
    pub records: Vec<BatchRecord>,
}

/// フォルダ内の全PNGを照合して注釈画像を出力する
pub fn run_batch(
    config: &Config,
    mode: DetectionMode,
    decoder: &dyn BarcodeDecoder,
    reference: &ExpectedReference,
    verbose: bool,
) -> Result<BatchReport> {
    let entries = scanner::scan_images(&config.images_dir)?;
    if entries.is_empty() {
        return Err(BarcodeCheckError::NoImagesFound(
            config.images_dir.display().to_string(),
        ));
    }

    std::fs::create_dir_all(&config.output_dir)?;

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut records = Vec::with_capacity(entries.len());
    for entry in &entries {
        pb.set_message(entry.file_name.clone());
        let record = process_one(entry, mode, decoder, reference, &config.output_dir, verbose);
        records.push(record);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let pass_count = records
        .iter()
        .filter(|r| r.result == DetectionResult::Pass)
        .count();
    let fail_count = records
        .iter()
        .filter(|r| r.result == DetectionResult::Fail)
        .count();

    Ok(BatchReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        total: records.len(),
        pass_count,
        fail_count,
        records,
    })
}

/// 1枚処理。失敗してもバッチを止めないため、エラーはレコードに畳む
fn process_one(
    entry: &ImageEntry,
    mode: DetectionMode,
    decoder: &dyn BarcodeDecoder,
    reference: &ExpectedReference,
    output_dir: &Path,
    verbose: bool,
) -> BatchRecord {
    let image = match image::open(&entry.path) {
        Ok(img) => img.to_rgb8(),
        Err(e) => {
            // 読めない画像: UNKNOWN として記録して続行
            let parts = parse_filename(&entry.file_name);
            let expected = parts
                .location_id
                .as_deref()
                .and_then(|loc| reference.get(loc))
                .map(|s| s.to_string());
            return BatchRecord {
                file_name: entry.file_name.clone(),
                location_id: parts.location_id,
                detected_code: None,
                expected_code: expected,
                result: DetectionResult::Unknown,
                annotated_path: None,
                error: Some(format!("画像読み込みエラー: {}", e)),
            };
        }
    };

    let resolution = checker::resolve(&image, &entry.file_name, mode, decoder);
    let expected = resolution
        .location_id
        .as_deref()
        .and_then(|loc| reference.get(loc))
        .map(|s| s.to_string());

    let result = checker::classify(resolution.detected_code.as_deref(), expected.as_deref())
        .unwrap_or(DetectionResult::Unknown);

    if verbose {
        let source = match resolution.source {
            CodeSource::Decoder => decoder.name(),
            CodeSource::Filename => "filename",
        };
        println!(
            "  {} → {} (コード: {}, 取得元: {})",
            entry.file_name,
            result,
            resolution.detected_code.as_deref().unwrap_or("-"),
            source
        );
    }

    let save_path = output_dir.join(annotated_file_name(&entry.file_name, result));
    match annotator::annotate(&image, resolution.bbox, result, &entry.path, Some(&save_path)) {
        Ok(path) => BatchRecord {
            file_name: entry.file_name.clone(),
            location_id: resolution.location_id,
            detected_code: resolution.detected_code,
            expected_code: expected,
            result,
            annotated_path: Some(path.display().to_string()),
            error: None,
        },
        // 保存に失敗しても判定は保持する
        Err(e) => BatchRecord {
            file_name: entry.file_name.clone(),
            location_id: resolution.location_id,
            detected_code: resolution.detected_code,
            expected_code: expected,
            result,
            annotated_path: None,
            error: Some(e.to_string()),
        },
    }
}

/// レポートをCSVで書き出す
pub fn write_report_csv(report: &BatchReport, path: &Path) -> Result<()> {
    let mut content =
        String::from("filename,location_id,detected_code,expected_code,result,annotated_path\n");
    for record in &report.records {
        let fields = [
            csv_field(&record.file_name),
            csv_field(record.location_id.as_deref().unwrap_or("")),
            csv_field(record.detected_code.as_deref().unwrap_or("")),
            csv_field(record.expected_code.as_deref().unwrap_or("")),
            record.result.to_string(),
            csv_field(record.annotated_path.as_deref().unwrap_or("")),
        ];
        content.push_str(&fields.join(","));
        content.push('\n');
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// CSVフィールドの最小クォート。`,` か `"` を含むときだけ包む
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// レポートをJSONで書き出す
pub fn write_report_json(report: &BatchReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// 出力フォルダ内の注釈PNGを1つのZIPにまとめる。エントリ数を返す
///
/// ZIPはメモリ上で組み立ててから書き出す。エントリ名はフォルダなしの
/// ファイル名のみ（フラット構造）、圧縮はdeflate。
pub fn package_outputs(output_dir: &Path, zip_path: &Path) -> Result<usize> {
    let entries = scanner::scan_images(output_dir)?;

    let cursor = std::io::Cursor::new(Vec::new());
    let mut writer = zip::ZipWriter::new(cursor);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for entry in &entries {
        let data = std::fs::read(&entry.path)?;
        writer
            .start_file(entry.file_name.as_str(), options)
            .map_err(|e| BarcodeCheckError::Archive(e.to_string()))?;
        writer.write_all(&data)?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| BarcodeCheckError::Archive(e.to_string()))?;
    std::fs::write(zip_path, cursor.into_inner())?;

    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> BatchRecord {
        BatchRecord {
            file_name: "A-01-01__111.png".to_string(),
            location_id: Some("A-01-01".to_string()),
            detected_code: Some("111".to_string()),
            expected_code: Some("111".to_string()),
            result: DetectionResult::Pass,
            annotated_path: Some("outputs/A-01-01__111__PASS.png".to_string()),
            error: None,
        }
    }

    #[test]
    fn test_csv_field_plain() {
        assert_eq!(csv_field("abc"), "abc");
        assert_eq!(csv_field(""), "");
    }

    #[test]
    fn test_csv_field_quoted() {
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_write_report_csv() {
        let temp_dir = std::env::temp_dir().join("barcode-check-test-report-csv");
        std::fs::create_dir_all(&temp_dir).unwrap();
        let path = temp_dir.join("report.csv");

        let mut record_fail = sample_record();
        record_fail.file_name = "A-01-02__222.png".to_string();
        record_fail.detected_code = Some("333".to_string());
        record_fail.result = DetectionResult::Fail;

        let report = BatchReport {
            generated_at: "2026-08-25T00:00:00+00:00".to_string(),
            total: 2,
            pass_count: 1,
            fail_count: 1,
            records: vec![sample_record(), record_fail],
        };
        write_report_csv(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "filename,location_id,detected_code,expected_code,result,annotated_path"
        );
        assert!(lines[1].contains("PASS"));
        assert!(lines[2].contains("FAIL"));

        std::fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_write_report_csv_quotes_special_fields() {
        let temp_dir = std::env::temp_dir().join("barcode-check-test-report-quote");
        std::fs::create_dir_all(&temp_dir).unwrap();
        let path = temp_dir.join("report.csv");

        // カンマ入りファイル名はクォートされて1フィールドに収まる
        let mut record = sample_record();
        record.file_name = "A-01-01__111, copy.png".to_string();
        record.annotated_path = None;

        let report = BatchReport {
            generated_at: "2026-08-25T00:00:00+00:00".to_string(),
            total: 1,
            pass_count: 1,
            fail_count: 0,
            records: vec![record],
        };
        write_report_csv(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"A-01-01__111, copy.png\""));
        let data_fields: Vec<&str> = content.lines().nth(1).unwrap().split('"').collect();
        assert_eq!(data_fields[1], "A-01-01__111, copy.png");

        std::fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_record_json_omits_error_when_none() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"filename\":\"A-01-01__111.png\""));
        assert!(json.contains("\"result\":\"PASS\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_record_json_includes_error_when_set() {
        let mut record = sample_record();
        record.error = Some("画像読み込みエラー: dummy".to_string());
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"error\""));
    }
}
