//! 照合パイプライン
//!
//! 1枚の画像について「どのコードを使うか」を決め、期待値と突き合わせる。
//! - ロケーションIDは常にファイル名から（1回だけ解析して使い回す）
//! - コードは auto ならデコーダ優先、読めなければファイル名にフォールバック
//! - 判定は完全一致のみ。どちらか欠けたら判定しない

use crate::cli::DetectionMode;
use crate::decoder::{BarcodeDecoder, DecodeOutcome};
use crate::parser::parse_filename;
use crate::types::{BoundingBox, DetectionResult};
use image::RgbImage;

/// 採用したコードの出どころ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSource {
    /// デコーダが画像から読み取った
    Decoder,
    /// ファイル名から抽出した
    Filename,
}

/// 1枚分の解決結果
#[derive(Debug, Clone)]
pub struct Resolution {
    /// ファイル名から抽出したロケーションID
    pub location_id: Option<String>,
    /// 採用したコード
    pub detected_code: Option<String>,
    /// 注釈を描く領域
    pub bbox: BoundingBox,
    pub source: CodeSource,
}

pub fn resolve(
    image: &RgbImage,
    file_name: &str,
    mode: DetectionMode,
    decoder: &dyn BarcodeDecoder,
) -> Resolution {
    let parts = parse_filename(file_name);

    if mode == DetectionMode::Auto {
        if let DecodeOutcome::Decoded { code, bbox } = decoder.decode(image) {
            return Resolution {
                location_id: parts.location_id,
                detected_code: Some(code),
                bbox,
                source: CodeSource::Decoder,
            };
        }
    }

    // フォールバック: ファイル名のコード + 画像中央の帯
    Resolution {
        location_id: parts.location_id,
        detected_code: parts.code,
        bbox: central_band(image.width(), image.height()),
        source: CodeSource::Filename,
    }
}

/// 検出領域がないときの代替領域（画像中央の横帯、端数は切り捨て）
pub fn central_band(width: u32, height: u32) -> BoundingBox {
    let w = width as f64;
    let h = height as f64;
    BoundingBox::new(
        (w * 0.2) as i32,
        (h * 0.45) as i32,
        (w * 0.8) as i32,
        (h * 0.65) as i32,
    )
}

/// 検出コードと期待値を突き合わせる
///
/// 両方そろっているときだけ Some(Pass / Fail)。どちらか欠けたら None。
/// 比較は完全一致のみで、トリムも大文字小文字の吸収もしない。
pub fn classify(detected: Option<&str>, expected: Option<&str>) -> Option<DetectionResult> {
    match (detected, expected) {
        (Some(d), Some(e)) => {
            if d == e {
                Some(DetectionResult::Pass)
            } else {
                Some(DetectionResult::Fail)
            }
        }
        _ => None,
    }
}
