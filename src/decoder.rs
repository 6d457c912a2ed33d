//! バーコードデコーダ
//!
//! 画像からのコード読み取りは外部デコーダに委ねる。
//! `decode` フィーチャ有効時は rqrr によるQRコード読み取り、
//! 無効時は常に「検出なし」を返すスタブになる。
//! どちらでも呼び出し側の分岐は変わらない（検出なし扱い）。

use crate::types::BoundingBox;
use image::RgbImage;

/// デコーダの読み取り結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// 読み取り成功（UTF-8文字列と検出領域）
    Decoded { code: String, bbox: BoundingBox },
    /// 検出なし。デコーダ不在・読み取り失敗もここに畳む
    NotFound,
}

pub trait BarcodeDecoder {
    /// 画像からバーコードを読み取る
    ///
    /// 複数検出時は最長のコードを採用（同長なら先に見つかった方）。
    fn decode(&self, image: &RgbImage) -> DecodeOutcome;

    /// デコーダ名（ログ表示用）
    fn name(&self) -> &'static str;
}

/// デコーダなし。常に「検出なし」
pub struct NullDecoder;

impl BarcodeDecoder for NullDecoder {
    fn decode(&self, _image: &RgbImage) -> DecodeOutcome {
        DecodeOutcome::NotFound
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// rqrr によるQRコードデコーダ
#[cfg(feature = "decode")]
pub struct QrDecoder;

#[cfg(feature = "decode")]
impl BarcodeDecoder for QrDecoder {
    fn decode(&self, image: &RgbImage) -> DecodeOutcome {
        let gray = image::imageops::grayscale(image);
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            gray.width() as usize,
            gray.height() as usize,
            |x, y| gray.get_pixel(x as u32, y as u32).0[0],
        );

        let mut best: Option<(String, BoundingBox)> = None;
        for grid in prepared.detect_grids() {
            // 読めないグリッドは飛ばす（1個の失敗で全体を止めない）
            let content = match grid.decode() {
                Ok((_meta, content)) => content,
                Err(_) => continue,
            };
            let bbox = match bounds_to_bbox(&grid.bounds) {
                Some(bbox) => bbox,
                None => continue,
            };
            if is_longer(&content, best.as_ref().map(|(code, _)| code.as_str())) {
                best = Some((content, bbox));
            }
        }

        match best {
            Some((code, bbox)) => DecodeOutcome::Decoded { code, bbox },
            None => DecodeOutcome::NotFound,
        }
    }

    fn name(&self) -> &'static str {
        "rqrr"
    }
}

/// グリッド四隅から軸平行の検出領域を作る。潰れた領域は None
#[cfg(feature = "decode")]
fn bounds_to_bbox(points: &[rqrr::Point; 4]) -> Option<BoundingBox> {
    let xs: Vec<i32> = points.iter().map(|p| p.x as i32).collect();
    let ys: Vec<i32> = points.iter().map(|p| p.y as i32).collect();
    let x1 = *xs.iter().min()?;
    let x2 = *xs.iter().max()?;
    let y1 = *ys.iter().min()?;
    let y2 = *ys.iter().max()?;
    if x2 <= x1 || y2 <= y1 {
        return None;
    }
    Some(BoundingBox::new(x1, y1, x2, y2))
}

/// 採用済みコードより長いときだけ置き換える（同長は先勝ち）
#[cfg(any(feature = "decode", test))]
fn is_longer(candidate: &str, current: Option<&str>) -> bool {
    match current {
        Some(existing) => candidate.len() > existing.len(),
        None => true,
    }
}

/// ビルド構成に応じたデコーダを返す。起動時に一度だけ選択する
pub fn default_decoder() -> Box<dyn BarcodeDecoder> {
    #[cfg(feature = "decode")]
    {
        Box::new(QrDecoder)
    }
    #[cfg(not(feature = "decode"))]
    {
        Box::new(NullDecoder)
    }
}
