//! 注釈レンダラ
//!
//! 検出領域の枠と判定バナーを描いてPNG保存する。
//! - 枠: 4px。FAILのみ赤、それ以外は緑
//! - バナー: 枠の左上の真上に 160×36（隙間4px）、白文字で判定ラベル
//! - フォント: システムフォントを探し、なければ内蔵ビットマップで描く

use crate::error::{BarcodeCheckError, Result};
use crate::types::{BoundingBox, DetectionResult};
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

/// PASS / UNKNOWN の枠・バナー色
const COLOR_OK: Rgb<u8> = Rgb([0, 160, 0]);
/// FAIL の枠・バナー色
const COLOR_NG: Rgb<u8> = Rgb([200, 0, 0]);
const COLOR_LABEL: Rgb<u8> = Rgb([255, 255, 255]);

/// 枠線の太さ（px）
const STROKE_WIDTH: i32 = 4;
const BANNER_WIDTH: u32 = 160;
const BANNER_HEIGHT: u32 = 36;
/// バナーと枠の隙間（px）
const BANNER_GAP: i32 = 4;
/// ラベルの文字サイズ
const LABEL_SCALE: f32 = 22.0;

/// 注釈を描いてPNG保存し、保存先パスを返す
///
/// `save_path` 省略時は元画像と同じフォルダに `<元名>__<結果>.png`。
pub fn annotate(
    image: &RgbImage,
    bbox: BoundingBox,
    result: DetectionResult,
    source_path: &Path,
    save_path: Option<&Path>,
) -> Result<PathBuf> {
    let mut canvas = image.clone();
    draw_annotations(&mut canvas, bbox, result);

    let out_path = match save_path {
        Some(p) => p.to_path_buf(),
        None => default_save_path(source_path, result),
    };

    canvas
        .save(&out_path)
        .map_err(|e| BarcodeCheckError::ImageSave(format!("{}: {}", out_path.display(), e)))?;

    Ok(out_path)
}

/// キャンバスに枠とバナーを描く（保存はしない）
pub fn draw_annotations(canvas: &mut RgbImage, bbox: BoundingBox, result: DetectionResult) {
    let color = if result.is_fail() { COLOR_NG } else { COLOR_OK };
    draw_box(canvas, bbox, color);
    draw_banner(canvas, bbox, result, color);
}

/// `<元名>__<結果>.png` 形式のファイル名を作る
pub fn annotated_file_name(source_name: &str, result: DetectionResult) -> String {
    let stem = Path::new(source_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "annotated".to_string());
    format!("{}__{}.png", stem, result)
}

fn default_save_path(source_path: &Path, result: DetectionResult) -> PathBuf {
    let source_name = source_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_name = annotated_file_name(&source_name, result);
    source_path
        .parent()
        .map(|p| p.join(&file_name))
        .unwrap_or_else(|| PathBuf::from(&file_name))
}

/// 内側に向かって4本の矩形を重ねて太枠にする
fn draw_box(canvas: &mut RgbImage, bbox: BoundingBox, color: Rgb<u8>) {
    for offset in 0..STROKE_WIDTH {
        let w = bbox.width() as i32 - offset * 2;
        let h = bbox.height() as i32 - offset * 2;
        // 領域が小さすぎたら描けるところまでで止める
        if w <= 0 || h <= 0 {
            break;
        }
        let rect = Rect::at(bbox.x1 + offset, bbox.y1 + offset).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

fn draw_banner(canvas: &mut RgbImage, bbox: BoundingBox, result: DetectionResult, color: Rgb<u8>) {
    let banner_x = bbox.x1;
    // 枠の上端から隙間分だけ上。画像の外にはみ出した分は描画時に切れる
    let banner_y = bbox.y1 - BANNER_GAP - BANNER_HEIGHT as i32;
    let rect = Rect::at(banner_x, banner_y).of_size(BANNER_WIDTH, BANNER_HEIGHT);
    draw_filled_rect_mut(canvas, rect, color);

    let label = result.to_string();
    match &*SYSTEM_FONT {
        Some(font) => {
            draw_text_mut(
                canvas,
                COLOR_LABEL,
                banner_x + 8,
                banner_y + 2,
                PxScale::from(LABEL_SCALE),
                font,
                &label,
            );
        }
        None => draw_bitmap_label(canvas, banner_x + 8, banner_y + 7, &label),
    }
}

lazy_static::lazy_static! {
    /// 起動後最初の描画時に一度だけ読む
    static ref SYSTEM_FONT: Option<FontVec> = load_system_font();
}

/// システムフォントを探す。見つからなければ None
fn load_system_font() -> Option<FontVec> {
    let candidates = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        r"C:\Windows\Fonts\arial.ttf",
    ];

    for path in candidates {
        if let Ok(data) = std::fs::read(path) {
            if let Ok(font) = FontVec::try_from_vec(data) {
                return Some(font);
            }
        }
    }

    None
}

/// 内蔵5x7ビットマップでラベルを描く（3倍拡大）
fn draw_bitmap_label(canvas: &mut RgbImage, x: i32, y: i32, text: &str) {
    const GLYPH_SCALE: i32 = 3;
    const GLYPH_ADVANCE: i32 = 6; // 5ドット + 字間1ドット

    let mut cursor = x;
    for ch in text.chars() {
        draw_bitmap_glyph(canvas, cursor, y, ch, GLYPH_SCALE);
        cursor += GLYPH_ADVANCE * GLYPH_SCALE;
    }
}

fn draw_bitmap_glyph(canvas: &mut RgbImage, x: i32, y: i32, ch: char, scale: i32) {
    let pattern = glyph_pattern(ch);
    let (width, height) = canvas.dimensions();

    for (row, bits) in pattern.iter().enumerate() {
        for col in 0..5i32 {
            if bits & (1 << (4 - col)) == 0 {
                continue;
            }
            // 1ドットを scale×scale に拡大して打つ
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = x + col * scale + dx;
                    let py = y + row as i32 * scale + dy;
                    if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                        canvas.put_pixel(px as u32, py as u32, COLOR_LABEL);
                    }
                }
            }
        }
    }
}

/// PASS / FAIL / UNKNOWN の描画に必要な文字だけの簡易フォント
fn glyph_pattern(ch: char) -> [u8; 7] {
    match ch {
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        _ => [0; 7],
    }
}
