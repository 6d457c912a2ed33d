//! 照合結果の型定義
//!
//! パイプライン全体で共有される型:
//! - BoundingBox: バーコード検出領域（ピクセル座標）
//! - DetectionResult: 照合結果（PASS / FAIL / UNKNOWN）

use std::fmt;

use serde::{Deserialize, Serialize};

/// 検出領域。左上 (x1, y1) と右下 (x2, y2) のピクセル座標
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> u32 {
        (self.x2 - self.x1).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y2 - self.y1).max(0) as u32
    }
}

/// 照合結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DetectionResult {
    /// 検出コードと期待値が完全一致
    Pass,
    /// 両方揃っているが不一致
    Fail,
    /// どちらかが欠けていて比較できない
    Unknown,
}

impl DetectionResult {
    pub fn is_fail(&self) -> bool {
        matches!(self, DetectionResult::Fail)
    }
}

impl fmt::Display for DetectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DetectionResult::Pass => "PASS",
            DetectionResult::Fail => "FAIL",
            DetectionResult::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}
