//! Barcode Check
//!
//! 棚札バーコードの照合・不一致検出ツール

pub mod annotator;
pub mod batch;
pub mod checker;
pub mod cli;
pub mod config;
pub mod decoder;
pub mod error;
pub mod parser;
pub mod reference;
pub mod scanner;
pub mod types;

pub use batch::{BatchRecord, BatchReport};
pub use checker::{CodeSource, Resolution};
pub use config::Config;
pub use decoder::{BarcodeDecoder, DecodeOutcome};
pub use error::{BarcodeCheckError, Result};
pub use parser::FilenameParts;
pub use reference::ExpectedReference;
pub use types::{BoundingBox, DetectionResult};
