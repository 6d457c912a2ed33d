//! ファイル名からのコード抽出
//!
//! `A-01-07__4901234567894.png` のような命名規約から
//! ロケーションIDとバーコード値を取り出す。

use regex::Regex;

/// ファイル名から抽出した情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilenameParts {
    /// ロケーションID（例: A-01-07）
    pub location_id: Option<String>,
    /// バーコード値（例: 4901234567894）
    pub code: Option<String>,
}

/// ファイル名を解析する
///
/// 先頭が `<ロケーションID>__<コード>` 形式（ロケーションIDは
/// `英大文字1字-数字2桁-数字2桁`、コードは英数字の連続）のときだけ
/// 両方を返す。形式に合わなければ両方 None。
pub fn parse_filename(file_name: &str) -> FilenameParts {
    lazy_static::lazy_static! {
        static ref NAME_RE: Regex =
            Regex::new(r"^([A-Z]-\d{2}-\d{2})__([0-9A-Za-z]+)").unwrap();
    }

    match NAME_RE.captures(file_name) {
        Some(caps) => FilenameParts {
            location_id: Some(caps[1].to_string()),
            code: Some(caps[2].to_string()),
        },
        None => FilenameParts::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_name() {
        let parts = parse_filename("A-01-07__4901234567894.png");
        assert_eq!(parts.location_id.as_deref(), Some("A-01-07"));
        assert_eq!(parts.code.as_deref(), Some("4901234567894"));
    }

    #[test]
    fn test_parse_alphanumeric_code() {
        let parts = parse_filename("B-12-03__TANA0012345.png");
        assert_eq!(parts.location_id.as_deref(), Some("B-12-03"));
        assert_eq!(parts.code.as_deref(), Some("TANA0012345"));
    }

    #[test]
    fn test_parse_keeps_leading_zero() {
        // コードは文字列のまま扱う。数値化して先頭の0を落とさない
        let parts = parse_filename("A-01-01__012345678905.png");
        assert_eq!(parts.code.as_deref(), Some("012345678905"));
    }

    #[test]
    fn test_parse_code_stops_at_non_alphanumeric() {
        // コードは英数字の連続まで。後続の `__memo` は含めない
        let parts = parse_filename("A-01-07__X99__memo.png");
        assert_eq!(parts.location_id.as_deref(), Some("A-01-07"));
        assert_eq!(parts.code.as_deref(), Some("X99"));
    }

    #[test]
    fn test_parse_rejects_lowercase_location() {
        let parts = parse_filename("a-01-07__4901234567894.png");
        assert_eq!(parts, FilenameParts::default());
    }

    #[test]
    fn test_parse_rejects_wrong_digit_count() {
        assert_eq!(parse_filename("A-1-07__123.png"), FilenameParts::default());
        assert_eq!(parse_filename("A-01-7__123.png"), FilenameParts::default());
        assert_eq!(parse_filename("A-001-07__123.png"), FilenameParts::default());
    }

    #[test]
    fn test_parse_requires_double_underscore() {
        assert_eq!(parse_filename("A-01-07_123.png"), FilenameParts::default());
        assert_eq!(parse_filename("A-01-07-123.png"), FilenameParts::default());
    }

    #[test]
    fn test_parse_anchored_at_start() {
        // 先頭一致のみ。途中に規約形式が現れても拾わない
        assert_eq!(
            parse_filename("copy_A-01-07__123.png"),
            FilenameParts::default()
        );
    }

    #[test]
    fn test_parse_unrelated_name() {
        assert_eq!(parse_filename("IMG_1234.png"), FilenameParts::default());
        assert_eq!(parse_filename(""), FilenameParts::default());
    }
}
