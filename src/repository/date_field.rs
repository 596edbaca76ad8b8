// ==========================================
// 教务系统 - 日期字段编解码
// ==========================================
// 库内日期统一存为 ISO 文本 (YYYY-MM-DD)
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// 解析可空日期字段：空串 → None，格式错误 → FieldValueError
pub fn parse_optional_date(field: &str, raw: Option<&str>) -> RepositoryResult<Option<NaiveDate>> {
    let value = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(v) => v,
    };

    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT)
        .map(Some)
        .map_err(|e| RepositoryError::FieldValueError {
            field: field.to_string(),
            message: format!("无法解析日期 '{}': {}", value, e),
        })
}

/// 解析必填日期字段
pub fn parse_required_date(field: &str, raw: &str) -> RepositoryResult<NaiveDate> {
    parse_optional_date(field, Some(raw))?.ok_or_else(|| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: "日期为空".to_string(),
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(parse_optional_date("d", Some("  ")).unwrap(), None);
        assert_eq!(parse_optional_date("d", None).unwrap(), None);
        assert_eq!(
            parse_optional_date("d", Some("2025-09-01")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 1)
        );
        assert!(matches!(
            parse_optional_date("d", Some("01.09.2025")),
            Err(RepositoryError::FieldValueError { .. })
        ));
    }

    #[test]
    fn test_parse_required_date_rejects_empty() {
        assert!(parse_required_date("start_date", "").is_err());
    }
}
