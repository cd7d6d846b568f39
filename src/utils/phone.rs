use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

/// 印尼手机号: +62 / 62 / 0 开头, 后跟 9-13 位数字
static ID_PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+62|62|0)\d{9,13}$").expect("valid phone regex"));

/// 去掉用户常输入的分隔符 (空格, 横线, 点, 括号)
fn strip_separators(phone: &str) -> String {
    phone
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect()
}

pub fn is_valid_id_phone(phone: &str) -> bool {
    ID_PHONE_RE.is_match(&strip_separators(phone))
}

/// 验证印尼手机号格式
pub fn validate_id_phone(phone: &str) -> AppResult<()> {
    if !is_valid_id_phone(phone) {
        return Err(AppError::ValidationError(
            "Invalid phone number, expected an Indonesian mobile number (+62, 62 or 0 prefix)"
                .to_string(),
        ));
    }
    Ok(())
}

/// 格式化手机号，统一为 +62 开头, 作为客户查找的自然键
pub fn normalize_id_phone(phone: &str) -> String {
    let cleaned = strip_separators(phone);

    if cleaned.starts_with("+62") {
        cleaned
    } else if let Some(rest) = cleaned.strip_prefix("62") {
        format!("+62{rest}")
    } else if let Some(rest) = cleaned.strip_prefix('0') {
        format!("+62{rest}")
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id_phone() {
        assert!(validate_id_phone("+6281234567890").is_ok());
        assert!(validate_id_phone("6281234567890").is_ok());
        assert!(validate_id_phone("081234567890").is_ok());
        assert!(validate_id_phone("0812-3456-7890").is_ok());
        assert!(validate_id_phone("08123456").is_err()); // 太短
        assert!(validate_id_phone("+12345678901").is_err());
        assert!(validate_id_phone("0812345678901234").is_err()); // 太长
        assert!(validate_id_phone("").is_err());
    }

    #[test]
    fn test_normalize_id_phone() {
        assert_eq!(normalize_id_phone("081234567890"), "+6281234567890");
        assert_eq!(normalize_id_phone("6281234567890"), "+6281234567890");
        assert_eq!(normalize_id_phone("+62 812 3456 7890"), "+6281234567890");
        assert_eq!(normalize_id_phone("0812-3456-7890"), "+6281234567890");
    }
}
