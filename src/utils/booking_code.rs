use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;

pub const BOOKING_CODE_PREFIX: &str = "BCW";

static BOOKING_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^BCW\d{10}$").expect("valid booking code regex"));

/// 由创建时间生成预约编号: BCW + YYMMDDHHmm
///
/// 同一分钟内创建的预约会得到相同编号, 按编号查询时返回最新的一条。
pub fn generate_booking_code<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{BOOKING_CODE_PREFIX}{}", at.format("%y%m%d%H%M"))
}

/// 使用配置的本地时区生成当前时刻的预约编号
pub fn booking_code_now(utc_offset_hours: i32) -> String {
    let offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix());
    generate_booking_code(&Utc::now().with_timezone(&offset))
}

pub fn is_booking_code(code: &str) -> bool {
    BOOKING_CODE_RE.is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_booking_code() {
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        let at = wib.with_ymd_and_hms(2026, 3, 9, 8, 5, 59).unwrap();
        assert_eq!(generate_booking_code(&at), "BCW2603090805");
    }

    #[test]
    fn test_code_uses_local_clock() {
        // 2026-12-31 20:30 UTC 在 WIB 已经是 2027-01-01 03:30
        let utc = Utc.with_ymd_and_hms(2026, 12, 31, 20, 30, 0).unwrap();
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        assert_eq!(
            generate_booking_code(&utc.with_timezone(&wib)),
            "BCW2701010330"
        );
    }

    #[test]
    fn test_booking_code_now_matches_format() {
        let code = booking_code_now(7);
        assert!(is_booking_code(&code), "{code}");
        assert!(!is_booking_code("BCW123"));
        assert!(!is_booking_code("XYZ2603090805"));
    }
}
