use chrono::{DateTime, Datelike, TimeDelta, Utc};

/// 站点所在时区（UTC+7），用于展示绝对日期
const SITE_UTC_OFFSET_HOURS: i64 = 7;

/// 将时间格式化为相对当前时间的描述
///
/// - 缺失：`Chưa rõ`
/// - 不足 1 分钟：`Vừa xong`
/// - 不足 1 小时 / 1 天 / 7 天：`{n} phút trước` / `{n} giờ trước` / `{n} ngày trước`
/// - 不足 30 天：`{n} tuần trước`
/// - 其余：越南语长日期，例如 `18 tháng 10, 2026`
///
/// 所有差值向下取整。
pub fn time_ago(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(timestamp) = timestamp else {
        return "Chưa rõ".to_string();
    };

    let minutes = (now - timestamp).num_minutes();
    let hours = minutes / 60;
    let days = hours / 24;

    if minutes < 1 {
        "Vừa xong".to_string()
    } else if minutes < 60 {
        format!("{minutes} phút trước")
    } else if hours < 24 {
        format!("{hours} giờ trước")
    } else if days < 7 {
        format!("{days} ngày trước")
    } else if days < 30 {
        format!("{} tuần trước", days / 7)
    } else {
        long_date(timestamp)
    }
}

fn long_date(timestamp: DateTime<Utc>) -> String {
    let local = timestamp.naive_utc() + TimeDelta::hours(SITE_UTC_OFFSET_HOURS);
    format!("{} tháng {}, {}", local.day(), local.month(), local.year())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn ago(delta: TimeDelta) -> String {
        time_ago(Some(now() - delta), now())
    }

    #[test]
    fn missing_timestamp() {
        assert_eq!(time_ago(None, now()), "Chưa rõ");
    }

    #[test]
    fn relative_thresholds() {
        assert_eq!(ago(TimeDelta::seconds(59)), "Vừa xong");
        assert_eq!(ago(TimeDelta::minutes(1)), "1 phút trước");
        assert_eq!(ago(TimeDelta::minutes(59)), "59 phút trước");
        assert_eq!(ago(TimeDelta::minutes(60)), "1 giờ trước");
        assert_eq!(ago(TimeDelta::minutes(23 * 60 + 59)), "23 giờ trước");
        assert_eq!(ago(TimeDelta::hours(24)), "1 ngày trước");
        assert_eq!(ago(TimeDelta::days(6)), "6 ngày trước");
        assert_eq!(ago(TimeDelta::days(7)), "1 tuần trước");
        assert_eq!(ago(TimeDelta::days(29)), "4 tuần trước");
    }

    #[test]
    fn future_timestamp_is_just_now() {
        assert_eq!(ago(TimeDelta::minutes(-5)), "Vừa xong");
    }

    #[test]
    fn older_than_thirty_days_uses_long_date() {
        assert_eq!(ago(TimeDelta::days(30)), "18 tháng 9, 2026");

        let late_evening = Utc.with_ymd_and_hms(2025, 12, 31, 20, 0, 0).unwrap();
        assert_eq!(time_ago(Some(late_evening), now()), "1 tháng 1, 2026");
    }
}
