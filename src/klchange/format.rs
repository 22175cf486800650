//! 涨幅报表的数值与时间格式化

use chrono::{Local, TimeZone};

/// 计算涨跌幅百分比
///
/// 历史价格为0时返回0，不产生无穷大或NaN
pub fn calculate_percentage_change(current_price: f64, historical_price: f64) -> f64 {
    if historical_price == 0.0 {
        return 0.0;
    }
    (current_price - historical_price) / historical_price * 100.0
}

/// 去掉价格字符串小数部分末尾的0，以及随之悬空的小数点
///
/// "65000.500" -> "65000.5"，"65000.000" -> "65000"，不含小数点的原样返回
pub fn format_price(price: &str) -> String {
    if price.contains('.') {
        price.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        price.to_string()
    }
}

/// 涨跌幅保留两位小数并加百分号
pub fn format_percent(change: f64) -> String {
    format!("{:.2}%", change)
}

/// 毫秒时间戳转为本地时间 `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(timestamp_ms: i64) -> String {
    format_timestamp_in(timestamp_ms, &Local)
}

/// 毫秒时间戳按指定时区格式化，超出范围时返回原始数字
pub fn format_timestamp_in<Tz>(timestamp_ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_millis_opt(timestamp_ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => timestamp_ms.to_string(),
    }
}
