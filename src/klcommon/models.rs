use serde::{Deserialize, Serialize};

/// 表示币安K线/蜡烛图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    /// K线开盘时间
    pub open_time: i64,
    /// 开盘价
    pub open: String,
    /// 最高价
    pub high: String,
    /// 最低价
    pub low: String,
    /// 收盘价
    pub close: String,
    /// 成交量
    pub volume: String,
    /// K线收盘时间
    pub close_time: i64,
    /// 报价资产成交量
    pub quote_asset_volume: String,
    /// 成交笔数
    pub number_of_trades: i64,
}

/// 原始K线数组中至少需要的字段数（到成交笔数为止）
const RAW_KLINE_MIN_FIELDS: usize = 9;

impl Kline {
    /// 从原始K线数据创建K线对象
    ///
    /// 币安返回 `[openTime, open, high, low, close, volume, closeTime, quoteVolume, tradeCount, ...]`，
    /// 多余的尾部字段忽略
    pub fn from_raw_kline(raw: &[serde_json::Value]) -> Option<Self> {
        if raw.len() < RAW_KLINE_MIN_FIELDS {
            return None;
        }

        Some(Self {
            open_time: raw[0].as_i64()?,
            open: raw[1].as_str()?.to_string(),
            high: raw[2].as_str()?.to_string(),
            low: raw[3].as_str()?.to_string(),
            close: raw[4].as_str()?.to_string(),
            volume: raw[5].as_str()?.to_string(),
            close_time: raw[6].as_i64()?,
            quote_asset_volume: raw[7].as_str()?.to_string(),
            number_of_trades: raw[8].as_i64()?,
        })
    }

    /// 收盘价解析为浮点数
    pub fn close_price(&self) -> Option<f64> {
        self.close.trim().parse::<f64>().ok().filter(|p| p.is_finite())
    }
}

/// 一次K线拉取请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlineQuery {
    pub symbol: String,
    pub interval: String,
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_raw_kline_full_row() {
        let raw = json!([
            1672531200000i64, "16500.10", "16510.00", "16490.00", "16505.50", "120.5",
            1672531259999i64, "1988000.12", 3500, "60.1", "990000.00", "0"
        ]);
        let kline = Kline::from_raw_kline(raw.as_array().unwrap()).unwrap();
        assert_eq!(kline.close, "16505.50");
        assert_eq!(kline.close_time, 1672531259999);
        assert_eq!(kline.number_of_trades, 3500);
        assert_eq!(kline.close_price(), Some(16505.5));
    }

    #[test]
    fn test_from_raw_kline_rejects_short_or_mistyped_rows() {
        let short = json!([1672531200000i64, "1", "1", "1", "1", "1", 1672531259999i64, "1"]);
        assert!(Kline::from_raw_kline(short.as_array().unwrap()).is_none());

        let numeric_close = json!([1672531200000i64, "1", "1", "1", 1.5, "1", 1672531259999i64, "1", 1]);
        assert!(Kline::from_raw_kline(numeric_close.as_array().unwrap()).is_none());
    }

    #[test]
    fn test_close_price_rejects_garbage() {
        let raw = json!([0, "1", "1", "1", "abc", "1", 59999, "1", 1]);
        let kline = Kline::from_raw_kline(raw.as_array().unwrap()).unwrap();
        assert_eq!(kline.close_price(), None);
    }
}
