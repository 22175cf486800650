// 集成测试共用的K线构造与内存数据源
#![allow(dead_code)]

use async_trait::async_trait;
use kline_change::klcommon::{AppError, Kline, KlineQuery, KlineSource, Result};
use std::sync::Mutex;

/// 2023-01-01 00:00:00 UTC
pub const BASE_OPEN_TIME: i64 = 1672531200000;

/// 生成连续1分钟K线，收盘价为 10000 + 下标
pub fn make_klines(count: usize) -> Vec<Kline> {
    (0..count)
        .map(|i| {
            let open_time = BASE_OPEN_TIME + i as i64 * 60_000;
            Kline {
                open_time,
                open: format!("{}.00", 10000 + i),
                high: format!("{}.00", 10001 + i),
                low: format!("{}.00", 9999 + i),
                close: format!("{}.00", 10000 + i),
                volume: "1.000".to_string(),
                close_time: open_time + 59_999,
                quote_asset_volume: "10000.0".to_string(),
                number_of_trades: 10,
            }
        })
        .collect()
}

/// 原始JSON数组形式，与币安 /fapi/v1/klines 返回一致
pub fn raw_klines_json(count: usize) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = make_klines(count)
        .into_iter()
        .map(|k| {
            serde_json::json!([
                k.open_time, k.open, k.high, k.low, k.close, k.volume,
                k.close_time, k.quote_asset_volume, k.number_of_trades,
                "0.5", "5000.0", "0"
            ])
        })
        .collect();
    serde_json::Value::Array(rows)
}

/// 内存数据源：返回固定K线或固定错误，并记录收到的请求
pub struct FakeSource {
    klines: Vec<Kline>,
    fail_with: Option<fn() -> AppError>,
    pub queries: Mutex<Vec<KlineQuery>>,
}

impl FakeSource {
    pub fn with_klines(klines: Vec<Kline>) -> Self {
        Self { klines, fail_with: None, queries: Mutex::new(Vec::new()) }
    }

    pub fn failing(fail_with: fn() -> AppError) -> Self {
        Self { klines: Vec::new(), fail_with: Some(fail_with), queries: Mutex::new(Vec::new()) }
    }

    pub fn recorded(&self) -> Vec<KlineQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl KlineSource for FakeSource {
    async fn fetch_klines(&self, query: &KlineQuery) -> Result<Vec<Kline>> {
        self.queries.lock().unwrap().push(query.clone());
        match self.fail_with {
            Some(make_error) => Err(make_error()),
            None => {
                let start = self.klines.len().saturating_sub(query.limit);
                Ok(self.klines[start..].to_vec())
            }
        }
    }
}
