//! 涨幅报表生成
//!
//! 以最新一根K线的收盘价为当前价，对每个回看窗口取 `窗口分钟数 / K线周期分钟数`
//! 根之前的K线作为历史参考，计算涨跌幅。

use serde::Serialize;
use tracing::{debug, warn};

use crate::klcommon::{AppError, Kline, Result};
use super::format::{calculate_percentage_change, format_percent, format_price, format_timestamp};

/// 命名回看窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LookbackWindow {
    pub label: &'static str,
    pub minutes: i64,
}

impl LookbackWindow {
    pub const fn new(label: &'static str, minutes: i64) -> Self {
        Self { label, minutes }
    }

    /// 换算成K线根数偏移；窗口不是周期整数倍时返回None
    pub fn candle_offset(&self, interval_minutes: i64) -> Option<usize> {
        if interval_minutes <= 0 || self.minutes <= 0 || self.minutes % interval_minutes != 0 {
            return None;
        }
        usize::try_from(self.minutes / interval_minutes).ok()
    }
}

/// 固定的8个回看窗口，按展示顺序排列
pub const DEFAULT_WINDOWS: [LookbackWindow; 8] = [
    LookbackWindow::new("1分钟", 1),
    LookbackWindow::new("5分钟", 5),
    LookbackWindow::new("10分钟", 10),
    LookbackWindow::new("15分钟", 15),
    LookbackWindow::new("30分钟", 30),
    LookbackWindow::new("1小时", 60),
    LookbackWindow::new("4小时", 240),
    LookbackWindow::new("1天", 1440),
];

/// 报表中的一行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// 间隔
    pub label: String,
    /// 历史价格 (USDT)
    pub price: String,
    /// 历史K线收盘时间
    pub time: String,
    /// 涨幅 (%)
    pub change: String,
    /// 未格式化的涨跌幅，供JSON接口使用
    pub change_percent: f64,
}

/// 报表条目：正常行或单个窗口的错误
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportEntry {
    Row(ReportRow),
    /// K线根数不足以覆盖该窗口
    Insufficient { label: String, message: String },
    /// 窗口不是K线周期的整数倍
    Misaligned { label: String, message: String },
}

impl ReportEntry {
    pub fn label(&self) -> &str {
        match self {
            ReportEntry::Row(row) => &row.label,
            ReportEntry::Insufficient { label, .. } | ReportEntry::Misaligned { label, .. } => label,
        }
    }

    pub fn as_row(&self) -> Option<&ReportRow> {
        match self {
            ReportEntry::Row(row) => Some(row),
            _ => None,
        }
    }

    /// 单窗口错误的提示文本
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ReportEntry::Row(_) => None,
            ReportEntry::Insufficient { message, .. } | ReportEntry::Misaligned { message, .. } => Some(message),
        }
    }
}

/// 一次查询的涨幅报表
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeReport {
    pub symbol: String,
    /// 当前价格（最新K线收盘价，已格式化）
    pub current_price: String,
    /// 最新K线收盘时间
    pub current_time: String,
    pub entries: Vec<ReportEntry>,
}

impl ChangeReport {
    /// 按窗口顺序返回正常行
    pub fn rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.entries.iter().filter_map(ReportEntry::as_row)
    }

    /// 按窗口顺序返回单窗口错误条目
    pub fn errors(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.as_row().is_none())
    }
}

fn parse_close(kline: &Kline) -> Result<f64> {
    kline.close_price().ok_or_else(|| {
        AppError::ParseError(format!("无法解析收盘价: {} (收盘时间 {})", kline.close, kline.close_time))
    })
}

/// 生成涨幅报表
///
/// `candles` 必须按时间从旧到新排列。某个窗口数据不足时只在该窗口记录错误，
/// 其余窗口照常计算。
pub fn build_report(
    symbol: &str,
    candles: &[Kline],
    interval_minutes: i64,
    windows: &[LookbackWindow],
) -> Result<ChangeReport> {
    let current = candles
        .last()
        .ok_or_else(|| AppError::InsufficientData(format!("{} 没有可用的K线数据", symbol)))?;
    let current_price = parse_close(current)?;
    let last_index = candles.len() - 1;

    let mut entries = Vec::with_capacity(windows.len());
    for window in windows {
        let offset = match window.candle_offset(interval_minutes) {
            Some(offset) => offset,
            None => {
                warn!(target: "report", label = window.label, interval_minutes, "回看窗口与K线周期不对齐");
                entries.push(ReportEntry::Misaligned {
                    label: window.label.to_string(),
                    message: format!(
                        "错误: {}无法按{}分钟K线换算，无法计算涨幅。",
                        window.label, interval_minutes
                    ),
                });
                continue;
            }
        };

        if offset >= candles.len() {
            debug!(target: "report", label = window.label, offset, available = candles.len(), "K线数据不足");
            entries.push(ReportEntry::Insufficient {
                label: window.label.to_string(),
                message: format!("错误: 数据不足，无法计算{}的涨幅。", window.label),
            });
            continue;
        }

        let historical = &candles[last_index - offset];
        let historical_price = parse_close(historical)?;
        let change = calculate_percentage_change(current_price, historical_price);

        entries.push(ReportEntry::Row(ReportRow {
            label: window.label.to_string(),
            price: format_price(&historical.close),
            time: format_timestamp(historical.close_time),
            change: format_percent(change),
            change_percent: change,
        }));
    }

    Ok(ChangeReport {
        symbol: symbol.to_string(),
        current_price: format_price(&current.close),
        current_time: format_timestamp(current.close_time),
        entries,
    })
}
