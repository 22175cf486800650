//! 单次涨幅查询流程：规范化输入 -> 拉取K线 -> 校验数量 -> 生成报表

use tracing::{error, info, instrument};

use crate::klcommon::{api::interval_to_minutes, config::constants::MAX_KLINE_LIMIT};
use crate::klcommon::{ApiConfig, AppError, KlineQuery, KlineSource, Result};
use super::report::{build_report, ChangeReport, LookbackWindow, DEFAULT_WINDOWS};

/// 报价资产后缀
pub const QUOTE_ASSET: &str = "USDT";

/// 查询参数，启动时确定，之后只读
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySettings {
    pub interval: String,
    pub interval_minutes: i64,
    pub windows: Vec<LookbackWindow>,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            interval: "1m".to_string(),
            interval_minutes: 1,
            windows: DEFAULT_WINDOWS.to_vec(),
        }
    }
}

impl QuerySettings {
    /// 按K线周期和回看窗口构建，所需K线根数不能超过单次请求上限
    pub fn new(interval: &str, windows: Vec<LookbackWindow>) -> Result<Self> {
        let settings = Self {
            interval: interval.to_string(),
            interval_minutes: interval_to_minutes(interval)?,
            windows,
        };
        let limit = settings.required_limit();
        if limit > MAX_KLINE_LIMIT {
            return Err(AppError::ConfigError(format!(
                "K线周期 {} 下需要 {} 根K线，超过单次请求上限 {}",
                interval, limit, MAX_KLINE_LIMIT
            )));
        }
        Ok(settings)
    }

    /// 按指定K线周期和默认回看窗口构建
    pub fn with_interval(interval: &str) -> Result<Self> {
        Self::new(interval, DEFAULT_WINDOWS.to_vec())
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::with_interval(&config.interval)
    }

    /// 单次请求需要的K线根数
    pub fn required_limit(&self) -> usize {
        required_limit(&self.windows, self.interval_minutes)
    }
}

/// 最大窗口偏移 + 1（当前K线本身）
///
/// 与周期不对齐的窗口不参与计算
pub fn required_limit(windows: &[LookbackWindow], interval_minutes: i64) -> usize {
    windows
        .iter()
        .filter_map(|w| w.candle_offset(interval_minutes))
        .max()
        .unwrap_or(0)
        + 1
}

/// 规范化用户输入的代币符号：去空白、转大写并追加USDT
///
/// "btc" -> "BTCUSDT"
pub fn normalize_symbol(input: &str) -> Result<String> {
    let symbol = input.trim();
    if symbol.is_empty() {
        return Err(AppError::InvalidInput("请输入代币符号（如BTC、ETH）".to_string()));
    }
    // 币安存在中文名合约（如 币安人生USDT），按Unicode字母数字判断
    if !symbol.chars().all(char::is_alphanumeric) {
        return Err(AppError::InvalidInput(format!("代币符号只能包含字母和数字: {}", symbol)));
    }
    Ok(format!("{}{}", symbol.to_uppercase(), QUOTE_ASSET))
}

/// 执行一次涨幅查询
#[instrument(skip(source, settings), fields(interval = %settings.interval), err)]
pub async fn query_change(
    source: &dyn KlineSource,
    settings: &QuerySettings,
    raw_symbol: &str,
) -> Result<ChangeReport> {
    let symbol = normalize_symbol(raw_symbol)?;
    let limit = settings.required_limit();

    let query = KlineQuery {
        symbol: symbol.clone(),
        interval: settings.interval.clone(),
        limit,
    };

    let klines = source.fetch_klines(&query).await?;

    if klines.len() < limit {
        error!(
            target: "query",
            symbol = %symbol,
            received = klines.len(),
            required = limit,
            "返回的K线数量不足"
        );
        return Err(AppError::InsufficientData(format!(
            "{} 只返回了 {}/{} 根K线",
            symbol,
            klines.len(),
            limit
        )));
    }

    let report = build_report(&symbol, &klines, settings.interval_minutes, &settings.windows)?;
    info!(
        target: "query",
        symbol = %symbol,
        current_price = %report.current_price,
        rows = report.rows().count(),
        "涨幅查询完成"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("BTC").unwrap(), "BTCUSDT");
        assert_eq!(normalize_symbol("  eth ").unwrap(), "ETHUSDT");
        assert_eq!(normalize_symbol("1000pepe").unwrap(), "1000PEPEUSDT");
    }

    #[test]
    fn test_normalize_symbol_accepts_cjk_symbol() {
        assert_eq!(normalize_symbol("币安人生").unwrap(), "币安人生USDT");
        assert_eq!(normalize_symbol(" 币安人生 ").unwrap(), "币安人生USDT");
    }

    #[test]
    fn test_normalize_symbol_rejects_bad_input() {
        assert!(matches!(normalize_symbol(""), Err(AppError::InvalidInput(_))));
        assert!(matches!(normalize_symbol("   "), Err(AppError::InvalidInput(_))));
        assert!(matches!(normalize_symbol("BTC/USDT"), Err(AppError::InvalidInput(_))));
        assert!(matches!(normalize_symbol("<script>"), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_required_limit_for_default_windows() {
        assert_eq!(QuerySettings::default().required_limit(), 1441);
        assert_eq!(required_limit(&DEFAULT_WINDOWS, 60), 25);
    }

    #[test]
    fn test_settings_with_interval() {
        let settings = QuerySettings::with_interval("1m").unwrap();
        assert_eq!(settings, QuerySettings::default());

        let hourly = QuerySettings::with_interval("1h").unwrap();
        assert_eq!(hourly.interval_minutes, 60);
        assert_eq!(hourly.required_limit(), 25);

        assert!(QuerySettings::with_interval("2x").is_err());
    }

    #[test]
    fn test_settings_reject_limit_over_upstream_cap() {
        // 2天窗口在1分钟K线下需要2881根，超过1500
        let windows = vec![
            LookbackWindow { label: "1分钟", minutes: 1 },
            LookbackWindow { label: "2天", minutes: 2880 },
        ];
        match QuerySettings::new("1m", windows.clone()) {
            Err(AppError::ConfigError(msg)) => assert!(msg.contains("2881")),
            other => panic!("期望配置错误，实际: {:?}", other),
        }

        // 换成1小时K线只需49根
        assert_eq!(QuerySettings::new("1h", windows).unwrap().required_limit(), 49);
    }
}
