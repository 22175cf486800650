use crate::klcommon::{AppError, ApiConfig, Kline, KlineQuery, ProxyConfig, Result};
use async_trait::async_trait;
use tracing::{debug, error, info, instrument};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// 支持的K线周期（均可换算为整数分钟）
pub const SUPPORTED_INTERVALS: &[&str] = &[
    "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d",
];

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// 将时间间隔转换为分钟数
/// 例如: "1m" -> 1, "1h" -> 60, "1d" -> 1440
pub fn interval_to_minutes(interval: &str) -> Result<i64> {
    if !SUPPORTED_INTERVALS.contains(&interval) {
        return Err(AppError::ConfigError(format!(
            "不支持的K线周期: {}，可选: {}",
            interval,
            SUPPORTED_INTERVALS.join(", ")
        )));
    }

    // 白名单保证至少两个ASCII字符
    let (value, unit) = interval.split_at(interval.len() - 1);
    let value: i64 = value
        .parse()
        .map_err(|_| AppError::ConfigError(format!("无效的K线周期: {}", interval)))?;

    Ok(match unit {
        "m" => value,
        "h" => value * 60,
        _ => value * 24 * 60,
    })
}

/// K线数据源
///
/// 报表逻辑只依赖这个接口，测试时可替换为内存实现
#[async_trait]
pub trait KlineSource: Send + Sync {
    /// 拉取最近 `limit` 根K线，按时间从旧到新排列
    async fn fetch_klines(&self, query: &KlineQuery) -> Result<Vec<Kline>>;
}

/// 币安错误响应体，例如 `{"code":-1121,"msg":"Invalid symbol."}`
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

/// 币安API客户端
#[derive(Clone, Debug)]
pub struct BinanceApi {
    api_url: String,
    timeout: Duration,
    connect_timeout: Duration,
    proxy: ProxyConfig,
}

impl Default for BinanceApi {
    fn default() -> Self {
        Self::new()
    }
}

impl BinanceApi {
    /// 创建新的API客户端实例
    pub fn new() -> Self {
        Self::from_config(&ApiConfig::default())
    }

    /// 创建新的API客户端实例（带自定义URL）
    pub fn new_with_url(api_url: String) -> Self {
        let config = ApiConfig {
            base_url: api_url,
            ..ApiConfig::default()
        };
        Self::from_config(&config)
    }

    /// 根据配置创建API客户端
    pub fn from_config(config: &ApiConfig) -> Self {
        let api_url = config.base_url.trim_end_matches('/').to_string();
        info!(target: "api", "初始化币安API客户端，端点: {}", api_url);
        Self {
            api_url,
            timeout: Duration::from_secs(config.timeout_secs),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            proxy: config.proxy.clone(),
        }
    }

    /// 覆盖超时设置
    pub fn with_timeouts(mut self, timeout: Duration, connect_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// 创建一个新的HTTP客户端实例（每次查询独立创建）
    fn create_client(&self) -> Result<Client> {
        let mut client_builder = Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout);

        // 未启用代理时直连，不读取系统代理环境变量
        client_builder = match self.proxy.to_reqwest_proxy()? {
            Some(proxy) => {
                debug!(target: "api", "使用代理创建HTTP客户端: {}", self.proxy.proxy_url);
                client_builder.proxy(proxy)
            }
            None => client_builder.no_proxy(),
        };

        client_builder
            .build()
            .map_err(|e| AppError::RequestError(format!("创建HTTP客户端失败: {}", e)))
    }

    /// 获取最近的K线数据
    #[instrument(skip(self, query), fields(symbol = %query.symbol, interval = %query.interval, limit = query.limit), err)]
    pub async fn get_klines(&self, query: &KlineQuery) -> Result<Vec<Kline>> {
        let fapi_url = format!("{}/fapi/v1/klines", self.api_url);
        let client = self.create_client()?;

        let limit = query.limit.to_string();
        let request = client
            .get(&fapi_url)
            .query(&[
                ("symbol", query.symbol.as_str()),
                ("interval", query.interval.as_str()),
                ("limit", limit.as_str()),
            ])
            .header("User-Agent", USER_AGENT);

        let response = match request.send().await {
            Ok(resp) => {
                debug!(target: "api", status = %resp.status(), "HTTP请求完成");
                resp
            }
            Err(e) => {
                let http_error = AppError::from(e);
                error!(
                    target: "api",
                    symbol = %query.symbol,
                    url = %fapi_url,
                    error.summary = http_error.get_error_type_summary(),
                    error.details = %http_error,
                    "K线请求失败"
                );
                return Err(http_error);
            }
        };

        let status = response.status();
        let response_text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                let body_error = AppError::from(e);
                error!(
                    target: "api",
                    symbol = %query.symbol,
                    status = %status,
                    error.summary = body_error.get_error_type_summary(),
                    error.details = %body_error,
                    "读取K线响应失败"
                );
                return Err(body_error);
            }
        };

        if !status.is_success() {
            let body = match serde_json::from_str::<ApiErrorBody>(&response_text) {
                Ok(api_body) => format!("{} (code {})", api_body.msg, api_body.code),
                Err(_) => response_text.clone(),
            };
            let api_error = AppError::HttpStatusError { status: status.as_u16(), body };
            error!(
                target: "api",
                symbol = %query.symbol,
                status = %status,
                error.summary = api_error.get_error_type_summary(),
                error.details = %api_error,
                "API响应状态错误"
            );
            return Err(api_error);
        }

        let raw_klines: Vec<Vec<Value>> = match serde_json::from_str(&response_text) {
            Ok(data) => data,
            Err(e) => {
                let preview: String = response_text.chars().take(200).collect();
                error!(target: "api", symbol = %query.symbol, "解析K线JSON失败: {}, 响应前200个字符: {}", e, preview);
                return Err(AppError::JsonError(e));
            }
        };

        let mut klines = Vec::with_capacity(raw_klines.len());
        for (index, raw) in raw_klines.iter().enumerate() {
            match Kline::from_raw_kline(raw) {
                Some(kline) => klines.push(kline),
                None => {
                    error!(target: "api", symbol = %query.symbol, index, "K线数据格式异常");
                    return Err(AppError::ParseError(format!(
                        "第 {} 条K线格式异常: {}",
                        index,
                        Value::Array(raw.clone())
                    )));
                }
            }
        }

        debug!(target: "api", kline_count = klines.len(), "K线数据解析完成");
        Ok(klines)
    }
}

#[async_trait]
impl KlineSource for BinanceApi {
    async fn fetch_klines(&self, query: &KlineQuery) -> Result<Vec<Kline>> {
        self.get_klines(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_to_minutes() {
        assert_eq!(interval_to_minutes("1m").unwrap(), 1);
        assert_eq!(interval_to_minutes("15m").unwrap(), 15);
        assert_eq!(interval_to_minutes("4h").unwrap(), 240);
        assert_eq!(interval_to_minutes("12h").unwrap(), 720);
        assert_eq!(interval_to_minutes("1d").unwrap(), 1440);
    }

    #[test]
    fn test_interval_rejects_unsupported_codes() {
        for interval in ["", "m", "0m", "1w", "1M", "abc"] {
            assert!(interval_to_minutes(interval).is_err(), "{} 应被拒绝", interval);
        }
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let api = BinanceApi::new_with_url("http://127.0.0.1:9/".to_string());
        assert_eq!(api.api_url(), "http://127.0.0.1:9");
    }
}
