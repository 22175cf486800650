//! 查询工具配置模块
//!
//! 配置文件为可选项：文件不存在时使用内置默认值

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use crate::klchange::QuerySettings;
use crate::klcommon::{api::interval_to_minutes, AppError, ProxyConfig, Result};

/// 系统配置常量
pub mod constants {
    /// 默认配置文件路径
    pub const DEFAULT_CONFIG_PATH: &str = "config/KlineChangeConfig.toml";

    /// 默认监听地址
    pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";

    /// 币安U本位合约API端点
    pub const DEFAULT_API_URL: &str = "https://fapi.binance.com";

    /// 默认K线周期
    pub const DEFAULT_INTERVAL: &str = "1m";

    /// 币安klines接口单次最多返回的K线数量
    pub const MAX_KLINE_LIMIT: usize = 1500;
}

use constants::*;

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_interval() -> String {
    DEFAULT_INTERVAL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_enable_file_log() -> bool {
    true
}

/// 查询工具配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Web服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

/// 行情API配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API端点
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// K线周期，回看窗口按此周期换算成K线根数
    #[serde(default = "default_interval")]
    pub interval: String,

    /// 请求总超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// 连接超时（秒）
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(flatten)]
    pub proxy: ProxyConfig,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)，RUST_LOG 优先
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 日志文件目录
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// 是否写入滚动日志文件
    #[serde(default = "default_enable_file_log")]
    pub enable_file_log: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: default_bind_addr() }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            interval: default_interval(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            proxy: ProxyConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            enable_file_log: default_enable_file_log(),
        }
    }
}

impl AppConfig {
    /// 从文件加载配置
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML文本解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::ConfigError(format!("解析配置文件失败: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// 确定配置文件路径
    ///
    /// 优先级：显式参数 > CONFIG_PATH 环境变量 > 默认路径
    pub fn resolve_path(path: Option<&str>) -> String {
        match path {
            Some(p) => p.to_string(),
            None => std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
        }
    }

    /// 加载配置：文件存在则读取，否则使用默认值
    ///
    /// 此时日志尚未初始化，由调用方在初始化后记录使用的配置文件
    pub fn load(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        if self.api.base_url.trim().is_empty() {
            return Err(AppError::ConfigError("API端点不能为空".to_string()));
        }

        interval_to_minutes(&self.api.interval)?;

        if self.api.timeout_secs == 0 || self.api.connect_timeout_secs == 0 {
            return Err(AppError::ConfigError("超时时间必须大于0".to_string()));
        }

        self.api.proxy.validate()?;

        // K线周期决定单次请求根数，超过上游上限时启动即失败
        QuerySettings::from_config(&self.api)?;

        Ok(())
    }

    /// 解析监听地址
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.bind_addr.parse::<SocketAddr>()?)
    }
}
