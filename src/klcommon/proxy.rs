/// 代理配置模块
///
/// 集中管理出站请求的代理设置
use serde::{Deserialize, Serialize};
use crate::klcommon::{AppError, Result};

/// 默认代理地址
pub const DEFAULT_PROXY_URL: &str = "socks5://127.0.0.1:1080";

/// 代理类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyType {
    /// HTTP代理
    Http,
    /// SOCKS5代理
    Socks5,
}

impl ProxyType {
    /// 根据URL协议判断代理类型
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split("://").next()?.to_ascii_lowercase();
        match scheme.as_str() {
            "http" | "https" => Some(ProxyType::Http),
            "socks5" | "socks5h" => Some(ProxyType::Socks5),
            _ => None,
        }
    }
}

fn default_proxy_url() -> String {
    DEFAULT_PROXY_URL.to_string()
}

/// 代理配置结构体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// 是否使用代理
    #[serde(default)]
    pub use_proxy: bool,
    /// 完整的代理URL
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            use_proxy: false,
            proxy_url: default_proxy_url(),
        }
    }
}

impl ProxyConfig {
    /// 创建启用的代理配置
    pub fn enabled(proxy_url: impl Into<String>) -> Self {
        Self {
            use_proxy: true,
            proxy_url: proxy_url.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.use_proxy {
            return Ok(());
        }
        if ProxyType::from_url(&self.proxy_url).is_none() {
            return Err(AppError::ConfigError(format!(
                "不支持的代理地址: {}，只支持 http:// 或 socks5://",
                self.proxy_url
            )));
        }
        Ok(())
    }

    /// 构造reqwest代理，未启用时返回None
    pub fn to_reqwest_proxy(&self) -> Result<Option<reqwest::Proxy>> {
        if !self.use_proxy {
            return Ok(None);
        }
        self.validate()?;
        reqwest::Proxy::all(&self.proxy_url)
            .map(Some)
            .map_err(|e| AppError::ConfigError(format!("创建代理失败: {} - {}", self.proxy_url, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_type_from_url() {
        assert_eq!(ProxyType::from_url("socks5://127.0.0.1:1080"), Some(ProxyType::Socks5));
        assert_eq!(ProxyType::from_url("http://127.0.0.1:7890"), Some(ProxyType::Http));
        assert_eq!(ProxyType::from_url("ftp://127.0.0.1"), None);
    }

    #[test]
    fn test_disabled_proxy_is_skipped() {
        let config = ProxyConfig::default();
        assert!(!config.use_proxy);
        assert!(config.to_reqwest_proxy().unwrap().is_none());
    }

    #[test]
    fn test_invalid_enabled_proxy_fails_validation() {
        let config = ProxyConfig::enabled("ftp://127.0.0.1:21");
        assert!(matches!(config.validate(), Err(AppError::ConfigError(_))));
    }
}
