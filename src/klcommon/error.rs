use thiserror::Error;
use std::net::AddrParseError;

#[derive(Error, Debug)]
pub enum AppError {
    /// 上游拒绝请求（非2xx状态码）
    #[error("HTTP error: {status} - {body}")]
    HttpStatusError { status: u16, body: String },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    /// 其他传输层错误
    #[error("Request error: {0}")]
    RequestError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    /// 返回的K线数量不足，整次查询中止
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParseError(#[from] AddrParseError),

    #[error("Web server error: {0}")]
    WebServerError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::TimeoutError(e.to_string())
        } else if e.is_connect() {
            AppError::ConnectionError(e.to_string())
        } else if let Some(status) = e.status() {
            AppError::HttpStatusError { status: status.as_u16(), body: e.to_string() }
        } else if e.is_decode() {
            AppError::ParseError(e.to_string())
        } else if e.is_request() || e.is_body() || e.is_builder() || e.is_redirect() {
            AppError::RequestError(e.to_string())
        } else {
            AppError::Unknown(e.to_string())
        }
    }
}

impl AppError {
    /// 获取错误类型的简洁摘要
    ///
    /// 返回稳定的错误类别字符串，用于日志字段 `error.summary` 和JSON接口
    pub fn get_error_type_summary(&self) -> &'static str {
        match self {
            // 行情获取
            AppError::HttpStatusError { .. } => "market_data_request_rejected",
            AppError::ConnectionError(_) => "market_data_connection_failed",
            AppError::TimeoutError(_) => "market_data_request_timeout",
            AppError::RequestError(_) => "market_data_transport_failed",

            // 行情解析
            AppError::JsonError(_) => "kline_data_parsing_failed",
            AppError::ParseError(_) => "market_data_format_invalid",

            // 业务校验
            AppError::InsufficientData(_) => "kline_data_insufficient",
            AppError::InvalidInput(_) => "query_input_invalid",

            // 服务自身
            AppError::ConfigError(_) => "service_configuration_invalid",
            AppError::IoError(_) => "file_operation_failed",
            AppError::AddrParseError(_) => "server_address_invalid",
            AppError::WebServerError(_) => "web_server_failed",

            AppError::Unknown(_) => "unknown_error",
        }
    }

    /// 是否属于上游行情获取失败（网络、状态码、响应格式）
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            AppError::HttpStatusError { .. }
                | AppError::ConnectionError(_)
                | AppError::TimeoutError(_)
                | AppError::RequestError(_)
                | AppError::JsonError(_)
                | AppError::ParseError(_)
                | AppError::Unknown(_)
        )
    }

    /// 展示给用户的错误文本
    pub fn user_message(&self) -> String {
        match self {
            AppError::HttpStatusError { status, body } => format!("HTTP 错误: {} {}", status, body),
            AppError::ConnectionError(msg) => format!("连接错误: {}", msg),
            AppError::TimeoutError(msg) => format!("请求超时: {}", msg),
            AppError::RequestError(msg) => format!("请求错误: {}", msg),
            AppError::JsonError(e) => format!("请求错误: 响应解析失败: {}", e),
            AppError::ParseError(msg) => format!("请求错误: {}", msg),
            AppError::InsufficientData(_) => "从币安获取数据失败。".to_string(),
            AppError::InvalidInput(msg) => format!("输入错误: {}", msg),
            AppError::Unknown(msg) => format!("未知错误: {}", msg),
            other => format!("未知错误: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_errors_are_classified() {
        let timeout = AppError::TimeoutError("30s".to_string());
        assert_eq!(timeout.get_error_type_summary(), "market_data_request_timeout");
        assert!(timeout.is_upstream_failure());

        let rejected = AppError::HttpStatusError { status: 400, body: "Invalid symbol.".to_string() };
        assert_eq!(rejected.get_error_type_summary(), "market_data_request_rejected");
        assert!(rejected.is_upstream_failure());
    }

    #[test]
    fn test_business_errors_are_not_upstream() {
        assert!(!AppError::InsufficientData("1440/1441".to_string()).is_upstream_failure());
        assert!(!AppError::InvalidInput("empty".to_string()).is_upstream_failure());
    }

    #[test]
    fn test_user_message_prefixes() {
        assert!(AppError::ConnectionError("refused".to_string()).user_message().starts_with("连接错误: "));
        assert!(AppError::TimeoutError("x".to_string()).user_message().starts_with("请求超时: "));
        assert!(AppError::RequestError("x".to_string()).user_message().starts_with("请求错误: "));
        assert!(AppError::Unknown("x".to_string()).user_message().starts_with("未知错误: "));
        assert_eq!(
            AppError::InsufficientData("1440/1441".to_string()).user_message(),
            "从币安获取数据失败。"
        );
        let http = AppError::HttpStatusError { status: 400, body: "bad".to_string() };
        assert_eq!(http.user_message(), "HTTP 错误: 400 bad");
    }

    #[test]
    fn test_reqwest_builder_error_is_request_error() {
        let e = reqwest::Client::new().get("not a url").build().unwrap_err();
        assert!(e.is_builder());

        let err = AppError::from(e);
        assert!(matches!(err, AppError::RequestError(_)), "实际: {:?}", err);
        assert_eq!(err.get_error_type_summary(), "market_data_transport_failed");
        assert!(err.user_message().starts_with("请求错误: "));
    }

    #[test]
    fn test_unknown_error_is_upstream() {
        let err = AppError::Unknown("unexpected".to_string());
        assert_eq!(err.get_error_type_summary(), "unknown_error");
        assert!(err.is_upstream_failure());
        assert_eq!(err.user_message(), "未知错误: unexpected");
    }

    #[test]
    fn test_parse_failures_shown_as_request_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let err = AppError::from(json_err);
        assert_eq!(err.get_error_type_summary(), "kline_data_parsing_failed");
        assert!(err.user_message().starts_with("请求错误: 响应解析失败: "));

        let err = AppError::ParseError("第 3 条K线格式异常".to_string());
        assert_eq!(err.user_message(), "请求错误: 第 3 条K线格式异常");
    }
}
