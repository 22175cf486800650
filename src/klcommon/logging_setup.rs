//! 统一日志系统初始化模块
//!
//! 控制台输出 + 可选的按天滚动日志文件

use crate::klcommon::{AppError, LoggingConfig, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// 日志文件名前缀
const LOG_FILE_PREFIX: &str = "kline_change.log";

/// 日志系统Guard，main函数持有直到退出，保证文件日志刷盘
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// 组装过滤器字符串：RUST_LOG 优先，否则使用配置的级别，并压低HTTP栈的噪音
pub fn build_filter_directives(config: &LoggingConfig) -> String {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    format!("{},hyper=warn,reqwest=warn,tower_http=info", log_level)
}

/// 初始化日志系统，只能调用一次
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard> {
    let filter_str = build_filter_directives(config);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_filter(EnvFilter::new(&filter_str));

    let (file_layer, file_guard) = if config.enable_file_log {
        std::fs::create_dir_all(&config.log_dir)?;
        let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer)
            .with_filter(EnvFilter::new(&filter_str));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::ConfigError(format!("初始化日志系统失败: {}", e)))?;

    Ok(LogGuard { _file_guard: file_guard })
}
