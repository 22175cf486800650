// 导出共享模块
pub mod api;
pub mod config;
pub mod error;
pub mod logging_setup;
pub mod models;
pub mod proxy;

// 重新导出常用类型，方便使用
pub use api::{BinanceApi, KlineSource};
pub use config::{AppConfig, ApiConfig, LoggingConfig, ServerConfig};
pub use error::{AppError, Result};
pub use models::{Kline, KlineQuery};
pub use proxy::{ProxyConfig, ProxyType};
