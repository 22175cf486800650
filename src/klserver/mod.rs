// 导出服务器相关模块
pub mod web;

// 重新导出一些常用模块，方便使用
pub use crate::klcommon::{AppConfig, AppError, BinanceApi, Result};
pub use self::web::{start_web_server, AppState};
