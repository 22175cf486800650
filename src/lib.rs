// 导出模块
pub mod klchange;
pub mod klcommon;
pub mod klserver;

// Re-export error types
pub use klcommon::error::AppError;
