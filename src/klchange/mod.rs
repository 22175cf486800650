// 涨幅查询：报表生成与查询流程
pub mod format;
pub mod query;
pub mod report;

pub use format::{calculate_percentage_change, format_percent, format_price, format_timestamp};
pub use query::{normalize_symbol, query_change, required_limit, QuerySettings};
pub use report::{build_report, ChangeReport, LookbackWindow, ReportEntry, ReportRow, DEFAULT_WINDOWS};
