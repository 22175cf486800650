// 币安合约涨幅查询工具主程序
use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use kline_change::klchange::QuerySettings;
use kline_change::klcommon::{logging_setup::init_logging, AppConfig, BinanceApi};
use kline_change::klserver::{start_web_server, AppState};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "kline_change", about = "币安合约涨幅查询工具")]
struct Args {
    /// 配置文件路径，不指定时读取 CONFIG_PATH 或 config/KlineChangeConfig.toml
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = AppConfig::resolve_path(args.config.as_deref());
    let config = AppConfig::load(&config_path)?;
    let _log_guard = init_logging(&config.logging)?;

    info!(target: "main", "启动币安合约涨幅查询工具");
    if Path::new(&config_path).exists() {
        info!(target: "main", "已加载配置文件: {}", config_path);
    } else {
        info!(target: "main", "配置文件 {} 不存在，使用默认配置", config_path);
    }

    let settings = QuerySettings::from_config(&config.api)?;
    info!(
        target: "main",
        interval = %settings.interval,
        limit = settings.required_limit(),
        "查询参数已确定"
    );

    let api = BinanceApi::from_config(&config.api);
    let state = AppState::new(Arc::new(api), settings);

    let addr = config.bind_addr()?;
    info!(target: "main", "请访问 http://{} 进行查询", addr);
    start_web_server(addr, state).await?;

    Ok(())
}
