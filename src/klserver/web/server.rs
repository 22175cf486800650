// Web服务器实现
use std::net::SocketAddr;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use crate::klcommon::{AppError, Result};
use tracing::{error, info};

use super::handlers::{self, AppState};

/// 创建路由
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index_handler))
        .route("/query", get(handlers::query_handler))
        .route("/api/change/:symbol", get(handlers::change_api_handler))
        .route("/health", get(handlers::health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 在已绑定的监听器上运行服务，直到出错退出
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let app = build_router(state);

    match axum::serve(listener, app).await {
        Ok(_) => {
            info!(target: "web", "Web服务器已关闭");
            Ok(())
        }
        Err(e) => {
            error!(target: "web", "Web服务器错误: {}", e);
            Err(AppError::WebServerError(format!("Web服务器错误: {}", e)))
        }
    }
}

/// 启动Web服务器
pub async fn start_web_server(addr: SocketAddr, state: AppState) -> Result<()> {
    info!(target: "web", "Web服务器开始绑定到地址: {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::WebServerError(format!("绑定地址失败: {}", e)))?;

    info!(target: "web", "Web服务器启动在 http://{}", addr);
    serve(listener, state).await
}
