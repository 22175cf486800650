use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::klchange::{query_change, ChangeReport, QuerySettings};
use crate::klcommon::{AppError, KlineSource};
use super::page::{render_error, render_page, render_report, DEFAULT_SYMBOL};

/// Web层共享状态，只读
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn KlineSource>,
    pub settings: Arc<QuerySettings>,
}

impl AppState {
    pub fn new(source: Arc<dyn KlineSource>, settings: QuerySettings) -> Self {
        Self {
            source,
            settings: Arc::new(settings),
        }
    }
}

/// 查询表单参数
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub symbol: Option<String>,
}

/// JSON接口的错误响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            e if e.is_upstream_failure() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.get_error_type_summary().to_string(),
            message: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// 首页：只有输入框和查询按钮
pub async fn index_handler() -> Html<String> {
    Html(render_page(DEFAULT_SYMBOL, ""))
}

/// 表单查询：结果或错误都渲染在同一页面，页面始终可继续查询
pub async fn query_handler(
    Query(params): Query<QueryParams>,
    State(state): State<AppState>,
) -> Html<String> {
    let input = params.symbol.unwrap_or_default();
    info!(target: "web", symbol = %input, "收到涨幅查询");

    let content = match query_change(state.source.as_ref(), &state.settings, &input).await {
        Ok(report) => render_report(&report),
        Err(e) => {
            warn!(
                target: "web",
                symbol = %input,
                error.summary = e.get_error_type_summary(),
                error.details = %e,
                "涨幅查询失败"
            );
            render_error(&e)
        }
    };

    Html(render_page(&input, &content))
}

/// JSON接口
pub async fn change_api_handler(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ChangeReport>, AppError> {
    info!(target: "web", symbol = %symbol, "收到JSON涨幅查询");
    let report = query_change(state.source.as_ref(), &state.settings, &symbol).await?;
    Ok(Json(report))
}

pub async fn health_handler() -> &'static str {
    "ok"
}
