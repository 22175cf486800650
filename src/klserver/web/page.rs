// 查询页面渲染
use crate::klchange::{ChangeReport, ReportEntry};
use crate::klcommon::AppError;

/// 页面模板，编译期嵌入
const INDEX_TEMPLATE: &str = include_str!("../../../static/index.html");

/// 输入框默认值
pub const DEFAULT_SYMBOL: &str = "BTC";

/// 表头
pub const TABLE_HEADERS: [&str; 4] = ["间隔", "价格 (USDT)", "时间", "涨幅 (%)"];

/// 转义插入HTML的动态文本
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 把输入框回显值和结果区块填入模板
///
/// `content` 必须是已经转义过的HTML
pub fn render_page(symbol_input: &str, content: &str) -> String {
    let (head, tail) = INDEX_TEMPLATE
        .split_once("{{content}}")
        .unwrap_or((INDEX_TEMPLATE, ""));
    let head = head.replace("{{symbol}}", &escape_html(symbol_input));

    let mut page = String::with_capacity(head.len() + content.len() + tail.len());
    page.push_str(&head);
    page.push_str(content);
    page.push_str(tail);
    page
}

/// 渲染涨幅报表：当前价格、单窗口错误提示和结果表格
pub fn render_report(report: &ChangeReport) -> String {
    let mut html = format!(
        "<p><strong>代币名: {}, 价格：{} USDT</strong></p>\n",
        escape_html(&report.symbol),
        escape_html(&report.current_price)
    );

    for entry in report.errors() {
        if let Some(message) = entry.error_message() {
            html.push_str(&format!("<p class=\"notice\">{}</p>\n", escape_html(message)));
        }
    }

    html.push_str("<h5 style='font-weight: bold; color: black;'>涨幅数据:</h5>\n");
    html.push_str("<table>\n<thead><tr>");
    for header in TABLE_HEADERS {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for entry in &report.entries {
        if let ReportEntry::Row(row) = entry {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&row.label),
                escape_html(&row.price),
                escape_html(&row.time),
                escape_html(&row.change)
            ));
        }
    }

    html.push_str("</tbody>\n</table>\n");
    html
}

/// 渲染查询失败提示
pub fn render_error(err: &AppError) -> String {
    format!("<div class=\"error\">{}</div>\n", escape_html(&err.user_message()))
}
