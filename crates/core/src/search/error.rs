use thiserror::Error;

/// # Summary
/// 搜索后端错误枚举，处理网络、响应状态及解析失败等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 文档不存在不属于错误，由调用方以 `None` 表达。
#[derive(Error, Debug)]
pub enum SearchError {
    // 网络层错误，包含底层 HTTP 客户端错误信息
    #[error("Network error: {0}")]
    Network(String),
    // 后端返回了非成功状态码
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    // 响应解析错误，如 JSON 格式不匹配
    #[error("Parse error: {0}")]
    Parse(String),
    // 未知或未分类的错误
    #[error("Unknown error: {0}")]
    Unknown(String),
}
