use crate::search::error::SearchError;
use thiserror::Error;

/// # Summary
/// K 线查询域错误枚举。
///
/// # Invariants
/// - 上游搜索错误原样包装并向上传播，不做重试。
#[derive(Error, Debug)]
pub enum KdataError {
    // 调用参数非法 (证券代码、字段名、日期等)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    // 不支持的复权方式
    #[error("Unsupported adjustment mode: {0}")]
    UnsupportedFuquan(String),
    // 复权因子缺失、为零或不是有限数
    #[error("Invalid adjustment factor: {0}")]
    InvalidFactor(String),
    // 搜索后端故障
    #[error(transparent)]
    Search(#[from] SearchError),
}
