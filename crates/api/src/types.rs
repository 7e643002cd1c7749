//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向前端 JSON 输出的轻量结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use kdata_core::kdata::entity::{KdataRecord, KdataResult};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ============================================================
//  行情相关 DTO
// ============================================================

/// K 线查询参数
///
/// `date` 与 `start/end` 二选一；日期格式均为 `YYYY-MM-DD`。
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KdataParams {
    /// 单日查询 (仅日线)
    #[param(example = "2017-09-04")]
    pub date: Option<String>,
    /// 区间开始日期 (包含)
    #[param(example = "2017-09-04")]
    pub start: Option<String>,
    /// 区间结束日期 (包含)
    #[param(example = "2017-12-31")]
    pub end: Option<String>,
    /// 复权方式: bfq / qfq / hfq，默认 bfq
    #[param(example = "qfq")]
    pub fuquan: Option<String>,
    /// K 线级别: 1 / 5 / 15 / 30 / 60 / day / week / month，默认 day
    #[param(example = "day")]
    pub level: Option<String>,
    /// 逗号分隔的字段列表，缺省为全部标准列
    #[param(example = "timestamp,open,close,high,low")]
    pub fields: Option<String>,
    /// 分页起点，默认 0；`from + size` 不超过 10000
    pub from: Option<usize>,
    /// 分页大小，默认 10
    pub size: Option<usize>,
}

/// K 线查询结果 DTO
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct KdataResponse {
    /// 区间查询的全部命中数；单日查询为 null
    #[schema(example = 23)]
    pub total: Option<u64>,
    /// 记录列表 (区间查询按时间升序)
    pub records: Vec<KdataRecord>,
}

impl From<Option<KdataResult>> for KdataResponse {
    fn from(result: Option<KdataResult>) -> Self {
        match result {
            Some(KdataResult::Record(record)) => Self {
                total: None,
                records: vec![record],
            },
            Some(KdataResult::Page(page)) => Self {
                total: Some(page.total),
                records: page.records,
            },
            None => Self::default(),
        }
    }
}

// ============================================================
//  通用响应 DTO
// ============================================================

/// 统一 API 响应包装器
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T: Serialize + ToSchema> {
    /// 是否成功
    pub success: bool,
    /// 数据载荷 (成功时)
    pub data: Option<T>,
    /// 错误信息 (失败时)
    pub error: Option<String>,
}

impl<T: Serialize + ToSchema> ApiResponse<T> {
    /// 构建成功响应
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// 构建失败响应 (不含泛型载荷)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}
