use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use kdata_core::common::Level;
use kdata_core::kdata::entity::{FieldSet, Fuquan};
use kdata_query::service::KdataQuery;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, ApiResponse, KdataParams, KdataResponse};

/// 获取历史 K 线
///
/// 单日 (`date`) 按文档 ID 直接获取；区间 (`start` + `end`) 按时间升序分页返回。
/// `fuquan` 为 qfq/hfq 时返回复权后的价格。
#[utoipa::path(
    get,
    path = "/api/v1/kdata/{security}",
    tag = "行情 (Market)",
    params(
        ("security" = String, Path, description = "证券代码或 ID，如 300027 / stock_sz_300027"),
        KdataParams
    ),
    responses(
        (status = 200, description = "查询成功", body = ApiResponse<KdataResponse>),
        (status = 400, description = "参数错误", body = ApiErrorResponse),
        (status = 500, description = "后端故障", body = ApiErrorResponse)
    )
)]
pub async fn get_kdata(
    State(state): State<AppState>,
    Path(security): Path<String>,
    Query(params): Query<KdataParams>,
) -> Result<Json<ApiResponse<KdataResponse>>, ApiError> {
    let query = build_query(security, &params)?;
    let result = state.kdata_service.get_kdata(&query).await?;
    Ok(Json(ApiResponse::ok(KdataResponse::from(result))))
}

/// 分页窗口上限，与 Elasticsearch 默认的 `index.max_result_window` 一致。
const MAX_RESULT_WINDOW: usize = 10_000;

/// 将查询参数翻译为 `KdataQuery`，非法参数返回 400。
fn build_query(security: String, params: &KdataParams) -> Result<KdataQuery, ApiError> {
    let mut query = KdataQuery::new(security);
    query.the_date = parse_date(params.date.as_deref())?;
    query.start_date = parse_date(params.start.as_deref())?;
    query.end_date = parse_date(params.end.as_deref())?;
    if let Some(fuquan) = &params.fuquan {
        query.fuquan = fuquan.parse::<Fuquan>().map_err(ApiError::BadRequest)?;
    }
    if let Some(level) = &params.level {
        query.level = level.parse::<Level>().map_err(ApiError::BadRequest)?;
    }
    if let Some(fields) = &params.fields {
        query.fields = FieldSet::parse_list(fields).map_err(ApiError::BadRequest)?;
    }
    if let Some(from) = params.from {
        query.from_idx = from;
    }
    if let Some(size) = params.size {
        query.size = size;
    }
    let window = query.from_idx.checked_add(query.size);
    if window.is_none_or(|end| end > MAX_RESULT_WINDOW) {
        return Err(ApiError::BadRequest(format!(
            "from + size must not exceed {}, got from={} size={}",
            MAX_RESULT_WINDOW, query.from_idx, query.size
        )));
    }
    Ok(query)
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| ApiError::BadRequest(format!("Invalid date {}: {}", s, e)))
    })
    .transpose()
}
