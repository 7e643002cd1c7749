use crate::kdata::entity::{FieldSet, KdataField, KdataRecord};
use crate::search::error::SearchError;
use async_trait::async_trait;
use serde_json::Value;

/// # Summary
/// 排序方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// # Summary
/// 单个排序键。
///
/// # Invariants
/// - `Display` 输出形如 `timestamp:asc`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortField {
    pub field: KdataField,
    pub order: SortOrder,
}

impl SortField {
    pub fn asc(field: KdataField) -> Self {
        Self {
            field,
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: KdataField) -> Self {
        Self {
            field,
            order: SortOrder::Desc,
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.field, self.order.as_str())
    }
}

/// # Summary
/// 一次搜索请求的全部参数。
///
/// # Invariants
/// - `query` 为后端原生的查询谓词 (不含外层 `query` 键)。
/// - `fields` 为空时表示不限制 `_source` 投影。
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    // 目标索引
    pub index: String,
    // 查询谓词
    pub query: Value,
    // `_source` 投影字段
    pub fields: FieldSet,
    // 分页起点
    pub from: usize,
    // 分页大小
    pub size: usize,
    // 排序键
    pub sort: Vec<SortField>,
}

/// # Summary
/// 搜索命中结果。
///
/// # Invariants
/// - `total` 为全部命中数，`records` 只是 `from..from+size` 这一页。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    pub total: u64,
    pub records: Vec<KdataRecord>,
}

/// # Summary
/// K 线文档搜索后端接口 (Port)。
///
/// # Invariants
/// - 实现者必须可被多个调用方并发使用。
/// - 网络或存储故障通过 `SearchError` 原样返回，不在此层重试。
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// # Summary
    /// 按文档 ID 获取单篇文档的 `_source`。
    ///
    /// # Logic
    /// 1. 在指定索引中按 ID 定位文档。
    /// 2. 仅返回 `fields` 中列出的字段。
    ///
    /// # Arguments
    /// * `index`: 索引名。
    /// * `id`: 文档 ID。
    /// * `fields`: 投影字段。
    ///
    /// # Returns
    /// 存在返回 `Some(KdataRecord)`，不存在返回 `None`。
    async fn get_source(
        &self,
        index: &str,
        id: &str,
        fields: &FieldSet,
    ) -> Result<Option<KdataRecord>, SearchError>;

    /// # Summary
    /// 执行带分页与排序的搜索。
    ///
    /// # Arguments
    /// * `request`: 搜索参数。
    ///
    /// # Returns
    /// 成功返回命中总数与当前页记录。
    async fn search(&self, request: &SearchRequest) -> Result<SearchHits, SearchError>;

    /// # Summary
    /// 获取满足查询条件的最新一条记录。
    ///
    /// # Logic
    /// 1. 按 `timestamp` 倒序搜索，只取 1 条。
    /// 2. 返回第一条命中。
    ///
    /// # Arguments
    /// * `index`: 索引名。
    /// * `query`: 查询谓词。
    ///
    /// # Returns
    /// 有命中返回 `Some(KdataRecord)`，否则返回 `None`。
    async fn latest_record(
        &self,
        index: &str,
        query: Value,
    ) -> Result<Option<KdataRecord>, SearchError> {
        let request = SearchRequest {
            index: index.to_string(),
            query,
            fields: FieldSet::empty(),
            from: 0,
            size: 1,
            sort: vec![SortField::desc(KdataField::Timestamp)],
        };
        let hits = self.search(&request).await?;
        Ok(hits.records.into_iter().next())
    }
}
