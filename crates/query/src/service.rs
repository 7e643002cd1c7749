use crate::adjust::adjust_fuquan_price;
use chrono::NaiveDate;
use kdata_core::common::{Level, SecurityItem, SecurityRef};
use kdata_core::contract::{kdata_doc_id, kdata_index_name, to_security_item};
use kdata_core::kdata::entity::{FieldSet, Fuquan, KdataField, KdataPage, KdataResult};
use kdata_core::kdata::error::KdataError;
use kdata_core::search::port::{SearchBackend, SearchRequest, SortField};
use kdata_core::search::query::{date_range, term};
use std::sync::Arc;
use tracing::{debug, warn};

/// # Summary
/// 一次 K 线查询的全部参数。
///
/// # Invariants
/// - `the_date` 与 `start_date/end_date` 至多使用其一；同时给出时单日优先 (仅日线)。
/// - 默认值：不复权、日线、股票标准列、第 0 条起取 10 条。
#[derive(Debug, Clone)]
pub struct KdataQuery {
    pub security: SecurityRef,
    pub the_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub fuquan: Fuquan,
    pub level: Level,
    pub fields: FieldSet,
    pub from_idx: usize,
    pub size: usize,
}

impl KdataQuery {
    pub fn new(security: impl Into<SecurityRef>) -> Self {
        Self {
            security: security.into(),
            the_date: None,
            start_date: None,
            end_date: None,
            fuquan: Fuquan::default(),
            level: Level::default(),
            fields: FieldSet::default(),
            from_idx: 0,
            size: 10,
        }
    }

    /// 查询单日数据。
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.the_date = Some(date);
        self
    }

    /// 查询闭区间 `[start, end]` 内的数据。
    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_fuquan(mut self, fuquan: Fuquan) -> Self {
        self.fuquan = fuquan;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_fields(mut self, fields: FieldSet) -> Self {
        self.fields = fields;
        self
    }

    pub fn page(mut self, from_idx: usize, size: usize) -> Self {
        self.from_idx = from_idx;
        self.size = size;
        self
    }
}

/// # Summary
/// K 线查询门面，负责参数翻译、查询分派与复权。
///
/// # Invariants
/// - 不持有任何跨调用状态，搜索后端由构造方注入。
/// - 每次调用最多发出两次后端请求 (数据查询 + 最新因子查询)。
#[derive(Clone)]
pub struct KdataService {
    backend: Arc<dyn SearchBackend>,
}

impl KdataService {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// # Summary
    /// 查询 K 线数据，并按需复权。
    ///
    /// # Logic
    /// 1. 规范化证券，推导索引名。
    /// 2. 字段列表为空直接返回 `None`；否则补齐 `factor`。
    /// 3. 日线且给出单日：按 `{securityId}_{YYYY-MM-DD}` 取单篇文档。
    /// 4. 否则给出起止日期：按时间升序分页搜索。
    /// 5. 不复权直接返回；否则读取最新记录的因子并复权，返回新的记录。
    ///
    /// # Arguments
    /// * `query`: 查询参数。
    ///
    /// # Returns
    /// 有数据返回 `Some(KdataResult)`；文档不存在、未命中任何分支或字段为空时返回 `None`。
    pub async fn get_kdata(&self, query: &KdataQuery) -> Result<Option<KdataResult>, KdataError> {
        let security = to_security_item(&query.security)?;
        let index = kdata_index_name(security.security_type, &security.exchange, query.level);

        if query.fields.is_empty() {
            debug!("Empty field list for {}, skipping query", security.id);
            return Ok(None);
        }
        let mut fields = query.fields.clone();
        fields.insert(KdataField::Factor);

        let kdata = if query.level == Level::Day
            && let Some(the_date) = query.the_date
        {
            let id = kdata_doc_id(&security.id, the_date);
            debug!("Kdata point lookup: index={}, id={}", index, id);
            self.backend
                .get_source(&index, &id, &fields)
                .await?
                .map(KdataResult::Record)
        } else if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
            debug!(
                "Kdata range query: index={}, code={}, {}..={}, from={}, size={}",
                index, security.code, start, end, query.from_idx, query.size
            );
            let request = SearchRequest {
                index: index.clone(),
                query: date_range(start, end, Some(&security.code)),
                fields,
                from: query.from_idx,
                size: query.size,
                sort: vec![SortField::asc(KdataField::Timestamp)],
            };
            let hits = self.backend.search(&request).await?;
            Some(KdataResult::Page(KdataPage {
                total: hits.total,
                records: hits.records,
            }))
        } else {
            debug!("No date or date range given for {}, nothing to query", security.id);
            None
        };

        let Some(kdata) = kdata else {
            return Ok(None);
        };
        if query.fuquan == Fuquan::Bfq || kdata.records().is_empty() {
            return Ok(Some(kdata));
        }

        let current_factor = self.current_factor(&index, &security).await?;
        let adjusted = match kdata {
            KdataResult::Record(record) => {
                adjust_fuquan_price(std::slice::from_ref(&record), query.fuquan, current_factor)?
                    .pop()
                    .map(KdataResult::Record)
            }
            KdataResult::Page(page) => Some(KdataResult::Page(KdataPage {
                total: page.total,
                records: adjust_fuquan_price(&page.records, query.fuquan, current_factor)?,
            })),
        };
        Ok(adjusted)
    }

    /// # Summary
    /// 读取证券最新一条记录的复权因子。
    ///
    /// # Logic
    /// 1. 在同一索引内按 `securityId` 精确匹配，取时间最新的一条。
    /// 2. 没有记录或记录缺少因子时返回 `None`，是否可用由复权方式决定。
    async fn current_factor(
        &self,
        index: &str,
        security: &SecurityItem,
    ) -> Result<Option<f64>, KdataError> {
        let latest = self
            .backend
            .latest_record(index, term(KdataField::SecurityId, &security.id))
            .await?;

        let factor = latest.and_then(|record| record.factor);
        if factor.is_none() {
            warn!("No latest factor found for {} in {}", security.id, index);
        }
        Ok(factor)
    }
}
