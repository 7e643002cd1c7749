//! 测试辅助：内存版搜索后端。
//!
//! 仅在 `test-utils` feature 下编译，供各 crate 的集成测试注入。

use crate::kdata::entity::{FieldSet, KdataRecord};
use crate::search::error::SearchError;
use crate::search::port::{SearchBackend, SearchHits, SearchRequest, SortOrder};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use tokio::sync::Mutex;

/// # Summary
/// 后端收到的一次调用。
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    GetSource {
        index: String,
        id: String,
        fields: FieldSet,
    },
    Search(SearchRequest),
}

/// # Summary
/// 基于 DashMap 的内存搜索后端。
///
/// # Invariants
/// - 文档按 `索引 -> (ID, 记录)` 保存，插入顺序不影响搜索结果的排序。
/// - 只理解 `term`、`range` 与 `bool.filter` 三种查询谓词。
/// - 每次调用都会被记录，便于断言投影、排序与分页参数。
#[derive(Default)]
pub struct MemorySearchBackend {
    indices: DashMap<String, Vec<(String, KdataRecord)>>,
    calls: Mutex<Vec<RecordedCall>>,
    failing: AtomicBool,
}

impl MemorySearchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 向索引写入一篇文档，同 ID 覆盖。
    pub fn insert(&self, index: &str, id: &str, record: KdataRecord) {
        let mut docs = self.indices.entry(index.to_string()).or_default();
        docs.retain(|(doc_id, _)| doc_id != id);
        docs.push((id.to_string(), record));
    }

    /// 打开后所有调用都返回网络错误。
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    /// 返回迄今为止的全部调用记录。
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: RecordedCall) -> Result<(), SearchError> {
        self.calls.lock().await.push(call);
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(SearchError::Network("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchBackend for MemorySearchBackend {
    async fn get_source(
        &self,
        index: &str,
        id: &str,
        fields: &FieldSet,
    ) -> Result<Option<KdataRecord>, SearchError> {
        self.record(RecordedCall::GetSource {
            index: index.to_string(),
            id: id.to_string(),
            fields: fields.clone(),
        })
        .await?;

        let Some(docs) = self.indices.get(index) else {
            return Ok(None);
        };
        Ok(docs
            .iter()
            .find(|(doc_id, _)| doc_id == id)
            .map(|(_, record)| record.project(fields)))
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchHits, SearchError> {
        self.record(RecordedCall::Search(request.clone())).await?;

        let Some(docs) = self.indices.get(&request.index) else {
            return Ok(SearchHits::default());
        };

        let mut matched = Vec::new();
        for (_, record) in docs.iter() {
            let doc = to_object(record)?;
            if matches(&request.query, &doc) {
                matched.push((doc, record));
            }
        }

        for sort in request.sort.iter().rev() {
            let key = sort.field.as_str();
            matched.sort_by(|(a, _), (b, _)| {
                let ordering = compare(a.get(key), b.get(key));
                match sort.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        let total = matched.len() as u64;
        let records = matched
            .into_iter()
            .skip(request.from)
            .take(request.size)
            .map(|(_, record)| record.project(&request.fields))
            .collect();

        Ok(SearchHits { total, records })
    }
}

fn to_object(record: &KdataRecord) -> Result<Map<String, Value>, SearchError> {
    match serde_json::to_value(record).map_err(|e| SearchError::Parse(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(SearchError::Parse(format!("Not an object: {}", other))),
    }
}

fn matches(query: &Value, doc: &Map<String, Value>) -> bool {
    if let Some(term) = query.get("term").and_then(Value::as_object) {
        return term.iter().all(|(key, expected)| doc.get(key) == Some(expected));
    }
    if let Some(range) = query.get("range").and_then(Value::as_object) {
        return range.iter().all(|(key, bounds)| {
            let value = doc.get(key);
            let lower = bounds
                .get("gte")
                .is_none_or(|gte| compare(value, Some(gte)) != Ordering::Less);
            let upper = bounds
                .get("lte")
                .is_none_or(|lte| compare(value, Some(lte)) != Ordering::Greater);
            value.is_some() && lower && upper
        });
    }
    if let Some(filter) = query.pointer("/bool/filter").and_then(Value::as_array) {
        return filter.iter().all(|clause| matches(clause, doc));
    }
    query.get("match_all").is_some()
}

// 字符串按字典序比较，日期格式 YYYY-MM-DD 可直接比较
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.as_str().cmp(b.as_str()),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdata::entity::KdataField;
    use crate::search::port::SortField;
    use crate::search::query::{date_range, term};
    use chrono::NaiveDate;

    fn record(day: &str, close: f64) -> KdataRecord {
        KdataRecord {
            timestamp: Some(day.to_string()),
            security_id: Some("stock_sz_300028".to_string()),
            code: Some("300028".to_string()),
            close: Some(close),
            factor: Some(1.0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_memory_backend_range_sort_and_projection() {
        let backend = MemorySearchBackend::new();
        backend.insert("idx", "b", record("2017-09-06", 2.0));
        backend.insert("idx", "a", record("2017-09-05", 1.0));
        backend.insert("idx", "c", record("2017-10-01", 3.0));

        let request = SearchRequest {
            index: "idx".to_string(),
            query: date_range(
                NaiveDate::from_ymd_opt(2017, 9, 1).unwrap(),
                NaiveDate::from_ymd_opt(2017, 9, 30).unwrap(),
                Some("300028"),
            ),
            fields: [KdataField::Timestamp, KdataField::Close].into_iter().collect(),
            from: 0,
            size: 10,
            sort: vec![SortField::asc(KdataField::Timestamp)],
        };
        let hits = backend.search(&request).await.unwrap();
        assert_eq!(hits.total, 2);
        assert_eq!(hits.records[0].timestamp.as_deref(), Some("2017-09-05"));
        assert_eq!(hits.records[1].close, Some(2.0));
        assert!(hits.records[0].factor.is_none());
    }

    #[tokio::test]
    async fn test_memory_backend_latest_and_failure() {
        let backend = MemorySearchBackend::new();
        backend.insert("idx", "a", record("2017-09-05", 1.0));
        backend.insert("idx", "b", record("2017-09-06", 2.0));

        let latest = backend
            .latest_record("idx", term(KdataField::SecurityId, "stock_sz_300028"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.timestamp.as_deref(), Some("2017-09-06"));

        backend.set_failing(true);
        assert!(backend.get_source("idx", "a", &FieldSet::default()).await.is_err());
        assert_eq!(backend.calls().await.len(), 2);
    }
}
