//! 后端原生查询谓词的构造函数。

use crate::kdata::entity::KdataField;
use chrono::NaiveDate;
use serde_json::{Value, json};

/// 日期在查询与文档 ID 中统一使用的格式。
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 将日期格式化为 `YYYY-MM-DD`。
pub fn to_time_str(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// # Summary
/// 构造时间区间查询。
///
/// # Logic
/// 1. `timestamp` 落在闭区间 `[start, end]` 内。
/// 2. 若给出 `code`，再追加 `code` 的精确匹配。
/// 3. 两个条件放入 `bool.filter`，不参与打分。
///
/// # Arguments
/// * `start`: 开始日期 (包含)。
/// * `end`: 结束日期 (包含)。
/// * `code`: 可选的证券代码。
///
/// # Returns
/// 返回查询谓词 JSON。
pub fn date_range(start: NaiveDate, end: NaiveDate, code: Option<&str>) -> Value {
    let timestamp = KdataField::Timestamp.as_str();
    let mut filter = vec![json!({
        "range": {
            timestamp: {
                "gte": to_time_str(start),
                "lte": to_time_str(end),
            }
        }
    })];
    if let Some(code) = code {
        filter.push(term(KdataField::Code, code));
    }
    json!({ "bool": { "filter": filter } })
}

/// 构造单字段精确匹配查询。
pub fn term(field: KdataField, value: &str) -> Value {
    let name = field.as_str();
    json!({ "term": { name: value } })
}
