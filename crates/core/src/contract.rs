//! 证券规范化、索引命名与文档 ID 约定。

use crate::common::{Level, SecurityItem, SecurityRef, SecurityType};
use crate::kdata::error::KdataError;
use crate::search::query::to_time_str;
use chrono::NaiveDate;

/// 共享 `china` 索引族的交易所。
const CHINA_EXCHANGES: [&str; 2] = ["sh", "sz"];
/// 共享 `usa` 索引族的交易所。
const USA_EXCHANGES: [&str; 3] = ["nasdaq", "amex", "nyse"];

/// # Summary
/// 将调用方传入的证券引用规范化为描述符。
///
/// # Logic
/// 1. 已是描述符则直接返回其克隆。
/// 2. 形如 `type_exchange_code` 的字符串按 ID 解析。
/// 3. 6 位数字代码视为 A 股：`6`/`5`/`9` 开头归上交所，其余归深交所。
///
/// # Arguments
/// * `security`: 原始证券引用。
///
/// # Returns
/// 成功返回 SecurityItem，无法识别时返回 `KdataError::InvalidInput`。
pub fn to_security_item(security: &SecurityRef) -> Result<SecurityItem, KdataError> {
    let raw = match security {
        SecurityRef::Item(item) => return Ok(item.clone()),
        SecurityRef::Raw(raw) => raw.trim(),
    };

    let parts: Vec<&str> = raw.splitn(3, '_').collect();
    if let [security_type, exchange, code] = parts.as_slice() {
        let security_type = security_type
            .parse::<SecurityType>()
            .map_err(KdataError::InvalidInput)?;
        if exchange.is_empty() || code.is_empty() {
            return Err(KdataError::InvalidInput(format!(
                "Malformed security id: {}",
                raw
            )));
        }
        return Ok(SecurityItem::new(security_type, exchange, code));
    }

    if raw.len() == 6 && raw.chars().all(|c| c.is_ascii_digit()) {
        let exchange = match raw.as_bytes()[0] {
            b'6' | b'5' | b'9' => "sh",
            _ => "sz",
        };
        return Ok(SecurityItem::new(SecurityType::Stock, exchange, raw));
    }

    Err(KdataError::InvalidInput(format!(
        "Unrecognized security: {}",
        raw
    )))
}

/// # Summary
/// 根据证券类型、交易所与级别推导 K 线索引名。
///
/// # Logic
/// 1. 沪深交易所共用 `china` 索引族。
/// 2. 美股三大交易所共用 `usa` 索引族。
/// 3. 其余交易所按自身名称建索引。
///
/// # Returns
/// 形如 `stock_china_day_kdata` 的索引名。
pub fn kdata_index_name(security_type: SecurityType, exchange: &str, level: Level) -> String {
    let exchange = exchange.to_lowercase();
    let region = if CHINA_EXCHANGES.contains(&exchange.as_str()) {
        "china"
    } else if USA_EXCHANGES.contains(&exchange.as_str()) {
        "usa"
    } else {
        exchange.as_str()
    };
    format!("{}_{}_{}_kdata", security_type, region, level)
}

/// 单日 K 线文档 ID：`{securityId}_{YYYY-MM-DD}`。
pub fn kdata_doc_id(security_id: &str, date: NaiveDate) -> String {
    format!("{}_{}", security_id, to_time_str(date))
}
