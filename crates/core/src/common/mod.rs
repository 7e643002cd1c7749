use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// # Summary
/// 证券类型枚举，决定 K 线数据所在的索引族。
///
/// # Invariants
/// - 线上字符串 (wire name) 全部为小写，与索引命名保持一致。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SecurityType {
    // 股票
    Stock,
    // 指数
    Index,
    // 期货
    Future,
    // 数字货币
    Cryptocurrency,
}

impl SecurityType {
    /// 返回该类型在索引名与证券 ID 中使用的字符串。
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityType::Stock => "stock",
            SecurityType::Index => "index",
            SecurityType::Future => "future",
            SecurityType::Cryptocurrency => "cryptocurrency",
        }
    }
}

impl FromStr for SecurityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stock" => Ok(SecurityType::Stock),
            "index" => Ok(SecurityType::Index),
            "future" => Ok(SecurityType::Future),
            "cryptocurrency" => Ok(SecurityType::Cryptocurrency),
            _ => Err(format!("Unknown SecurityType: {}", s)),
        }
    }
}

impl std::fmt::Display for SecurityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// # Summary
/// 证券描述符，由原始代码或 ID 规范化而来。
///
/// # Invariants
/// - `id` 必须等于 `{type}_{exchange}_{code}`。
/// - 创建后不可变，仅用于索引名与文档 ID 的推导。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityItem {
    // 证券唯一标识 (例如: stock_sz_300027)
    pub id: String,
    // 证券代码 (例如: 300027)
    pub code: String,
    // 交易所代码 (例如: sz, sh, nasdaq)
    pub exchange: String,
    // 证券类型
    #[serde(rename = "type")]
    pub security_type: SecurityType,
}

impl SecurityItem {
    /// # Summary
    /// 按类型、交易所与代码构造证券描述符。
    ///
    /// # Logic
    /// 1. 交易所统一转换为小写。
    /// 2. 拼接出 `{type}_{exchange}_{code}` 形式的 ID。
    ///
    /// # Arguments
    /// * `security_type`: 证券类型。
    /// * `exchange`: 交易所代码。
    /// * `code`: 证券代码。
    ///
    /// # Returns
    /// 返回新的 SecurityItem。
    pub fn new(security_type: SecurityType, exchange: &str, code: &str) -> Self {
        let exchange = exchange.to_lowercase();
        Self {
            id: format!("{}_{}_{}", security_type, exchange, code),
            code: code.to_string(),
            exchange,
            security_type,
        }
    }
}

/// # Summary
/// 调用方传入的证券引用：原始代码/ID 字符串，或已规范化的描述符。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityRef {
    // 原始字符串 (例如: "300027" 或 "stock_sz_300027")
    Raw(String),
    // 已规范化的描述符
    Item(SecurityItem),
}

impl From<&str> for SecurityRef {
    fn from(raw: &str) -> Self {
        SecurityRef::Raw(raw.to_string())
    }
}

impl From<String> for SecurityRef {
    fn from(raw: String) -> Self {
        SecurityRef::Raw(raw)
    }
}

impl From<SecurityItem> for SecurityRef {
    fn from(item: SecurityItem) -> Self {
        SecurityRef::Item(item)
    }
}

/// # Summary
/// K 线级别 (采样周期) 枚举。
///
/// # Invariants
/// - 分钟级别的线上字符串为纯数字 (`1`, `5`, `15`, `30`, `60`)。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Level {
    // 1分钟
    #[serde(rename = "1")]
    Minute1,
    // 5分钟
    #[serde(rename = "5")]
    Minute5,
    // 15分钟
    #[serde(rename = "15")]
    Minute15,
    // 30分钟
    #[serde(rename = "30")]
    Minute30,
    // 60分钟
    #[serde(rename = "60")]
    Minute60,
    // 日线
    #[default]
    #[serde(rename = "day")]
    Day,
    // 周线
    #[serde(rename = "week")]
    Week,
    // 月线
    #[serde(rename = "month")]
    Month,
}

impl Level {
    /// 返回该级别在索引名中使用的字符串。
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Minute1 => "1",
            Level::Minute5 => "5",
            Level::Minute15 => "15",
            Level::Minute30 => "30",
            Level::Minute60 => "60",
            Level::Day => "day",
            Level::Week => "week",
            Level::Month => "month",
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" => Ok(Level::Minute1),
            "5" => Ok(Level::Minute5),
            "15" => Ok(Level::Minute15),
            "30" => Ok(Level::Minute30),
            "60" => Ok(Level::Minute60),
            "day" => Ok(Level::Day),
            "week" => Ok(Level::Week),
            "month" => Ok(Level::Month),
            _ => Err(format!("Unknown Level: {}", s)),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
