use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// # Summary
/// 单根 K 线记录实体，对应索引中的一篇文档。
///
/// # Invariants
/// - 查询时可能只投影部分字段，因此所有字段均为可选。
/// - `factor` 为截至该日的累计复权因子 (原始价 * factor = 后复权价)。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KdataRecord {
    // 时间 (日线为 YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "2017-09-04")]
    pub timestamp: Option<String>,
    // 证券唯一标识
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_id: Option<String>,
    // 证券代码
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    // 证券名称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    // 开盘价
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    // 收盘价
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<f64>,
    // 最高价
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    // 最低价
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    // 成交量
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    // 成交额
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turnover: Option<f64>,
    // 前收盘价
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_close: Option<f64>,
    // 涨跌额
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    // 涨跌幅
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<f64>,
    // 换手率
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turnover_rate: Option<f64>,
    // 总市值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_cap: Option<f64>,
    // 流通市值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m_cap: Option<f64>,
    // 累计复权因子
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,
}

impl KdataRecord {
    /// # Summary
    /// 按字段集合裁剪记录，集合之外的字段置空。
    ///
    /// # Logic
    /// 1. 空集合表示不做投影，原样返回。
    /// 2. 否则只拷贝集合内的字段。
    pub fn project(&self, fields: &FieldSet) -> KdataRecord {
        if fields.is_empty() {
            return self.clone();
        }
        let mut projected = KdataRecord::default();
        for field in fields.iter() {
            match field {
                KdataField::Timestamp => projected.timestamp = self.timestamp.clone(),
                KdataField::SecurityId => projected.security_id = self.security_id.clone(),
                KdataField::Code => projected.code = self.code.clone(),
                KdataField::Name => projected.name = self.name.clone(),
                KdataField::Open => projected.open = self.open.clone(),
                KdataField::Close => projected.close = self.close.clone(),
                KdataField::High => projected.high = self.high.clone(),
                KdataField::Low => projected.low = self.low.clone(),
                KdataField::Volume => projected.volume = self.volume.clone(),
                KdataField::Turnover => projected.turnover = self.turnover.clone(),
                KdataField::PreClose => projected.pre_close = self.pre_close.clone(),
                KdataField::Change => projected.change = self.change.clone(),
                KdataField::ChangePct => projected.change_pct = self.change_pct.clone(),
                KdataField::TurnoverRate => projected.turnover_rate = self.turnover_rate.clone(),
                KdataField::TCap => projected.t_cap = self.t_cap.clone(),
                KdataField::MCap => projected.m_cap = self.m_cap.clone(),
                KdataField::Factor => projected.factor = self.factor.clone(),
            }
        }
        projected
    }
}

/// # Summary
/// K 线记录中可被投影的字段。
///
/// # Invariants
/// - `as_str` 返回的名称必须与 `KdataRecord` 的序列化字段名一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KdataField {
    Timestamp,
    SecurityId,
    Code,
    Name,
    Open,
    Close,
    High,
    Low,
    Volume,
    Turnover,
    PreClose,
    Change,
    ChangePct,
    TurnoverRate,
    TCap,
    MCap,
    Factor,
}

impl KdataField {
    /// 全部字段，按股票 K 线的标准列顺序排列。
    pub const ALL: [KdataField; 17] = [
        KdataField::Timestamp,
        KdataField::Code,
        KdataField::Name,
        KdataField::Low,
        KdataField::Open,
        KdataField::Close,
        KdataField::High,
        KdataField::Volume,
        KdataField::Turnover,
        KdataField::SecurityId,
        KdataField::PreClose,
        KdataField::Change,
        KdataField::ChangePct,
        KdataField::TurnoverRate,
        KdataField::TCap,
        KdataField::MCap,
        KdataField::Factor,
    ];

    /// 字段在文档中的名称。
    pub fn as_str(&self) -> &'static str {
        match self {
            KdataField::Timestamp => "timestamp",
            KdataField::SecurityId => "securityId",
            KdataField::Code => "code",
            KdataField::Name => "name",
            KdataField::Open => "open",
            KdataField::Close => "close",
            KdataField::High => "high",
            KdataField::Low => "low",
            KdataField::Volume => "volume",
            KdataField::Turnover => "turnover",
            KdataField::PreClose => "preClose",
            KdataField::Change => "change",
            KdataField::ChangePct => "changePct",
            KdataField::TurnoverRate => "turnoverRate",
            KdataField::TCap => "tCap",
            KdataField::MCap => "mCap",
            KdataField::Factor => "factor",
        }
    }
}

impl FromStr for KdataField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KdataField::ALL
            .iter()
            .find(|field| field.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown kdata field: {}", s))
    }
}

impl std::fmt::Display for KdataField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// # Summary
/// 有序且去重的字段投影集合。
///
/// # Invariants
/// - 保留插入顺序，同一字段最多出现一次。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    fields: Vec<KdataField>,
}

impl FieldSet {
    /// 创建空集合。
    pub fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    /// 股票 K 线的标准列集合。
    pub fn stock_columns() -> Self {
        Self {
            fields: KdataField::ALL.to_vec(),
        }
    }

    /// # Summary
    /// 解析逗号分隔的字段列表。
    ///
    /// # Logic
    /// 1. 按逗号拆分并去除空白，忽略空片段。
    /// 2. 逐个解析为 `KdataField`，遇到未知字段立即返回错误。
    ///
    /// # Arguments
    /// * `raw`: 例如 `"timestamp,close"`。
    ///
    /// # Returns
    /// 成功返回 FieldSet，失败返回错误描述。
    pub fn parse_list(raw: &str) -> Result<Self, String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(KdataField::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(FieldSet::from_iter)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: KdataField) -> bool {
        self.fields.contains(&field)
    }

    /// 若字段不存在则追加到末尾。
    pub fn insert(&mut self, field: KdataField) {
        if !self.contains(field) {
            self.fields.push(field);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = KdataField> + '_ {
        self.fields.iter().copied()
    }

    /// 返回字段名列表，用于构造 `_source` 投影。
    pub fn names(&self) -> Vec<&'static str> {
        self.fields.iter().map(KdataField::as_str).collect()
    }
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::stock_columns()
    }
}

impl FromIterator<KdataField> for FieldSet {
    fn from_iter<I: IntoIterator<Item = KdataField>>(iter: I) -> Self {
        let mut set = FieldSet::empty();
        for field in iter {
            set.insert(field);
        }
        set
    }
}

/// # Summary
/// 复权方式。
///
/// # Invariants
/// - `Bfq` 不复权，`Qfq` 前复权 (以最新因子为基准)，`Hfq` 后复权。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fuquan {
    #[default]
    Bfq,
    Qfq,
    Hfq,
}

impl Fuquan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fuquan::Bfq => "bfq",
            Fuquan::Qfq => "qfq",
            Fuquan::Hfq => "hfq",
        }
    }
}

impl FromStr for Fuquan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bfq" => Ok(Fuquan::Bfq),
            "qfq" => Ok(Fuquan::Qfq),
            "hfq" => Ok(Fuquan::Hfq),
            _ => Err(format!("Unsupported adjustment mode: {}", s)),
        }
    }
}

impl std::fmt::Display for Fuquan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// # Summary
/// 区间查询的一页结果。
///
/// # Invariants
/// - `records` 按时间升序排列，`total` 为全部命中数而非本页条数。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KdataPage {
    pub total: u64,
    pub records: Vec<KdataRecord>,
}

/// # Summary
/// K 线查询结果：单日按 ID 获取的一条记录，或区间查询的一页记录。
#[derive(Debug, Clone, PartialEq)]
pub enum KdataResult {
    Record(KdataRecord),
    Page(KdataPage),
}

impl KdataResult {
    /// 以切片形式访问结果中的全部记录。
    pub fn records(&self) -> &[KdataRecord] {
        match self {
            KdataResult::Record(record) => std::slice::from_ref(record),
            KdataResult::Page(page) => &page.records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_round_trip_through_record_json() {
        let record = KdataRecord {
            timestamp: Some("2017-09-04".into()),
            security_id: Some("stock_sz_300027".into()),
            code: Some("300027".into()),
            name: Some("华谊兄弟".into()),
            open: Some(1.0),
            close: Some(1.0),
            high: Some(1.0),
            low: Some(1.0),
            volume: Some(1.0),
            turnover: Some(1.0),
            pre_close: Some(1.0),
            change: Some(1.0),
            change_pct: Some(1.0),
            turnover_rate: Some(1.0),
            t_cap: Some(1.0),
            m_cap: Some(1.0),
            factor: Some(1.0),
        };
        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), KdataField::ALL.len());
        for field in KdataField::ALL {
            assert!(object.contains_key(field.as_str()), "missing {}", field);
        }
    }

    #[test]
    fn test_record_skips_absent_fields() {
        let record = KdataRecord {
            close: Some(12.5),
            factor: Some(2.0),
            ..Default::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"close":12.5,"factor":2.0}"#);
    }

    #[test]
    fn test_field_set_dedup_and_insert() {
        let mut set: FieldSet = [KdataField::Close, KdataField::Open, KdataField::Close]
            .into_iter()
            .collect();
        assert_eq!(set.names(), vec!["close", "open"]);
        set.insert(KdataField::Factor);
        set.insert(KdataField::Factor);
        assert_eq!(set.names(), vec!["close", "open", "factor"]);
    }

    #[test]
    fn test_field_set_parse_list() {
        let set = FieldSet::parse_list("timestamp, close,,factor").unwrap();
        assert_eq!(set.names(), vec!["timestamp", "close", "factor"]);
        assert!(FieldSet::parse_list("close,bogus").is_err());
        assert!(FieldSet::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_fuquan_parse() {
        assert_eq!("QFQ".parse::<Fuquan>().unwrap(), Fuquan::Qfq);
        assert_eq!(Fuquan::default(), Fuquan::Bfq);
        let err = "xfq".parse::<Fuquan>().unwrap_err();
        assert!(err.contains("xfq"));
    }

    #[test]
    fn test_record_projection() {
        let record = KdataRecord {
            timestamp: Some("2017-09-04".into()),
            open: Some(19.5),
            close: Some(20.0),
            factor: Some(3.0),
            ..Default::default()
        };
        let fields: FieldSet = [KdataField::Close, KdataField::Factor].into_iter().collect();
        let projected = record.project(&fields);
        assert_eq!(projected.close, Some(20.0));
        assert_eq!(projected.factor, Some(3.0));
        assert!(projected.open.is_none());
        assert!(projected.timestamp.is_none());

        assert_eq!(record.project(&FieldSet::empty()), record);
        assert_eq!(record.project(&FieldSet::stock_columns()), record);
    }

    #[test]
    fn test_result_records_view() {
        let single = KdataResult::Record(KdataRecord::default());
        assert_eq!(single.records().len(), 1);
        let page = KdataResult::Page(KdataPage::default());
        assert!(page.records().is_empty());
    }
}
