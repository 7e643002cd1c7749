//! # `kdata-search` - 搜索后端适配器
//!
//! 以 Elasticsearch REST 接口实现 `kdata-core` 的 `SearchBackend` 端口。

pub mod elasticsearch;
