//! # `kdata-core` - 领域模型与端口
//!
//! 定义 K 线记录、证券描述符、复权方式等领域实体，
//! 以及搜索后端端口 `SearchBackend` 与索引命名约定。
//! 具体的后端实现位于 `kdata-search`，查询门面位于 `kdata-query`。

pub mod common;
pub mod config;
pub mod contract;
pub mod kdata;
pub mod search;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
