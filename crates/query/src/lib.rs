//! # `kdata-query` - K 线查询门面
//!
//! 将调用参数翻译为搜索后端的单篇获取或区间搜索，并按需复权。

pub mod adjust;
pub mod service;
