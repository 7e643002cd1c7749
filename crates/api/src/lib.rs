//! # `kdata-api` - HTTP API 网关
//!
//! 本 crate 是 K 线查询服务的 HTTP/REST 入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收 HTTP 请求并把查询参数翻译为 `KdataQuery`
//! - 调用下层 `KdataService` 完成查询与复权
//! - 将领域模型转换为 DTO 返回给前端

pub mod error;
pub mod routes;
pub mod server;
pub mod types;
