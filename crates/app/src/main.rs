use std::sync::Arc;

use kdata_api::server::{AppState, start_server};
use kdata_core::config::AppConfig;
use kdata_query::service::KdataService;
use kdata_search::elasticsearch::ElasticsearchClient;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// 默认配置文件 (扩展名可省略，缺失时使用内置默认值)
const CONFIG_PATH: &str = "config/default";

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化搜索后端并通过 Arc<dyn Trait> 注入到 KdataService。
///
/// # Logic
/// 1. 初始化全局日志。
/// 2. 加载配置 (文件 + `KDATA__` 前缀环境变量)。
/// 3. 实例化基础设施层（Elasticsearch 客户端）。
/// 4. 构造查询门面与 API 状态。
/// 5. 启动 HTTP 服务，直到收到退出信号。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 初始化日志
    let _guard = init_tracing();
    info!("Kdata query service starting...");

    // 2. 加载配置
    let config = load_config(CONFIG_PATH)?;
    info!("Using Elasticsearch at {}", config.elasticsearch.url);

    // 3. 实例化基础设施层
    let backend = Arc::new(ElasticsearchClient::new(&config.elasticsearch)?);

    // 4. 构造查询门面 (注入 Core Trait 抽象)
    let state = AppState {
        kdata_service: Arc::new(KdataService::new(backend)),
    };

    // 5. 启动服务，等待外部退出信号
    let bind_addr = config.server.bind_addr();
    tokio::select! {
        result = start_server(state, &bind_addr) => result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown signal received. Exiting...");
        }
    }

    Ok(())
}

/// # Summary
/// 初始化日志：控制台输出 + 按天滚动的文件输出。
///
/// # Logic
/// 1. 过滤级别取自 `RUST_LOG`，缺省为 `info`。
/// 2. 文件写入通过 non-blocking 后台线程完成，返回的 guard 必须存活到进程结束。
fn init_tracing() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("logs", "kdata.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    guard
}

/// # Summary
/// 加载应用配置。
///
/// # Logic
/// 1. 读取可选的配置文件。
/// 2. 叠加 `KDATA__` 前缀的环境变量，例如 `KDATA__ELASTICSEARCH__URL`。
/// 3. 缺失的字段回落到 `AppConfig::default()`。
fn load_config(path: &str) -> Result<AppConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix("KDATA").separator("__"))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");
        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.elasticsearch.doc_type, "_doc");
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9090\n\n[elasticsearch]\nurl = \"http://es:9200\"\ndoc_type = \"doc\"\n",
        )
        .unwrap();

        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.elasticsearch.url, "http://es:9200");
        assert_eq!(config.elasticsearch.doc_type, "doc");
        assert_eq!(config.elasticsearch.timeout_secs, 10);
    }
}
