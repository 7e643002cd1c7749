use kdata_api::server::{AppState, build_router};
use kdata_api::types::{ApiErrorResponse, ApiResponse, KdataResponse};
use kdata_core::kdata::entity::KdataRecord;
use kdata_core::test_utils::MemorySearchBackend;
use kdata_query::service::KdataService;
use reqwest::StatusCode;
use std::sync::Arc;
use tokio::net::TcpListener;

const DAY_INDEX: &str = "stock_china_day_kdata";

fn record(day: &str, close: f64, factor: f64) -> KdataRecord {
    KdataRecord {
        timestamp: Some(day.to_string()),
        security_id: Some("stock_sz_300027".to_string()),
        code: Some("300027".to_string()),
        open: Some(close),
        close: Some(close),
        high: Some(close),
        low: Some(close),
        factor: Some(factor),
        ..Default::default()
    }
}

// 帮助函数：在随机端口启动测试服务器
async fn spawn_test_server() -> (String, Arc<MemorySearchBackend>) {
    let backend = Arc::new(MemorySearchBackend::new());
    for (day, close, factor) in [
        ("2017-09-04", 10.0, 1.0),
        ("2017-09-05", 12.0, 2.0),
        ("2017-09-06", 8.0, 4.0),
    ] {
        backend.insert(
            DAY_INDEX,
            &format!("stock_sz_300027_{}", day),
            record(day, close, factor),
        );
    }

    let state = AppState {
        kdata_service: Arc::new(KdataService::new(backend.clone())),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let addr = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });

    (addr, backend)
}

fn http_client() -> reqwest::Client {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        // 已由其他测试安装
    }
    reqwest::Client::new()
}

#[tokio::test]
async fn test_kdata_api_workflow() {
    let _ = tracing_subscriber::fmt().with_env_filter("debug").try_init();

    let (base_url, backend) = spawn_test_server().await;
    let client = http_client();

    // ============================================
    // Case 1: 单日查询
    // ============================================
    let res = client
        .get(format!("{}/api/v1/kdata/300027?date=2017-09-05", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: ApiResponse<KdataResponse> = res.json().await.unwrap();
    assert!(body.success);
    let data = body.data.unwrap();
    assert_eq!(data.total, None);
    assert_eq!(data.records.len(), 1);
    assert_eq!(data.records[0].close, Some(12.0));

    // ============================================
    // Case 2: 区间查询 + 前复权 + 分页
    // ============================================
    let res = client
        .get(format!(
            "{}/api/v1/kdata/300027?start=2017-09-01&end=2017-09-30&fuquan=qfq&fields=timestamp,close&size=2",
            base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let data = res.json::<ApiResponse<KdataResponse>>().await.unwrap().data.unwrap();
    assert_eq!(data.total, Some(3));
    assert_eq!(data.records.len(), 2);
    // 最新因子为 4.0
    assert_eq!(data.records[0].close, Some(10.0 * 1.0 / 4.0));
    assert_eq!(data.records[1].close, Some(12.0 * 2.0 / 4.0));
    assert!(data.records[0].open.is_none());
    assert_eq!(data.records[0].factor, Some(1.0));

    // ============================================
    // Case 3: 空字段列表不发起查询
    // ============================================
    let before = backend.calls().await.len();
    let res = client
        .get(format!("{}/api/v1/kdata/300027?date=2017-09-05&fields=", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let data = res.json::<ApiResponse<KdataResponse>>().await.unwrap().data.unwrap();
    assert!(data.records.is_empty());
    assert_eq!(backend.calls().await.len(), before);

    // ============================================
    // Case 4: 非法参数
    // ============================================
    for query in [
        "date=2017-09-05&fuquan=xfq",
        "date=2017-13-01",
        "date=2017-09-05&fields=close,bogus",
        "date=2017-09-05&level=2",
        "start=2017-09-01&end=2017-09-30&size=100000",
        "start=2017-09-01&end=2017-09-30&from=9995&size=10",
    ] {
        let res = client
            .get(format!("{}/api/v1/kdata/300027?{}", base_url, query))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "query: {}", query);
        let err: ApiErrorResponse = res.json().await.unwrap();
        assert!(!err.success);
    }

    let res = client
        .get(format!("{}/api/v1/kdata/AAPL?date=2017-09-05", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // ============================================
    // Case 5: 后端故障返回 500，且不透传细节
    // ============================================
    backend.set_failing(true);
    let res = client
        .get(format!("{}/api/v1/kdata/300027?date=2017-09-05", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let err: ApiErrorResponse = res.json().await.unwrap();
    assert_eq!(err.error, "服务器内部错误");
}

#[tokio::test]
async fn test_openapi_document_lists_kdata_route() {
    let (base_url, _backend) = spawn_test_server().await;
    let client = http_client();

    let res = client
        .get(format!("{}/api-docs/openapi.json", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let doc: serde_json::Value = res.json().await.unwrap();
    assert!(doc["paths"]["/api/v1/kdata/{security}"]["get"].is_object());
}
