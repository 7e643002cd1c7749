use async_trait::async_trait;
use kdata_core::config::EsConfig;
use kdata_core::kdata::entity::{FieldSet, KdataRecord};
use kdata_core::search::error::SearchError;
use kdata_core::search::port::{SearchBackend, SearchHits, SearchRequest};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, error};

/// 无类型文档的占位类型名 (ES 7+)
const TYPELESS_DOC_TYPE: &str = "_doc";

/// # Summary
/// 基于 Elasticsearch REST 接口的搜索后端实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯，客户端可在多任务间共享。
/// - `base_url` 不以 `/` 结尾。
/// - 支持 Elasticsearch 6.6 及以上版本 (`_source_includes` 参数自 6.6 起可用)。
#[derive(Clone)]
pub struct ElasticsearchClient {
    // 内部使用的 HTTP 客户端
    client: Client,
    // 集群地址
    base_url: String,
    // 文档类型，用于单篇获取的路径
    doc_type: String,
    // 可选的 Basic Auth 凭证
    credentials: Option<(String, Option<String>)>,
}

impl ElasticsearchClient {
    /// # Summary
    /// 按配置创建客户端。
    ///
    /// # Logic
    /// 1. 安装 rustls 的 ring 加密后端 (已安装则忽略)。
    /// 2. 按 `timeout_secs` 配置请求超时并构建 reqwest 客户端。
    /// 3. 规范化集群地址，去掉末尾斜杠。
    ///
    /// # Arguments
    /// * `config`: Elasticsearch 连接配置。
    ///
    /// # Returns
    /// 成功返回客户端，HTTP 客户端构建失败时返回 `SearchError::Unknown`。
    pub fn new(config: &EsConfig) -> Result<Self, SearchError> {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("rustls crypto provider already installed");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchError::Unknown(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            doc_type: config.doc_type.clone(),
            credentials: config
                .username
                .clone()
                .map(|user| (user, config.password.clone())),
        })
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => builder.basic_auth(user, password.as_deref()),
            None => builder,
        }
    }

    /// 单篇 `_source` 获取的 URL。
    ///
    /// 无类型 (`_doc`) 使用 `/{index}/_source/{id}`，ES 8 只接受这种形式；
    /// 自定义类型 (ES 6) 使用 `/{index}/{type}/{id}/_source`。
    fn source_url(&self, index: &str, id: &str) -> String {
        if self.doc_type == TYPELESS_DOC_TYPE {
            format!("{}/{}/_source/{}", self.base_url, index, id)
        } else {
            format!("{}/{}/{}/{}/_source", self.base_url, index, self.doc_type, id)
        }
    }

    /// 搜索接口的 URL。
    fn search_url(&self, index: &str) -> String {
        format!("{}/{}/_search", self.base_url, index)
    }
}

/// # Summary
/// 构造 `_search` 请求体。
///
/// # Logic
/// 1. 写入查询谓词、分页参数与 `track_total_hits`。
/// 2. 排序键渲染为 `[{field: {order}}]`。
/// 3. 投影非空时写入 `_source.includes`。
pub(crate) fn search_body(request: &SearchRequest) -> Value {
    let sort: Vec<Value> = request
        .sort
        .iter()
        .map(|s| {
            let field = s.field.as_str();
            json!({ field: { "order": s.order.as_str() } })
        })
        .collect();

    let mut body = json!({
        "query": request.query,
        "from": request.from,
        "size": request.size,
        "sort": sort,
        "track_total_hits": true,
    });
    if !request.fields.is_empty() {
        body["_source"] = json!({ "includes": request.fields.names() });
    }
    body
}

/// # Summary
/// `_search` 响应顶层结构。
#[derive(Deserialize, Debug)]
struct EsSearchResponse {
    hits: EsHits,
}

/// # Summary
/// 命中列表。
#[derive(Deserialize, Debug)]
struct EsHits {
    total: EsTotal,
    #[serde(default)]
    hits: Vec<EsHit>,
}

/// # Summary
/// 命中总数：ES 6 为数字，ES 7+ 为 `{value, relation}` 对象。
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum EsTotal {
    Count(u64),
    Object { value: u64 },
}

impl EsTotal {
    fn value(&self) -> u64 {
        match self {
            EsTotal::Count(value) | EsTotal::Object { value } => *value,
        }
    }
}

/// # Summary
/// 单条命中。
#[derive(Deserialize, Debug)]
struct EsHit {
    #[serde(rename = "_source", default)]
    source: KdataRecord,
}

pub(crate) fn parse_search_response(bytes: &[u8]) -> Result<SearchHits, SearchError> {
    let response: EsSearchResponse =
        serde_json::from_slice(bytes).map_err(|e| SearchError::Parse(e.to_string()))?;
    Ok(SearchHits {
        total: response.hits.total.value(),
        records: response.hits.hits.into_iter().map(|hit| hit.source).collect(),
    })
}

/// 非成功状态码统一转换为 `SearchError::Status`。
async fn status_error(resp: Response) -> SearchError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    error!("Elasticsearch returned HTTP {}: {}", status, body);
    SearchError::Status { status, body }
}

#[async_trait]
impl SearchBackend for ElasticsearchClient {
    /// # Summary
    /// 通过 `_source` 接口获取单篇文档。
    ///
    /// # Logic
    /// 1. 投影非空时附带 `_source_includes` 参数。
    /// 2. 404 视为文档不存在，返回 `None`。
    /// 3. 其他非成功状态返回 `SearchError::Status`。
    /// 4. 按字段集合裁剪响应，服务端未识别投影参数时结果依然只含请求的字段。
    async fn get_source(
        &self,
        index: &str,
        id: &str,
        fields: &FieldSet,
    ) -> Result<Option<KdataRecord>, SearchError> {
        let mut builder = self.client.get(self.source_url(index, id));
        if !fields.is_empty() {
            builder = builder.query(&[("_source_includes", fields.names().join(","))]);
        }

        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            debug!("Document {}/{} not found", index, id);
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        let record = resp
            .json::<KdataRecord>()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;
        Ok(Some(record.project(fields)))
    }

    /// # Summary
    /// 通过 `POST /{index}/_search` 执行分页搜索。
    ///
    /// # Logic
    /// 1. 构造请求体并发送。
    /// 2. 非成功状态返回 `SearchError::Status`。
    /// 3. 解析命中总数与 `_source` 列表。
    async fn search(&self, request: &SearchRequest) -> Result<SearchHits, SearchError> {
        let builder = self
            .client
            .post(self.search_url(&request.index))
            .json(&search_body(request));

        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;
        parse_search_response(&bytes)
    }
}
