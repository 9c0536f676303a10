/// 查重 API 客户端
///
/// 封装所有与远端查重服务相关的 HTTP 调用逻辑
use crate::config::Config;
use crate::error::CheckError;
use crate::models::check::{CheckHandle, CheckReport, CheckRequest, CheckStatus};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// 远端服务要求的认证请求头
pub const TOKEN_HEADER: &str = "X-API-TOKEN";

/// 远端查重服务的能力
///
/// 每个方法只发一次请求，不做重试；所有失败都转换为 `CheckError`。
#[async_trait]
pub trait PlagiarismApi: Send + Sync {
    /// 提交文本，返回远端分配的文本 ID
    async fn submit(&self, request: &CheckRequest) -> Result<CheckHandle, CheckError>;

    /// 查询一次检测状态
    async fn poll_status(&self, handle: &CheckHandle) -> Result<CheckStatus, CheckError>;

    /// 获取完整报告，只应在状态为 `Checked` 之后调用
    async fn fetch_report(&self, handle: &CheckHandle) -> Result<CheckReport, CheckError>;
}

/// 查重 API 客户端
pub struct PlagiarismClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl PlagiarismClient {
    /// 创建新的查重客户端
    pub fn new(config: &Config) -> Result<Self, CheckError> {
        Self::with_base_url(
            &config.plagiarism_api_base_url,
            &config.plagiarism_api_token,
            config.request_timeout(),
        )
    }

    /// 使用自定义服务地址创建
    pub fn with_base_url(
        base_url: impl AsRef<str>,
        token: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, CheckError> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/text/{id}`，文本 ID 作为单独的路径段编码
    fn text_url(&self, handle: &CheckHandle) -> Result<reqwest::Url, CheckError> {
        let endpoint = format!("GET /text/{}", handle);
        // 路径段编码会丢弃 "." 和 ".."
        if matches!(handle.as_str(), "" | "." | "..") {
            return Err(CheckError::remote(endpoint, None, "text_id 不合法"));
        }
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| CheckError::remote(&endpoint, None, format!("服务地址不合法: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| CheckError::remote(&endpoint, None, "服务地址不能作为路径前缀"))?
            .pop_if_empty()
            .push("text")
            .push(handle.as_str());

        Ok(url)
    }

    /// GET /text/{id}，状态和报告共用这一个接口
    async fn get_text(&self, handle: &CheckHandle) -> Result<Value, CheckError> {
        let endpoint = format!("GET /text/{}", handle);
        let url = self.text_url(handle)?;

        let response = self
            .http
            .get(url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| {
                warn!("查重服务请求失败 ({}): {}", endpoint, e);
                CheckError::remote(&endpoint, None, e.to_string())
            })?;

        read_json(&endpoint, response).await
    }
}

#[async_trait]
impl PlagiarismApi for PlagiarismClient {
    async fn submit(&self, request: &CheckRequest) -> Result<CheckHandle, CheckError> {
        let endpoint = "POST /text";
        let url = format!("{}/text", self.base_url);

        debug!(
            "提交查重文本, 语言: {}, 长度: {} 字符",
            request.language(),
            request.text().chars().count()
        );

        let response = self
            .http
            .post(&url)
            .header(TOKEN_HEADER, &self.token)
            .form(&[("language", request.language()), ("text", request.text())])
            .send()
            .await
            .map_err(|e| {
                warn!("查重服务请求失败 ({}): {}", endpoint, e);
                CheckError::remote(endpoint, None, e.to_string())
            })?;

        let body = read_json(endpoint, response).await?;

        if body.get("success").and_then(|v| v.as_bool()) != Some(true) {
            return Err(CheckError::remote(
                endpoint,
                None,
                "Failed to submit text for checking",
            ));
        }

        let handle = body
            .pointer("/data/text/id")
            .and_then(CheckHandle::from_json)
            .ok_or_else(|| CheckError::remote(endpoint, None, "响应缺少 data.text.id"))?;

        debug!("文本已提交, text_id: {}", handle);

        Ok(handle)
    }

    async fn poll_status(&self, handle: &CheckHandle) -> Result<CheckStatus, CheckError> {
        let body = self.get_text(handle).await?;

        let endpoint = format!("GET /text/{}", handle);
        let data = match body.get("data") {
            Some(data) if data.is_object() => data,
            _ => return Err(CheckError::remote(endpoint, None, "响应缺少 data")),
        };
        // state 存在但无法识别时按 Unknown 处理，继续轮询
        let state = data
            .get("state")
            .ok_or_else(|| CheckError::remote(&endpoint, None, "响应缺少 data.state"))?;

        let status = CheckStatus::from_state(state);
        debug!("text_id {} 状态: {} ({})", handle, status, state);

        Ok(status)
    }

    async fn fetch_report(&self, handle: &CheckHandle) -> Result<CheckReport, CheckError> {
        let body = self.get_text(handle).await?;

        match body.get("data") {
            Some(data) if !data.is_null() => Ok(CheckReport::new(handle.clone(), data.clone())),
            _ => Err(CheckError::remote(
                format!("GET /text/{}", handle),
                None,
                "响应缺少 data",
            )),
        }
    }
}

/// 检查状态码并解析 JSON 响应体
async fn read_json(endpoint: &str, response: reqwest::Response) -> Result<Value, CheckError> {
    let status = response.status();

    if !status.is_success() {
        warn!("查重服务返回错误状态 ({}): {}", endpoint, status);
        return Err(CheckError::remote(
            endpoint,
            Some(status.as_u16()),
            format!("API request failed with status {}", status.as_u16()),
        ));
    }

    response.json::<Value>().await.map_err(|e| {
        CheckError::remote(
            endpoint,
            Some(status.as_u16()),
            format!("响应不是合法 JSON: {}", e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const TOKEN: &str = "test-token";

    fn build_client(url: String) -> PlagiarismClient {
        PlagiarismClient::with_base_url(url, TOKEN, Duration::from_secs(5)).unwrap()
    }

    fn long_request() -> CheckRequest {
        CheckRequest::new(
            "A text of at least eighty characters, long enough for the remote plagiarism checker.",
            "en",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_submit_returns_handle_from_payload() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/text")
            .match_header(TOKEN_HEADER, TOKEN)
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("language".into(), "en".into()),
                Matcher::Regex("text=A\\+text".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"success": true, "data": {"text": {"id": 4242}}}).to_string())
            .create_async()
            .await;

        let client = build_client(server.url());
        let handle = client.submit(&long_request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(handle, CheckHandle::new("4242"));
    }

    #[tokio::test]
    async fn test_submit_non_success_status_is_remote_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/text")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let client = build_client(server.url());
        let err = client.submit(&long_request()).await.unwrap_err();

        assert!(matches!(err, CheckError::Remote { status: Some(401), .. }));
    }

    #[tokio::test]
    async fn test_submit_rejected_by_service() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/text")
            .with_status(200)
            .with_body(json!({"success": false, "message": "quota exceeded"}).to_string())
            .create_async()
            .await;

        let client = build_client(server.url());
        let err = client.submit(&long_request()).await.unwrap_err();

        assert!(matches!(err, CheckError::Remote { status: None, .. }));
    }

    #[tokio::test]
    async fn test_poll_status_maps_state_codes() {
        let mut server = Server::new_async().await;
        let _checked = server
            .mock("GET", "/text/1")
            .match_header(TOKEN_HEADER, TOKEN)
            .with_status(200)
            .with_body(json!({"success": true, "data": {"state": 5}}).to_string())
            .create_async()
            .await;
        let _unknown = server
            .mock("GET", "/text/2")
            .with_status(200)
            .with_body(json!({"success": true, "data": {"state": 17}}).to_string())
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/text/3")
            .with_status(200)
            .with_body(json!({"success": true, "data": {}}).to_string())
            .create_async()
            .await;
        let _processing = server
            .mock("GET", "/text/4")
            .with_status(200)
            .with_body(json!({"success": true, "data": {"state": "processing"}}).to_string())
            .create_async()
            .await;
        let _null_state = server
            .mock("GET", "/text/5")
            .with_status(200)
            .with_body(json!({"success": true, "data": {"state": null}}).to_string())
            .create_async()
            .await;
        let _no_data = server
            .mock("GET", "/text/6")
            .with_status(200)
            .with_body(json!({"success": false}).to_string())
            .create_async()
            .await;

        let client = build_client(server.url());

        assert_eq!(
            client.poll_status(&CheckHandle::new("1")).await.unwrap(),
            CheckStatus::Checked
        );
        assert_eq!(
            client.poll_status(&CheckHandle::new("2")).await.unwrap(),
            CheckStatus::Unknown(Some(17))
        );
        assert!(matches!(
            client.poll_status(&CheckHandle::new("3")).await,
            Err(CheckError::Remote { .. })
        ));
        assert_eq!(
            client.poll_status(&CheckHandle::new("4")).await.unwrap(),
            CheckStatus::Unknown(None)
        );
        assert_eq!(
            client.poll_status(&CheckHandle::new("5")).await.unwrap(),
            CheckStatus::Unknown(None)
        );
        assert!(matches!(
            client.poll_status(&CheckHandle::new("6")).await,
            Err(CheckError::Remote { .. })
        ));
    }

    #[tokio::test]
    async fn test_unrecognised_state_polls_until_timeout() {
        let mut server = Server::new_async().await;
        let status = server
            .mock("GET", "/text/7")
            .with_status(200)
            .with_body(json!({"success": true, "data": {"state": "processing"}}).to_string())
            .expect_at_least(2)
            .create_async()
            .await;
        let _submit = server
            .mock("POST", "/text")
            .with_status(200)
            .with_body(json!({"success": true, "data": {"text": {"id": 7}}}).to_string())
            .create_async()
            .await;

        let checker = crate::services::PlagiarismChecker::with_timings(
            build_client(server.url()),
            Duration::from_millis(50),
            Duration::from_millis(200),
        );
        let err = checker
            .check_complete(long_request().text(), "en", Duration::from_millis(200))
            .await
            .unwrap_err();

        assert!(matches!(err, CheckError::Timeout { .. }), "实际: {:?}", err);
        status.assert_async().await;
    }

    #[tokio::test]
    async fn test_text_id_is_encoded_as_one_segment() {
        let mut server = Server::new_async().await;
        let encoded = server
            .mock("GET", "/text/..%2Fadmin%3Fx=1")
            .with_status(200)
            .with_body(json!({"success": true, "data": {"state": 3}}).to_string())
            .expect(1)
            .create_async()
            .await;
        let escaped = server.mock("GET", "/admin").expect(0).create_async().await;

        let client = build_client(server.url());
        let status = client
            .poll_status(&CheckHandle::new("../admin?x=1"))
            .await
            .unwrap();

        assert_eq!(status, CheckStatus::Submitted);
        encoded.assert_async().await;
        escaped.assert_async().await;

        assert!(matches!(
            client.poll_status(&CheckHandle::new("..")).await,
            Err(CheckError::Remote { status: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_poll_status_server_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/text/9")
            .with_status(503)
            .create_async()
            .await;

        let client = build_client(server.url());
        let err = client.poll_status(&CheckHandle::new("9")).await.unwrap_err();

        assert_eq!(err.status_code(), Some(503));
    }

    #[tokio::test]
    async fn test_transport_failure_is_remote_error() {
        // 没有服务监听的端口
        let client = build_client("http://127.0.0.1:9".to_string());
        let err = client.poll_status(&CheckHandle::new("1")).await.unwrap_err();

        assert!(matches!(err, CheckError::Remote { status: None, .. }));
    }

    #[tokio::test]
    async fn test_fetch_report_returns_data() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/text/55")
            .with_status(200)
            .with_body(
                json!({"success": true, "data": {"state": 5, "percent": "18.4", "words": 120}})
                    .to_string(),
            )
            .create_async()
            .await;

        let client = build_client(format!("{}/", server.url()));
        let report = client.fetch_report(&CheckHandle::new("55")).await.unwrap();

        assert_eq!(report.text_id, CheckHandle::new("55"));
        assert_eq!(report.percent(), 18.4);
        assert_eq!(report.data["words"], 120);
    }
}
