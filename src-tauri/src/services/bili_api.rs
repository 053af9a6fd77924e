use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::models::{ApiError, CleanupOutcome, CleanupTask, PollResult, Session};

/// 二维码签发结果
///
/// - qrcode_key: 标识本次登录尝试的不透明令牌
/// - image: base64编码的PNG,直接用于前端 `<img>` 标签
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrCodeIssue {
    pub qrcode_key: String,
    pub image: String,
}

/// 签发接口的原始回复 (字段缺失在此处显式校验)
#[derive(Debug, Deserialize)]
struct QrCodeIssueRaw {
    qrcode_key: Option<String>,
    image: Option<String>,
}

/// 轮询接口的信封: `data` 缺失表示本次tick应被忽略
#[derive(Debug, Deserialize)]
struct PollEnvelope {
    #[serde(default)]
    data: Option<PollResult>,
}

/// 清理执行端口
///
/// 任务执行器通过该接口发出清理请求,测试用桩实现替换真实客户端。
pub trait CleanupApi: Send + Sync + 'static {
    fn run_cleanup(
        &self,
        task: CleanupTask,
        session: &Session,
    ) -> impl Future<Output = Result<CleanupOutcome, ApiError>> + Send;
}

/// 登录与清理服务客户端
///
/// 职责:
/// - 签发扫码登录码
/// - 轮询登录码状态
/// - 发出批量清理请求 (凭证走请求头,不进请求体)
///
/// 出站请求不设置超时,也没有取消令牌 —— 取消语义由调用方的
/// 轮询循环与busy标志承担。
pub struct BiliApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl BiliApiClient {
    /// 创建新的客户端
    ///
    /// # 参数
    /// - `base_url`: 服务地址,如 `http://127.0.0.1:8000`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        tracing::info!(base_url = %base_url, "Bili API client initialized");

        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// 签发登录二维码
    ///
    /// `GET {base}/login/code`
    ///
    /// # 错误
    /// - `ApiError::NetworkFailed`: 请求失败
    /// - `ApiError::InvalidResponse`: 回复缺少 qrcode_key 或 image
    ///
    /// 任一错误都由调用方转入 IssueFailed 终态。
    pub async fn issue_qrcode(&self) -> Result<QrCodeIssue, ApiError> {
        let url = format!("{}/login/code", self.base_url);
        tracing::debug!(url = %url, "Requesting login QR code");

        let raw: QrCodeIssueRaw = self.http.get(&url).send().await?.json().await?;

        match (raw.qrcode_key, raw.image) {
            (Some(qrcode_key), Some(image)) if !qrcode_key.is_empty() => {
                tracing::info!(qrcode_key = %qrcode_key, "QR code issued");
                Ok(QrCodeIssue { qrcode_key, image })
            }
            _ => Err(ApiError::InvalidResponse(
                "签发回复缺少 qrcode_key 或 image".to_string(),
            )),
        }
    }

    /// 轮询登录码状态
    ///
    /// `GET {base}/login/code/poll/{qrcode_key}`
    ///
    /// # 返回值
    /// - `Ok(Some(result))`: 本次tick有效
    /// - `Ok(None)`: 信封中没有 `data`,该tick直接忽略
    ///
    /// 传输层错误原样上抛,由轮询循环记录并吞掉 —— 这是针对
    /// 瞬时网络抖动的尽力重试策略,下一个tick照常发起。
    pub async fn poll_qrcode(&self, qrcode_key: &str) -> Result<Option<PollResult>, ApiError> {
        let url = format!("{}/login/code/poll/{}", self.base_url, qrcode_key);
        tracing::trace!(url = %url, "Polling QR code status");

        let envelope: PollEnvelope = self.http.get(&url).send().await?.json().await?;
        Ok(envelope.data)
    }

    /// 执行一次清理任务
    ///
    /// `POST {base}/cleanup/{task}`
    /// - 请求头: `SESSDATA`、`bili_jct` (凭证只走元数据)
    /// - 请求体: `{ "mid": <整数> }`,history任务无请求体
    ///
    /// # 错误语义
    /// 非2xx状态与 `success:false` 同属"服务端报告的失败",
    /// 折叠进返回的 `CleanupOutcome`;只有传输层异常与完全
    /// 无法解码的成功回复才成为 `Err`,两条路径在日志中可区分。
    pub async fn run_cleanup(
        &self,
        task: CleanupTask,
        session: &Session,
    ) -> Result<CleanupOutcome, ApiError> {
        let url = format!("{}/cleanup/{}", self.base_url, task.endpoint());
        tracing::debug!(url = %url, task = %task, "Dispatching cleanup request");

        let mut request = self
            .http
            .post(&url)
            .header("SESSDATA", &session.sessdata)
            .header("bili_jct", &session.csrf_token);

        if task.requires_body() {
            let mid = session.mid_as_int().ok_or_else(|| {
                ApiError::InvalidResponse(format!("mid 不是有效的数字: {}", session.mid))
            })?;
            request = request.json(&serde_json::json!({ "mid": mid }));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<CleanupOutcome>(&body) {
            Ok(mut outcome) => {
                // 传输状态非2xx时,无论success字段怎么说都按失败处理
                if !status.is_success() {
                    outcome.success = false;
                    if outcome.error.is_none() && outcome.message.is_none() {
                        outcome.error = Some(format!("HTTP {}", status.as_u16()));
                    }
                }
                Ok(outcome)
            }
            Err(e) if !status.is_success() => {
                tracing::warn!(
                    task = %task,
                    status = %status.as_u16(),
                    error = %e,
                    "Cleanup reply not decodable, folding HTTP status into outcome"
                );
                Ok(CleanupOutcome {
                    success: false,
                    error: Some(format!("HTTP {}", status.as_u16())),
                    ..CleanupOutcome::default()
                })
            }
            Err(e) => Err(ApiError::JsonParseFailed(e.to_string())),
        }
    }
}

impl CleanupApi for BiliApiClient {
    fn run_cleanup(
        &self,
        task: CleanupTask,
        session: &Session,
    ) -> impl Future<Output = Result<CleanupOutcome, ApiError>> + Send {
        BiliApiClient::run_cleanup(self, task, session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = BiliApiClient::new("http://127.0.0.1:8000");
        assert_eq!(client.base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn test_poll_envelope_without_data_is_ignored() {
        let envelope: PollEnvelope = serde_json::from_str(r#"{}"#).unwrap();
        assert!(envelope.data.is_none());

        let envelope: PollEnvelope =
            serde_json::from_str(r#"{"data":{"code":86101}}"#).unwrap();
        assert_eq!(envelope.data.unwrap().code, 86101);
    }

    #[test]
    fn test_issue_raw_missing_fields() {
        let raw: QrCodeIssueRaw = serde_json::from_str(r#"{"qrcode_key":"k"}"#).unwrap();
        assert!(raw.image.is_none());
    }
}
