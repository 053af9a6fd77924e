use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API调用相关错误
///
/// 处理与登录/清理服务交互时的各种失败场景。
/// 每个错误都包含足够的上下文信息,帮助调试和恢复。
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum ApiError {
    /// 网络请求失败
    ///
    /// 可能原因:
    /// - 网络连接中断
    /// - 服务器不可达
    /// - DNS解析失败
    #[error("网络请求失败: {0}")]
    NetworkFailed(String),

    /// 响应格式无效
    ///
    /// 服务返回的数据缺少必需字段或结构不符合预期
    #[error("响应格式无效: {0}")]
    InvalidResponse(String),

    /// JSON解析失败
    #[error("响应数据解析失败: {0}")]
    JsonParseFailed(String),

    /// HTTP状态码错误
    ///
    /// 服务返回了非200状态码且无法解析出业务结果
    #[error("HTTP错误 {status}: {message}")]
    HttpStatusError { status: u16, message: String },
}

/// 会话持久化相关错误
///
/// 处理本地会话文件读写时的失败场景
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum StorageError {
    /// 文件读写失败
    #[error("会话文件读写失败: {0}")]
    IoFailed(String),

    /// 序列化/反序列化失败
    ///
    /// 将数据转换为JSON或从JSON解析失败
    #[error("数据序列化失败: {0}")]
    SerializationError(String),

    /// 无法定位存储目录
    ///
    /// 系统未提供配置目录,无法持久化会话
    #[error("无法定位存储目录")]
    NoStorageDir,
}

/// 登录跳转URL解析错误
///
/// 登录成功后服务返回的redirect URL必须携带完整的三项凭证,
/// 任何一项缺失都视为结构性失败,不自动重试。
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum SessionParseError {
    /// URL本身无法解析
    #[error("跳转URL格式无效: {0}")]
    MalformedUrl(String),

    /// 缺少必需的凭证参数
    #[error("跳转URL缺少参数: {0}")]
    MissingParam(&'static str),
}

/// 实现从reqwest::Error到ApiError的转换
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::NetworkFailed("请求超时".to_string())
        } else if err.is_connect() {
            ApiError::NetworkFailed("无法连接到服务器".to_string())
        } else if err.is_decode() {
            ApiError::JsonParseFailed(err.to_string())
        } else {
            ApiError::NetworkFailed(err.to_string())
        }
    }
}

/// 实现从serde_json::Error到相关错误的转换
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::JsonParseFailed(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::IoFailed(err.to_string())
    }
}
