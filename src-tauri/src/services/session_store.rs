use std::fs;
use std::path::PathBuf;

use crate::models::{Session, StorageError};

/// 会话存储
///
/// 将登录凭证持久化为配置目录下的单个JSON文件,职责单一:
/// 仅处理会话的保存/读取/清除,不涉及登录流程本身。
///
/// 损坏自愈: 读到无法解析的内容时视为未登录并清掉存储槽位,
/// 解析错误永远不会向上传播成崩溃。
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// 使用默认路径创建存储
    ///
    /// 路径: `<config_dir>/bili-cleaner/session.json`
    ///
    /// # 错误
    /// 返回 `StorageError::NoStorageDir` 如果系统未提供配置目录
    pub fn new() -> Result<Self, StorageError> {
        let dir = dirs::config_dir()
            .ok_or(StorageError::NoStorageDir)?
            .join("bili-cleaner");
        fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join("session.json"),
        })
    }

    /// 使用指定文件路径创建存储 (测试用)
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// 读取持久化的会话
    ///
    /// - 文件不存在: `None`
    /// - 文件无法读取或内容损坏: 清掉槽位后返回 `None`
    pub fn load(&self) -> Option<Session> {
        if !self.path.exists() {
            return None;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "会话文件读取失败,按未登录处理");
                return None;
            }
        };

        match serde_json::from_str::<Session>(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "会话文件内容损坏,清除后按未登录处理"
                );
                if let Err(clear_err) = self.clear() {
                    tracing::warn!(error = %clear_err, "清除损坏的会话文件失败");
                }
                None
            }
        }
    }

    /// 持久化会话
    ///
    /// 先写临时文件再重命名,调用方视角下不会观察到半成品。
    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(session)?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;

        tracing::info!(
            path = %self.path.display(),
            session = %session.summary_for_logging(),
            "会话已持久化"
        );
        Ok(())
    }

    /// 清除持久化的会话
    ///
    /// 登出与损坏自愈共用;文件不存在不算错误。
    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "会话已清除");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// 是否存在可用会话
    ///
    /// 用户ID与会话密钥同时存在即视为已登录;
    /// CSRF令牌的缺失在此处被容忍,由变更类请求单独校验。
    pub fn has_valid_session(&self) -> bool {
        self.load().map(|s| s.is_usable()).unwrap_or(false)
    }
}
