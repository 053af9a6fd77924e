use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::models::StorageError;

/// API服务地址的环境变量名
const API_BASE_ENV: &str = "BILI_CLEANER_API_BASE";
/// 默认API服务地址
const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// 界面偏好 (独立于会话的单条记录,核心不消费,仅代UI持久化)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// 主题: "light" 或 "dark"
    pub theme: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
        }
    }
}

/// 配置服务
///
/// 管理应用配置,职责单一:
/// - 从环境(.env)读取API服务地址
/// - 持久化界面偏好到配置目录
pub struct ConfigService;

impl ConfigService {
    /// 读取API服务地址
    ///
    /// 读取顺序: 进程环境变量 -> .env 文件 -> 默认值。
    pub fn api_base_url() -> String {
        // .env不存在不算错误,静默回退
        let _ = dotenvy::dotenv();

        match std::env::var(API_BASE_ENV) {
            Ok(value) if !value.is_empty() => {
                tracing::info!(api_base = %value, "使用环境配置的API地址");
                value.trim_end_matches('/').to_string()
            }
            _ => {
                tracing::info!(api_base = %DEFAULT_API_BASE, "使用默认API地址");
                DEFAULT_API_BASE.to_string()
            }
        }
    }

    /// 偏好文件路径: `<config_dir>/bili-cleaner/preferences.json`
    fn preferences_path() -> Result<PathBuf, StorageError> {
        let dir = dirs::config_dir()
            .ok_or(StorageError::NoStorageDir)?
            .join("bili-cleaner");
        fs::create_dir_all(&dir)?;
        Ok(dir.join("preferences.json"))
    }

    /// 读取界面偏好
    ///
    /// 文件不存在或内容损坏都回退到默认值,不向上传播错误。
    pub fn load_preferences() -> Preferences {
        let path = match Self::preferences_path() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, "无法定位偏好文件,使用默认偏好");
                return Preferences::default();
            }
        };

        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "偏好文件损坏,使用默认偏好");
                Preferences::default()
            }),
            Err(_) => Preferences::default(),
        }
    }

    /// 保存界面偏好
    pub fn save_preferences(preferences: &Preferences) -> Result<(), StorageError> {
        let path = Self::preferences_path()?;
        let content = serde_json::to_string_pretty(preferences)?;
        fs::write(&path, content)?;

        tracing::info!(theme = %preferences.theme, "界面偏好已保存");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preferences() {
        let preferences = Preferences::default();
        assert_eq!(preferences.theme, "light");
    }

    #[test]
    fn test_preferences_round_trip_json() {
        let preferences = Preferences {
            theme: "dark".to_string(),
        };
        let json = serde_json::to_string(&preferences).unwrap();
        let back: Preferences = serde_json::from_str(&json).unwrap();
        assert_eq!(back.theme, "dark");
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        // 直接验证规整逻辑,不污染全局环境
        let value = "http://localhost:8000/";
        assert_eq!(value.trim_end_matches('/'), "http://localhost:8000");
    }
}
