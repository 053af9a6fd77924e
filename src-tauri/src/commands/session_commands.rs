use serde::{Deserialize, Serialize};
use tauri::State;

use crate::services::{ConfigService, Preferences};
use crate::state::AppState;

/// 会话摘要
///
/// 只携带展示所需的用户标识,SESSDATA与CSRF令牌绝不跨越IPC边界。
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub mid: String,
}

/// 查询是否存在可用会话命令
///
/// 应用启动时前端用它决定初始界面(登录页或控制台)。
#[tauri::command]
pub async fn has_valid_session(state: State<'_, AppState>) -> Result<bool, String> {
    Ok(state.session_store.has_valid_session())
}

/// 查询当前会话摘要命令
///
/// 无可用会话时返回 `None`,不算错误。
#[tauri::command]
pub async fn current_session(state: State<'_, AppState>) -> Result<Option<SessionSummary>, String> {
    let summary = state
        .session_store
        .load()
        .filter(|session| session.is_usable())
        .map(|session| SessionSummary { mid: session.mid });
    Ok(summary)
}

/// 读取界面偏好命令
///
/// 文件缺失或损坏时回退默认值,前端总能拿到可用的偏好。
#[tauri::command]
pub async fn get_preferences() -> Result<Preferences, String> {
    Ok(ConfigService::load_preferences())
}

/// 保存界面偏好命令
#[tauri::command]
pub async fn set_preferences(preferences: Preferences) -> Result<(), String> {
    tracing::info!(theme = %preferences.theme, "set_preferences command called");
    ConfigService::save_preferences(&preferences)
        .map_err(|e| format!("Failed to save preferences: {}", e))
}
