use tauri::State;

use crate::models::LogEntry;
use crate::state::AppState;

/// 读取活动日志命令
///
/// 返回全量快照,按时间先后排列。前端按需轮询刷新。
#[tauri::command]
pub async fn list_activity(state: State<'_, AppState>) -> Result<Vec<LogEntry>, String> {
    Ok(state.activity_log.entries())
}

/// 清空活动日志命令
///
/// 清空后重新放入占位提示,日志面板不会出现空白。
#[tauri::command]
pub async fn clear_activity(state: State<'_, AppState>) -> Result<(), String> {
    tracing::info!("clear_activity command called");
    state.activity_log.clear();
    Ok(())
}
