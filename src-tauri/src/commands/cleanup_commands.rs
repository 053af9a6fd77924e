use serde::{Deserialize, Serialize};
use tauri::State;

use crate::models::CleanupTask;
use crate::services::ProgressState;
use crate::state::AppState;

/// 请求确认响应
///
/// - message: 该任务的固定确认文案;执行器忙碌时为 `None`,
///   前端应据此禁用触发按钮(执行器自身仍独立兜底)。
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfirmationResponse {
    pub message: Option<String>,
}

/// 请求清理确认命令 (两步协议的第一步)
///
/// 不发出任何网络请求,只暂存任务并返回确认文案。
#[tauri::command]
pub async fn request_cleanup(
    task: CleanupTask,
    state: State<'_, AppState>,
) -> Result<ConfirmationResponse, String> {
    tracing::info!(task = %task, "request_cleanup command called");

    let message = state
        .runner
        .request_confirmation(task)
        .map(|m| m.to_string());
    Ok(ConfirmationResponse { message })
}

/// 确认执行命令 (两步协议的第二步)
///
/// 执行暂存的任务;没有待确认任务时是无操作。
/// 结果通过活动日志与进度通道反馈,命令本身不携带结果。
#[tauri::command]
pub async fn confirm_cleanup(state: State<'_, AppState>) -> Result<(), String> {
    tracing::info!("confirm_cleanup command called");
    state.runner.confirm().await;
    Ok(())
}

/// 放弃执行命令
///
/// 静默无操作: 不发请求、不写日志、不改变任何状态。
#[tauri::command]
pub async fn decline_cleanup(state: State<'_, AppState>) -> Result<(), String> {
    state.runner.decline();
    Ok(())
}

/// 查询执行器忙闲命令
#[tauri::command]
pub async fn cleanup_busy(state: State<'_, AppState>) -> Result<bool, String> {
    Ok(state.runner.is_busy())
}

/// 查询进度快照命令
///
/// 纯装饰性数值,前端轮询刷新进度条。
#[tauri::command]
pub async fn progress_state(state: State<'_, AppState>) -> Result<ProgressState, String> {
    Ok(state.progress.current())
}
