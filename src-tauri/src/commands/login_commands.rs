use serde::{Deserialize, Serialize};
use tauri::State;

use crate::models::LoginState;
use crate::state::AppState;

/// 发起登录响应
///
/// 每个字段都对应前端的必要展示:
/// - qrcode_key: 本次登录尝试的标识
/// - image: base64 PNG,直接用于 `<img>` 标签
/// - state: 发起后的状态快照
#[derive(Debug, Serialize, Deserialize)]
pub struct StartLoginResponse {
    pub qrcode_key: String,
    pub image: String,
    pub state: LoginState,
}

/// 发起(或重新发起)扫码登录命令
///
/// 总是先取消旧的轮询再签发新码。
///
/// # 错误处理哲学
/// 将所有技术性错误转换为用户可理解的字符串,
/// 前端只需展示,无需解析复杂的错误类型。
#[tauri::command]
pub async fn start_login(state: State<'_, AppState>) -> Result<StartLoginResponse, String> {
    tracing::info!("start_login command called");

    let issue = state
        .login
        .start_login()
        .await
        .map_err(|e| format!("Failed to start login: {}", e))?;

    Ok(StartLoginResponse {
        qrcode_key: issue.qrcode_key,
        image: issue.image,
        state: state.login.state(),
    })
}

/// 查询登录状态命令
///
/// 前端按需轮询该命令驱动界面刷新;登录状态机本身由
/// 后台轮询任务推进,这里只读快照。
#[tauri::command]
pub async fn login_state(state: State<'_, AppState>) -> Result<LoginState, String> {
    Ok(state.login.state())
}

/// 登出命令
///
/// 取消登录轮询并清除持久化会话;不会中止正在执行的清理请求。
#[tauri::command]
pub async fn logout(state: State<'_, AppState>) -> Result<(), String> {
    tracing::info!("logout command called");
    state.login.logout().await;
    Ok(())
}
