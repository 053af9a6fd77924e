//! Tauri命令模块
//!
//! 前端通过 `invoke` 调用的全部入口:
//! - `login_commands`: 扫码登录 (发起、查询状态、登出)
//! - `cleanup_commands`: 清理任务 (两步确认协议、忙闲与进度查询)
//! - `session_commands`: 会话摘要与界面偏好
//! - `log_commands`: 活动日志读取与清空
//!
//! 命令层只做参数传递与错误到字符串的转换,业务逻辑全部在服务层。

pub mod cleanup_commands;
pub mod log_commands;
pub mod login_commands;
pub mod session_commands;

pub use cleanup_commands::{
    cleanup_busy, confirm_cleanup, decline_cleanup, progress_state, request_cleanup,
};
pub use log_commands::{clear_activity, list_activity};
pub use login_commands::{login_state, logout, start_login};
pub use session_commands::{current_session, get_preferences, has_valid_session, set_preferences};
