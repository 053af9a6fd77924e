//! 数据模型模块
//!
//! 包含所有核心数据结构:
//! - errors: 错误类型定义 (API、存储、URL解析错误)
//! - session: 登录会话凭证 (mid / sessdata / bili_jct)
//! - login_flow: 扫码登录状态机 (轮询tick的纯状态转换)
//! - cleanup_task: 清理任务枚举与结果形态
//! - activity_log: 追加式活动日志 (前端展示用)

pub mod activity_log;
pub mod cleanup_task;
pub mod errors;
pub mod login_flow;
pub mod session;

// 重导出常用类型,简化外部引用
pub use activity_log::{ActivityLog, LogEntry, LogSeverity};
pub use cleanup_task::{CleanupCounts, CleanupOutcome, CleanupTask};
pub use errors::{ApiError, SessionParseError, StorageError};
pub use login_flow::{
    LoginFlow, LoginState, PollResult, PollStep, POLL_CODE_EXPIRED, POLL_CODE_SCANNED,
    POLL_CODE_SUCCESS, POLL_INTERVAL_SECS,
};
pub use session::Session;
