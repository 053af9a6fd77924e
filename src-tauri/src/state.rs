use std::sync::Arc;

use crate::models::ActivityLog;
use crate::services::{
    BiliApiClient, ProgressReporter, QrLoginController, SessionStore, TaskRunner,
};

/// 应用全局状态
///
/// 每个字段代表应用核心能力的单一来源:
/// - api: 唯一的登录/清理服务通信渠道
/// - session_store: 唯一的凭证持久化入口
/// - activity_log: 两个控制器共用的活动记录
/// - login: 扫码登录生命周期管理
/// - runner: 清理任务的互斥执行者
/// - progress: 装饰性进度反馈
pub struct AppState {
    pub api: Arc<BiliApiClient>,
    pub session_store: Arc<SessionStore>,
    pub activity_log: Arc<ActivityLog>,
    pub login: Arc<QrLoginController>,
    pub runner: Arc<TaskRunner<BiliApiClient>>,
    pub progress: Arc<ProgressReporter>,
}

impl AppState {
    /// 初始化应用状态
    ///
    /// # 错误处理
    /// 存储目录不可用时整个应用无法启动 —— 不完整的状态等同于无用。
    pub fn new(api_base_url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let api = Arc::new(BiliApiClient::new(api_base_url));
        let session_store = Arc::new(SessionStore::new()?);
        let activity_log = Arc::new(ActivityLog::new());
        let progress = Arc::new(ProgressReporter::new());

        let login = Arc::new(QrLoginController::new(
            Arc::clone(&api),
            Arc::clone(&session_store),
            Arc::clone(&activity_log),
        ));
        let runner = Arc::new(TaskRunner::new(
            Arc::clone(&api),
            Arc::clone(&session_store),
            Arc::clone(&activity_log),
            Arc::clone(&progress),
        ));

        tracing::info!(api_base = %api_base_url, "AppState initialized");

        Ok(Self {
            api,
            session_store,
            activity_log,
            login,
            runner,
            progress,
        })
    }
}
