//! 清理任务执行器
//!
//! 职责: 同一时间只执行一个清理任务,并在任何网络请求发出之前
//! 拿到用户的肯定确认。busy标志是唯一的互斥原语: UI理应禁用
//! 触发按钮,但执行器独立兜底。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::models::{ActivityLog, CleanupTask, LogSeverity};
use crate::services::bili_api::CleanupApi;
use crate::services::progress_reporter::ProgressReporter;
use crate::services::session_store::SessionStore;

/// 清理任务执行器
///
/// 确认协议分两步: `request_confirmation` 给出固定文案并暂存任务,
/// `confirm` 真正执行,`decline` 静默放弃 —— 在不阻塞的前提下
/// 保留"未经肯定确认绝不发请求"的契约。
pub struct TaskRunner<C: CleanupApi> {
    api: Arc<C>,
    store: Arc<SessionStore>,
    log: Arc<ActivityLog>,
    progress: Arc<ProgressReporter>,

    /// 互斥原语: 在第一个挂起点之前置位,仅在保证清理的路径上复位
    busy: AtomicBool,

    /// 待确认的任务 (一次最多一个)
    pending: Mutex<Option<CleanupTask>>,
}

impl<C: CleanupApi> TaskRunner<C> {
    pub fn new(
        api: Arc<C>,
        store: Arc<SessionStore>,
        log: Arc<ActivityLog>,
        progress: Arc<ProgressReporter>,
    ) -> Self {
        Self {
            api,
            store,
            log,
            progress,
            busy: AtomicBool::new(false),
            pending: Mutex::new(None),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// 第一步: 请求确认
    ///
    /// 返回该任务的固定确认文案;执行器忙碌时返回 `None`,
    /// 不产生任何副作用(也不写活动日志)。
    pub fn request_confirmation(&self, task: CleanupTask) -> Option<&'static str> {
        if self.is_busy() {
            tracing::warn!(task = %task, "已有任务在执行,确认请求被拒绝");
            return None;
        }
        *self.pending.lock().expect("pending task poisoned") = Some(task);
        Some(task.confirm_message())
    }

    /// 第二步之一: 放弃
    ///
    /// 静默无操作: 不发请求、不置busy、不写日志。
    pub fn decline(&self) {
        self.pending.lock().expect("pending task poisoned").take();
    }

    /// 第二步之二: 确认并执行
    ///
    /// 没有待确认任务时直接返回 —— 确认必须跟在请求之后。
    pub async fn confirm(&self) {
        let task = match self.pending.lock().expect("pending task poisoned").take() {
            Some(task) => task,
            None => return,
        };
        self.run(task).await;
    }

    /// 执行一次清理任务
    ///
    /// 契约:
    /// 1. busy置位失败说明已有任务在途,本次调用是无操作;
    /// 2. 开始日志 + 进度开始;
    /// 3. 凭证走请求头,请求体按任务规则;
    /// 4. 成败路径分别记录;
    /// 5. busy复位与进度结束在所有出口无条件执行。
    pub async fn run(&self, task: CleanupTask) {
        // 第一个挂起点之前抢占busy标志
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!(task = %task, "已有任务在执行,本次调用被忽略");
            return;
        }

        self.log
            .append(format!("开始执行任务: {}...", task.endpoint()), LogSeverity::Info);
        self.progress.begin();

        // 可失败部分收进单独一层,保证下面的清理在每条路径上执行
        self.run_once(task).await;

        self.progress.finish();
        self.busy.store(false, Ordering::SeqCst);
    }

    async fn run_once(&self, task: CleanupTask) {
        let session = match self.store.load() {
            Some(session) if session.is_usable() => session,
            _ => {
                tracing::warn!(task = %task, "无可用会话,任务中止");
                self.log
                    .append("任务失败: 未登录或会话已失效", LogSeverity::Error);
                return;
            }
        };

        // 变更类请求必须携带CSRF令牌
        if !session.can_mutate() {
            tracing::warn!(task = %task, "会话缺少CSRF令牌,任务中止");
            self.log
                .append("任务失败: 凭证不完整，请重新登录", LogSeverity::Error);
            return;
        }

        match self.api.run_cleanup(task, &session).await {
            Ok(outcome) if outcome.success => {
                if task == CleanupTask::All {
                    let total = outcome.total.unwrap_or(0);
                    let counts = outcome.counts.unwrap_or_default();
                    self.log.append(
                        format!("全部清理完成! 总计: {}", total),
                        LogSeverity::Success,
                    );
                    self.log.append(
                        format!(
                            "详情: 关注-{}, 收藏-{}, 动态-{}, 历史-{}",
                            counts.followings, counts.favorites, counts.dynamics, counts.history
                        ),
                        LogSeverity::Success,
                    );
                } else {
                    self.log.append(
                        format!("清理完成! 成功处理数量: {}", outcome.count.unwrap_or(0)),
                        LogSeverity::Success,
                    );
                }
                tracing::info!(task = %task, "清理任务成功");
            }
            Ok(outcome) => {
                // 服务端报告的失败 (success:false 或非2xx状态)
                tracing::warn!(
                    task = %task,
                    message = %outcome.failure_message(),
                    "清理任务被服务端拒绝"
                );
                self.log.append(
                    format!("任务失败: {}", outcome.failure_message()),
                    LogSeverity::Error,
                );
            }
            Err(e) => {
                // 传输层异常,与服务端失败在日志中可区分
                tracing::error!(task = %task, error = %e, "清理请求传输失败");
                self.log
                    .append(format!("请求发生错误: {}", e), LogSeverity::Error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiError, CleanupCounts, CleanupOutcome, Session};
    use std::future::Future;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// 测试桩: 记录调用次数,可选地挂起直到放行
    struct StubApi {
        calls: AtomicUsize,
        reply: Mutex<Option<Result<CleanupOutcome, ApiError>>>,
        gate: Option<Arc<Notify>>,
    }

    impl StubApi {
        fn replying(reply: Result<CleanupOutcome, ApiError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Mutex::new(Some(reply)),
                gate: None,
            }
        }

        fn gated(reply: Result<CleanupOutcome, ApiError>, gate: Arc<Notify>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Mutex::new(Some(reply)),
                gate: Some(gate),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CleanupApi for StubApi {
        fn run_cleanup(
            &self,
            _task: CleanupTask,
            _session: &Session,
        ) -> impl Future<Output = Result<CleanupOutcome, ApiError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self
                .reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(CleanupOutcome::default()));
            let gate = self.gate.clone();
            async move {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                reply
            }
        }
    }

    fn logged_in_store(tag: &str) -> Arc<SessionStore> {
        let store = SessionStore::with_path(std::env::temp_dir().join(format!(
            "bili-task-runner-{}-{}.json",
            tag,
            std::process::id()
        )));
        store
            .save(&Session {
                mid: "123".to_string(),
                sessdata: "abc".to_string(),
                csrf_token: "def".to_string(),
            })
            .unwrap();
        Arc::new(store)
    }

    fn runner_with(api: StubApi, store: Arc<SessionStore>) -> Arc<TaskRunner<StubApi>> {
        Arc::new(TaskRunner::new(
            Arc::new(api),
            store,
            Arc::new(ActivityLog::new()),
            Arc::new(ProgressReporter::new()),
        ))
    }

    fn success_with_count(count: u64) -> Result<CleanupOutcome, ApiError> {
        Ok(CleanupOutcome {
            success: true,
            count: Some(count),
            ..CleanupOutcome::default()
        })
    }

    #[tokio::test]
    async fn test_confirmed_task_logs_count() {
        let store = logged_in_store("count");
        let runner = runner_with(StubApi::replying(success_with_count(42)), store);

        let message = runner.request_confirmation(CleanupTask::History).unwrap();
        assert_eq!(message, CleanupTask::History.confirm_message());
        runner.confirm().await;

        assert_eq!(runner.api.call_count(), 1);
        assert!(!runner.is_busy());
        let entries = runner.log.entries();
        assert!(entries
            .iter()
            .any(|e| e.message.contains("42") && e.severity == LogSeverity::Success));
    }

    #[tokio::test]
    async fn test_all_task_logs_total_then_breakdown() {
        let store = logged_in_store("all");
        let reply = Ok(CleanupOutcome {
            success: true,
            total: Some(10),
            counts: Some(CleanupCounts {
                followings: 2,
                favorites: 3,
                dynamics: 4,
                history: 1,
            }),
            ..CleanupOutcome::default()
        });
        let runner = runner_with(StubApi::replying(reply), store);

        runner.run(CleanupTask::All).await;

        let entries = runner.log.entries();
        let total_idx = entries
            .iter()
            .position(|e| e.message.contains("总计: 10"))
            .expect("缺少总计日志");
        let detail_idx = entries
            .iter()
            .position(|e| e.message.contains("关注-2, 收藏-3, 动态-4, 历史-1"))
            .expect("缺少分类明细日志");
        assert!(total_idx < detail_idx, "总计必须先于明细");
    }

    #[tokio::test]
    async fn test_server_reported_failure_logs_server_message() {
        let store = logged_in_store("server-fail");
        let reply = Ok(CleanupOutcome {
            success: false,
            error: Some("csrf 校验失败".to_string()),
            ..CleanupOutcome::default()
        });
        let runner = runner_with(StubApi::replying(reply), store);

        runner.run(CleanupTask::Followings).await;

        let entries = runner.log.entries();
        assert!(entries
            .iter()
            .any(|e| e.message == "任务失败: csrf 校验失败"));
        assert!(!runner.is_busy());
    }

    #[tokio::test]
    async fn test_transport_error_logged_distinctly() {
        let store = logged_in_store("transport");
        let reply = Err(ApiError::NetworkFailed("连接被重置".to_string()));
        let runner = runner_with(StubApi::replying(reply), store);

        runner.run(CleanupTask::Dynamics).await;

        let entries = runner.log.entries();
        // 传输异常与服务端失败走不同的文案前缀
        assert!(entries.iter().any(|e| e.message.starts_with("请求发生错误:")));
        assert!(!entries.iter().any(|e| e.message.starts_with("任务失败:")));
        assert!(!runner.is_busy());
    }

    #[tokio::test]
    async fn test_decline_issues_no_request() {
        let store = logged_in_store("decline");
        let runner = runner_with(StubApi::replying(success_with_count(1)), store);
        let log_len_before = runner.log.len();

        assert!(runner.request_confirmation(CleanupTask::Favorites).is_some());
        runner.decline();
        runner.confirm().await;

        assert_eq!(runner.api.call_count(), 0);
        assert!(!runner.is_busy());
        assert_eq!(runner.log.len(), log_len_before);
    }

    #[tokio::test]
    async fn test_busy_runner_rejects_second_run() {
        let store = logged_in_store("busy");
        let gate = Arc::new(Notify::new());
        let runner = runner_with(
            StubApi::gated(success_with_count(7), Arc::clone(&gate)),
            store,
        );

        let first = {
            let runner = Arc::clone(&runner);
            tokio::spawn(async move { runner.run(CleanupTask::Comments).await })
        };

        // 等待第一个任务抢到busy标志并发出请求
        while runner.api.call_count() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(runner.is_busy());

        // 忙碌期间的第二次run与确认请求都是无操作
        let log_len_during = runner.log.len();
        runner.run(CleanupTask::History).await;
        assert!(runner.request_confirmation(CleanupTask::History).is_none());
        assert_eq!(runner.api.call_count(), 1);
        assert_eq!(runner.log.len(), log_len_during);

        gate.notify_one();
        first.await.unwrap();

        assert_eq!(runner.api.call_count(), 1);
        assert!(!runner.is_busy());
    }

    #[tokio::test]
    async fn test_run_without_session_is_logged_failure() {
        let store = SessionStore::with_path(std::env::temp_dir().join(format!(
            "bili-task-runner-nosession-{}.json",
            std::process::id()
        )));
        let _ = store.clear();
        let runner = runner_with(StubApi::replying(success_with_count(1)), Arc::new(store));

        runner.run(CleanupTask::History).await;

        assert_eq!(runner.api.call_count(), 0);
        assert!(!runner.is_busy());
        assert!(runner
            .log
            .entries()
            .iter()
            .any(|e| e.message.contains("未登录")));
    }
}
