//! 扫码登录控制器
//!
//! 职责: 把登录从"未签发"推进到"会话已持久化",或推进到一个
//! 可重启的失败终态。同一时间只允许一个活跃的登录码被轮询:
//! 新尝试启动前先取消旧的轮询任务。

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::models::{
    ActivityLog, ApiError, LogSeverity, LoginFlow, LoginState, PollStep, Session,
    POLL_INTERVAL_SECS,
};
use crate::services::bili_api::{BiliApiClient, QrCodeIssue};
use crate::services::session_store::SessionStore;

/// 轮询任务携带的上下文 (全部为Arc克隆,任务与控制器共享状态)
struct PollCtx {
    api: Arc<BiliApiClient>,
    store: Arc<SessionStore>,
    log: Arc<ActivityLog>,
    flow: Arc<StdMutex<LoginFlow>>,
}

/// 扫码登录控制器
///
/// 状态机本体在 `LoginFlow` 中,这里负责编排:
/// 签发请求、3秒定时轮询、取消语义与日志。
/// 取消采用双重保险: CancellationToken停掉循环本身,
/// 尝试代数保证迟到的tick不会作用到被取代的尝试上。
pub struct QrLoginController {
    api: Arc<BiliApiClient>,
    store: Arc<SessionStore>,
    log: Arc<ActivityLog>,
    flow: Arc<StdMutex<LoginFlow>>,

    /// 当前活跃的轮询任务 (attempt, 取消令牌)
    active_poll: Mutex<Option<(u64, CancellationToken)>>,
}

impl QrLoginController {
    pub fn new(api: Arc<BiliApiClient>, store: Arc<SessionStore>, log: Arc<ActivityLog>) -> Self {
        Self {
            api,
            store,
            log,
            flow: Arc::new(StdMutex::new(LoginFlow::new())),
            active_poll: Mutex::new(None),
        }
    }

    /// 当前登录状态快照
    pub fn state(&self) -> LoginState {
        self.flow.lock().expect("login flow poisoned").state()
    }

    /// 发起(或重新发起)扫码登录
    ///
    /// 总是先取消当前的轮询再签发新码 —— 两个登录码绝不会被
    /// 同时轮询。签发失败进入 IssueFailed 终态并写用户可见日志,
    /// 不自动重试。
    pub async fn start_login(&self) -> Result<QrCodeIssue, ApiError> {
        // 持有active_poll锁贯穿整个签发过程,串行化并发的重启请求
        let mut poll_guard = self.active_poll.lock().await;
        if let Some((old_attempt, token)) = poll_guard.take() {
            tracing::info!(old_attempt = %old_attempt, "取消旧的轮询任务,重新发起登录");
            token.cancel();
        }

        let attempt = self
            .flow
            .lock()
            .expect("login flow poisoned")
            .begin_attempt();

        let issue = match self.api.issue_qrcode().await {
            Ok(issue) => issue,
            Err(e) => {
                self.flow
                    .lock()
                    .expect("login flow poisoned")
                    .issue_failed(attempt);
                tracing::error!(attempt = %attempt, error = %e, "二维码签发失败");
                self.log
                    .append("获取二维码失败，请重试", LogSeverity::Error);
                return Err(e);
            }
        };

        let accepted = self
            .flow
            .lock()
            .expect("login flow poisoned")
            .code_issued(attempt, issue.qrcode_key.clone());
        if !accepted {
            // 本次尝试已被更新的重启取代,不启动轮询
            return Ok(issue);
        }

        self.log
            .append("二维码已生成，请使用哔哩哔哩App扫码", LogSeverity::Info);

        let token = CancellationToken::new();
        *poll_guard = Some((attempt, token.clone()));

        let ctx = PollCtx {
            api: Arc::clone(&self.api),
            store: Arc::clone(&self.store),
            log: Arc::clone(&self.log),
            flow: Arc::clone(&self.flow),
        };
        let key = issue.qrcode_key.clone();
        tokio::spawn(async move {
            poll_loop(ctx, attempt, key, token).await;
        });

        Ok(issue)
    }

    /// 取消当前轮询 (幂等)
    pub async fn cancel_polling(&self) {
        let mut guard = self.active_poll.lock().await;
        if let Some((attempt, token)) = guard.take() {
            tracing::info!(attempt = %attempt, "轮询已取消");
            token.cancel();
        }
    }

    /// 登出
    ///
    /// 取消轮询、清除持久化会话、状态机复位。
    /// 不会中止正在执行的清理请求 —— 其结果到达后只会被记录,
    /// 不会作用到已不存在的会话上。
    pub async fn logout(&self) {
        self.cancel_polling().await;

        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "登出时清除会话失败");
        }
        self.flow.lock().expect("login flow poisoned").reset();
        self.log.append("已退出登录", LogSeverity::Info);
    }
}

/// 固定3秒间隔的轮询循环
///
/// 退出条件: 取消令牌触发、状态机进入终态、或尝试被取代。
/// 传输层错误被记录并吞掉,下一个tick照常发起 —— 瞬时网络抖动
/// 不终止轮询,也不计入过期。
async fn poll_loop(ctx: PollCtx, attempt: u64, qrcode_key: String, token: CancellationToken) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECS)) => {}
        }

        let result = match ctx.api.poll_qrcode(&qrcode_key).await {
            Ok(Some(result)) => result,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(attempt = %attempt, error = %e, "轮询tick传输失败,吞掉后继续");
                continue;
            }
        };

        // 请求在途期间可能已被取消,迟到的结果不得应用
        if token.is_cancelled() {
            break;
        }

        let step = ctx
            .flow
            .lock()
            .expect("login flow poisoned")
            .apply_poll(attempt, &result);

        match step {
            PollStep::KeepPolling => {}
            PollStep::Scanned => {
                tracing::info!(attempt = %attempt, "二维码已被扫描");
                ctx.log
                    .append("已扫码，请在手机上确认", LogSeverity::Info);
            }
            PollStep::Expired => {
                tracing::warn!(attempt = %attempt, "二维码已过期");
                ctx.log
                    .append("二维码已过期，请重新获取", LogSeverity::Error);
                break;
            }
            PollStep::Success { redirect_url } => {
                token.cancel();
                finish_login(&ctx, attempt, redirect_url);
                break;
            }
            PollStep::Ignored => break,
        }
    }
}

/// 把成功tick转化为持久化会话
///
/// 跳转URL必须携带完整三项凭证;缺失或畸形进入 ParseFailed,
/// 要求用户显式重启,避免在结构性坏响应上打转。
fn finish_login(ctx: &PollCtx, attempt: u64, redirect_url: Option<String>) {
    let parsed = match redirect_url.as_deref() {
        Some(url) => Session::from_redirect_url(url),
        None => {
            tracing::error!(attempt = %attempt, "成功tick缺少跳转URL");
            mark_parse_failed(ctx, attempt);
            return;
        }
    };

    let session = match parsed {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(attempt = %attempt, error = %e, "跳转URL解析失败");
            mark_parse_failed(ctx, attempt);
            return;
        }
    };

    let authenticated = ctx
        .flow
        .lock()
        .expect("login flow poisoned")
        .mark_authenticated(attempt);
    if !authenticated {
        // 尝试在解析期间被取代或登出,结果作废
        return;
    }

    if let Err(e) = ctx.store.save(&session) {
        tracing::error!(error = %e, "会话持久化失败,本次运行仍保持登录");
        ctx.log
            .append(format!("会话保存失败: {}", e), LogSeverity::Error);
    }

    tracing::info!(mid = %session.mid, "登录成功");
    ctx.log.append(
        format!("登录成功，欢迎用户 UID: {}", session.mid),
        LogSeverity::Success,
    );
}

fn mark_parse_failed(ctx: &PollCtx, attempt: u64) {
    ctx.flow
        .lock()
        .expect("login flow poisoned")
        .mark_parse_failed(attempt);
    ctx.log
        .append("登录解析失败，请重试", LogSeverity::Error);
}
