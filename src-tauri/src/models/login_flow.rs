use serde::{Deserialize, Serialize};

/// 扫码成功,跳转URL待解析
pub const POLL_CODE_SUCCESS: i64 = 0;
/// 已扫码,等待手机端确认
pub const POLL_CODE_SCANNED: i64 = 86090;
/// 二维码已过期
pub const POLL_CODE_EXPIRED: i64 = 86038;

/// 轮询间隔(秒)
pub const POLL_INTERVAL_SECS: u64 = 3;

/// 登录状态
///
/// 状态转换流程:
/// Idle -> IssuingCode -> AwaitingScan -> Scanned -> Authenticated
///              |              |            |
///              |              +------------+---> Expired (code 86038)
///              |                           |
///              |                           +---> ParseFailed (跳转URL残缺)
///              +---> IssueFailed (获取二维码失败)
///
/// 四个终态对当前登录尝试是吸收态,只有显式重新发起登录才能离开。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginState {
    /// 未发起登录
    Idle,

    /// 正在获取二维码
    IssuingCode,

    /// 等待扫码
    AwaitingScan,

    /// 已扫码,等待确认
    Scanned,

    /// 登录成功,会话已持久化
    Authenticated,

    /// 二维码已过期
    Expired,

    /// 获取二维码失败
    IssueFailed,

    /// 跳转URL解析失败
    ParseFailed,
}

impl LoginState {
    /// 是否为当前尝试的终态
    ///
    /// 终态下任何轮询结果都不再改变状态,直到显式重启。
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoginState::Authenticated
                | LoginState::Expired
                | LoginState::IssueFailed
                | LoginState::ParseFailed
        )
    }

    /// 是否处于轮询窗口
    pub fn is_polling(&self) -> bool {
        matches!(self, LoginState::AwaitingScan | LoginState::Scanned)
    }
}

/// 单次轮询结果
///
/// 每个tick产生一次,只被消费,不被存储。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResult {
    /// 状态码 (0成功 / 86090已扫码 / 86038过期 / 其他继续等待)
    pub code: i64,

    /// 跳转URL (仅code=0时有意义)
    #[serde(default)]
    pub url: Option<String>,
}

/// 一次tick应用后的动作指示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// 无状态变化,继续轮询
    KeepPolling,

    /// 从等待扫码转入已扫码,继续轮询
    Scanned,

    /// 扫码确认成功,停止轮询并解析跳转URL
    Success { redirect_url: Option<String> },

    /// 二维码过期,停止轮询,等待用户显式重启
    Expired,

    /// 过期尝试或终态下到达的tick,直接丢弃
    Ignored,
}

/// 登录流程状态机
///
/// 纯状态转换,不涉及网络与定时器;轮询循环负责产生
/// `PollResult` 并在此处应用。每次重新发起登录都会递增
/// 尝试代数(attempt),迟到的tick凭代数被丢弃,保证轮询结果
/// 永远不会作用到已被取代的登录尝试上。
#[derive(Debug)]
pub struct LoginFlow {
    state: LoginState,
    qrcode_key: Option<String>,
    attempt: u64,
}

impl LoginFlow {
    pub fn new() -> Self {
        Self {
            state: LoginState::Idle,
            qrcode_key: None,
            attempt: 0,
        }
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// 当前登录码 (仅轮询窗口内有值)
    pub fn qrcode_key(&self) -> Option<&str> {
        self.qrcode_key.as_deref()
    }

    /// 发起新的登录尝试
    ///
    /// 无条件可用: 从任何状态(包括终态)进入 IssuingCode,
    /// 旧的登录码立即作废,返回新的尝试代数。
    pub fn begin_attempt(&mut self) -> u64 {
        self.attempt += 1;
        self.state = LoginState::IssuingCode;
        self.qrcode_key = None;
        self.attempt
    }

    /// 二维码获取成功,进入轮询窗口
    ///
    /// 返回false表示该尝试已被取代,调用方不应启动轮询。
    pub fn code_issued(&mut self, attempt: u64, qrcode_key: String) -> bool {
        if attempt != self.attempt || self.state != LoginState::IssuingCode {
            return false;
        }
        self.qrcode_key = Some(qrcode_key);
        self.state = LoginState::AwaitingScan;
        true
    }

    /// 二维码获取失败,终态 IssueFailed
    pub fn issue_failed(&mut self, attempt: u64) -> bool {
        if attempt != self.attempt || self.state != LoginState::IssuingCode {
            return false;
        }
        self.state = LoginState::IssueFailed;
        true
    }

    /// 应用一次轮询结果
    ///
    /// 过期代数或非轮询窗口下的tick一律返回 `Ignored`。
    pub fn apply_poll(&mut self, attempt: u64, result: &PollResult) -> PollStep {
        if attempt != self.attempt || !self.state.is_polling() {
            return PollStep::Ignored;
        }

        match result.code {
            POLL_CODE_SUCCESS => PollStep::Success {
                redirect_url: result.url.clone(),
            },
            POLL_CODE_SCANNED => {
                if self.state == LoginState::AwaitingScan {
                    self.state = LoginState::Scanned;
                    PollStep::Scanned
                } else {
                    PollStep::KeepPolling
                }
            }
            POLL_CODE_EXPIRED => {
                self.state = LoginState::Expired;
                self.qrcode_key = None;
                PollStep::Expired
            }
            _ => PollStep::KeepPolling,
        }
    }

    /// 跳转URL解析成功,会话已交付存储
    pub fn mark_authenticated(&mut self, attempt: u64) -> bool {
        if attempt != self.attempt || !self.state.is_polling() {
            return false;
        }
        self.state = LoginState::Authenticated;
        self.qrcode_key = None;
        true
    }

    /// 跳转URL解析失败,终态 ParseFailed
    pub fn mark_parse_failed(&mut self, attempt: u64) -> bool {
        if attempt != self.attempt || !self.state.is_polling() {
            return false;
        }
        self.state = LoginState::ParseFailed;
        self.qrcode_key = None;
        true
    }

    /// 登出或冷启动复位
    pub fn reset(&mut self) {
        self.attempt += 1;
        self.state = LoginState::Idle;
        self.qrcode_key = None;
    }
}

impl Default for LoginFlow {
    fn default() -> Self {
        Self::new()
    }
}
