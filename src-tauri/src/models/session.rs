use serde::{Deserialize, Serialize};

use crate::models::errors::SessionParseError;

/// 登录会话凭证
///
/// 从登录成功的跳转URL中解析得到,三项字段要么全部有效,要么整体不存在。
/// 仅由一次成功的登录解析创建;由显式登出或存储损坏自愈销毁。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// 用户数字ID (源参数名 DedeUserID)
    pub mid: String,

    /// 会话密钥 (源参数名 SESSDATA)
    pub sessdata: String,

    /// CSRF令牌 (源参数名 bili_jct)
    ///
    /// 历史存储记录可能缺失该字段,登录判定容忍缺失,
    /// 但任何变更类请求都必须携带。
    #[serde(rename = "bili_jct", default)]
    pub csrf_token: String,
}

impl Session {
    /// 从登录跳转URL解析会话
    ///
    /// URL形如: `https://.../...?DedeUserID=...&SESSDATA=...&bili_jct=...`
    /// 三个参数缺一不可,任何缺失都返回 `MissingParam`,由调用方
    /// 转入 ParseFailed 状态并要求用户重新登录。
    ///
    /// # 示例
    /// ```
    /// use bili_cleaner::models::Session;
    ///
    /// let session = Session::from_redirect_url(
    ///     "https://passport.example.com/cb?DedeUserID=123&SESSDATA=abc&bili_jct=def",
    /// )
    /// .unwrap();
    /// assert_eq!(session.mid, "123");
    /// assert_eq!(session.csrf_token, "def");
    /// ```
    pub fn from_redirect_url(url: &str) -> Result<Self, SessionParseError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| SessionParseError::MalformedUrl(e.to_string()))?;

        let mut mid = None;
        let mut sessdata = None;
        let mut csrf_token = None;

        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "DedeUserID" => mid = Some(value.into_owned()),
                "SESSDATA" => sessdata = Some(value.into_owned()),
                "bili_jct" => csrf_token = Some(value.into_owned()),
                _ => {}
            }
        }

        let mid = non_empty(mid).ok_or(SessionParseError::MissingParam("DedeUserID"))?;
        let sessdata = non_empty(sessdata).ok_or(SessionParseError::MissingParam("SESSDATA"))?;
        let csrf_token = non_empty(csrf_token).ok_or(SessionParseError::MissingParam("bili_jct"))?;

        Ok(Self {
            mid,
            sessdata,
            csrf_token,
        })
    }

    /// 登录判定: 用户ID与会话密钥同时存在
    ///
    /// CSRF令牌单独缺失不影响"已登录"的判定。
    pub fn is_usable(&self) -> bool {
        !self.mid.is_empty() && !self.sessdata.is_empty()
    }

    /// 变更判定: 执行清理等破坏性请求所需的完整凭证
    pub fn can_mutate(&self) -> bool {
        self.is_usable() && !self.csrf_token.is_empty()
    }

    /// 用户ID的数字形式
    ///
    /// 清理请求体中的 mid 以整数传输。
    pub fn mid_as_int(&self) -> Option<i64> {
        self.mid.parse().ok()
    }

    /// 日志安全的描述 (不含任何凭证值)
    pub fn summary_for_logging(&self) -> String {
        format!(
            "mid={}, sessdata_len={}, csrf_len={}",
            self.mid,
            self.sessdata.len(),
            self.csrf_token.len()
        )
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
