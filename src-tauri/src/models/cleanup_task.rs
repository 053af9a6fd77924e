use serde::{Deserialize, Serialize};

/// 清理任务类型
///
/// 每个变体对应远端服务的一个批量清理端点,
/// 附带固定的确认文案与请求体规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupTask {
    /// 取消所有关注
    Followings,

    /// 清空收藏夹
    Favorites,

    /// 删除所有动态
    Dynamics,

    /// 清空观看历史
    History,

    /// 删除所有评论
    Comments,

    /// 以上全部
    All,
}

impl CleanupTask {
    /// 端点路径片段: `POST /cleanup/{endpoint}`
    pub fn endpoint(&self) -> &'static str {
        match self {
            CleanupTask::Followings => "followings",
            CleanupTask::Favorites => "favorites",
            CleanupTask::Dynamics => "dynamics",
            CleanupTask::History => "history",
            CleanupTask::Comments => "comments",
            CleanupTask::All => "all",
        }
    }

    /// 固定的确认文案
    ///
    /// 任何清理任务在发出网络请求前都必须先用该文案获得用户的
    /// 肯定确认;拒绝确认则什么都不发生。
    pub fn confirm_message(&self) -> &'static str {
        match self {
            CleanupTask::Followings => "确定要取消所有关注吗？此操作不可恢复。",
            CleanupTask::Favorites => "确定要删除所有收藏夹内容吗？此操作不可恢复。",
            CleanupTask::Dynamics => "确定要删除所有动态吗？此操作不可恢复。",
            CleanupTask::History => "确定要清空观看历史吗？",
            CleanupTask::Comments => "确定要删除所有评论吗？此操作不可恢复。",
            CleanupTask::All => "警告！这将清空关注、收藏、动态、评论和历史记录！确定要继续吗？",
        }
    }

    /// 是否需要携带请求体
    ///
    /// 除 `history` 外的任务都携带 `{ "mid": <用户ID> }`。
    pub fn requires_body(&self) -> bool {
        !matches!(self, CleanupTask::History)
    }
}

impl std::fmt::Display for CleanupTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// 分类清理计数 (仅 `all` 任务返回)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupCounts {
    #[serde(default)]
    pub followings: u64,

    #[serde(default)]
    pub favorites: u64,

    #[serde(default)]
    pub dynamics: u64,

    #[serde(default)]
    pub history: u64,
}

/// 清理任务结果
///
/// 服务端回复的统一形态:
/// - 单类任务: `success` + `count`
/// - 全量任务: `success` + `total` + `counts`
/// - 失败: `success:false` + `error` 或 `message`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupOutcome {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub count: Option<u64>,

    #[serde(default)]
    pub counts: Option<CleanupCounts>,

    #[serde(default)]
    pub total: Option<u64>,

    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

impl CleanupOutcome {
    /// 失败文案: 优先 `error`,回退 `message`,再回退通用文案
    pub fn failure_message(&self) -> &str {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("Unknown error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_history_has_no_body() {
        assert!(!CleanupTask::History.requires_body());
        for task in [
            CleanupTask::Followings,
            CleanupTask::Favorites,
            CleanupTask::Dynamics,
            CleanupTask::Comments,
            CleanupTask::All,
        ] {
            assert!(task.requires_body(), "{} 应携带请求体", task);
        }
    }

    #[test]
    fn test_every_task_has_fixed_confirm_message() {
        let tasks = [
            CleanupTask::Followings,
            CleanupTask::Favorites,
            CleanupTask::Dynamics,
            CleanupTask::History,
            CleanupTask::Comments,
            CleanupTask::All,
        ];
        for task in tasks {
            assert!(!task.confirm_message().is_empty());
        }
        assert!(CleanupTask::All.confirm_message().starts_with("警告"));
    }

    #[test]
    fn test_serde_snake_case_names() {
        let json = serde_json::to_string(&CleanupTask::Followings).unwrap();
        assert_eq!(json, "\"followings\"");

        let task: CleanupTask = serde_json::from_str("\"history\"").unwrap();
        assert_eq!(task, CleanupTask::History);
    }

    #[test]
    fn test_outcome_single_count() {
        let outcome: CleanupOutcome =
            serde_json::from_str(r#"{"success":true,"count":42}"#).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.count, Some(42));
        assert!(outcome.counts.is_none());
    }

    #[test]
    fn test_outcome_aggregate_counts() {
        let outcome: CleanupOutcome = serde_json::from_str(
            r#"{"success":true,"total":10,"counts":{"followings":2,"favorites":3,"dynamics":4,"history":1}}"#,
        )
        .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.total, Some(10));
        let counts = outcome.counts.unwrap();
        assert_eq!(counts.followings, 2);
        assert_eq!(counts.history, 1);
    }

    #[test]
    fn test_outcome_tolerates_extra_count_categories() {
        // 源服务的 all 回复里额外携带 comments 计数,解码时忽略
        let outcome: CleanupOutcome = serde_json::from_str(
            r#"{"success":true,"total":5,"counts":{"followings":1,"favorites":1,"dynamics":1,"history":1,"comments":1}}"#,
        )
        .unwrap();
        assert_eq!(outcome.counts.unwrap().followings, 1);
    }

    #[test]
    fn test_failure_message_fallback_chain() {
        let with_error: CleanupOutcome =
            serde_json::from_str(r#"{"success":false,"error":"csrf 校验失败"}"#).unwrap();
        assert_eq!(with_error.failure_message(), "csrf 校验失败");

        let with_message: CleanupOutcome =
            serde_json::from_str(r#"{"success":false,"message":"服务暂不可用"}"#).unwrap();
        assert_eq!(with_message.failure_message(), "服务暂不可用");

        let bare: CleanupOutcome = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(bare.failure_message(), "Unknown error");
    }
}
