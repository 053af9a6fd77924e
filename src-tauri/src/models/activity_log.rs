use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// 日志条目严重级别
///
/// 决定前端渲染样式,不参与任何控制流。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSeverity {
    Normal,
    Info,
    Success,
    Error,
}

/// 活动日志条目
///
/// 追加后不可变更。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub severity: LogSeverity,
}

/// 占位条目文案: 清空或初始时的唯一内容
const PLACEHOLDER: &str = "准备就绪，等待指令...";

/// 活动日志
///
/// 登录控制器与任务执行器共用的追加式记录,严格按追加顺序排列。
/// 仅支持两种写操作: 追加一条、整体清空(以占位条目替换)。
pub struct ActivityLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(vec![Self::placeholder()]),
        }
    }

    fn placeholder() -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            message: PLACEHOLDER.to_string(),
            severity: LogSeverity::Normal,
        }
    }

    /// 追加一条日志
    pub fn append(&self, message: impl Into<String>, severity: LogSeverity) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            message: message.into(),
            severity,
        };
        self.entries
            .lock()
            .expect("activity log poisoned")
            .push(entry);
    }

    /// 当前全部条目的快照
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .expect("activity log poisoned")
            .clone()
    }

    /// 清空日志,恢复占位条目
    pub fn clear(&self) {
        let mut guard = self.entries.lock().expect("activity log poisoned");
        guard.clear();
        guard.push(Self::placeholder());
    }

    /// 条目数量 (含占位条目)
    pub fn len(&self) -> usize {
        self.entries.lock().expect("activity log poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}
