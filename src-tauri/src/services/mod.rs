//! 服务层模块
//!
//! 包含所有业务逻辑服务:
//! - `bili_api`: 登录/清理服务客户端 (签发二维码、轮询状态、发出清理请求)
//! - `session_store`: 会话持久化 (JSON文件,损坏自愈)
//! - `qr_login`: 扫码登录控制器 (可取消的3秒轮询循环)
//! - `task_runner`: 清理任务执行器 (确认协议 + busy互斥)
//! - `progress_reporter`: 装饰性进度反馈
//! - `config_service`: API地址与界面偏好
//!
//! # 服务架构
//!
//! ```text
//! ┌─────────────────┐
//! │  Tauri Commands │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌────────────────────────────────────────┐
//! │            Services Layer              │
//! │  ┌──────────────────┐ ┌─────────────┐  │
//! │  │QrLoginController │ │ TaskRunner  │  │
//! │  └────────┬─────────┘ └──────┬──────┘  │
//! │           │        ┌─────────┤         │
//! │  ┌────────▼────────▼──┐ ┌────▼──────┐  │
//! │  │   BiliApiClient    │ │ Progress  │  │
//! │  └────────────────────┘ └───────────┘  │
//! │  ┌────────────────────┐                │
//! │  │   SessionStore     │                │
//! │  └────────────────────┘                │
//! └────────────────────────────────────────┘
//!          │
//!          ▼
//!     登录/清理服务API
//! ```

pub mod bili_api;
pub mod config_service;
pub mod progress_reporter;
pub mod qr_login;
pub mod session_store;
pub mod task_runner;

// 重导出常用类型,简化外部引用
pub use bili_api::{BiliApiClient, CleanupApi, QrCodeIssue};
pub use config_service::{ConfigService, Preferences};
pub use progress_reporter::{ProgressReporter, ProgressState};
pub use qr_login::QrLoginController;
pub use session_store::SessionStore;
pub use task_runner::TaskRunner;
