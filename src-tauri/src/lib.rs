//! 哔哩哔哩扫码登录与批量清理 - 核心库
//!
//! 桌面工具的后端核心,分四层:
//! - `models`: 数据结构与登录状态机 (纯逻辑,不做I/O)
//! - `services`: 业务服务 (API客户端、会话存储、登录编排、任务执行)
//! - `commands`: Tauri命令入口 (前端 `invoke` 的边界)
//! - `state`: 应用全局状态的组装
//!
//! # 核心契约
//! - 同一时间最多一个登录码被轮询,最多一个清理任务在执行
//! - 未经用户肯定确认,不发出任何清理请求
//! - 凭证只进请求头与本地存储,绝不进日志

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
