//! 工具模块
//!
//! - `logger`: tracing日志系统初始化 (JSON文件 + 控制台双输出)

pub mod logger;
