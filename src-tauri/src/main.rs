// 禁用Windows控制台窗口
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use bili_cleaner::commands::{cleanup_commands, log_commands, login_commands, session_commands};
use bili_cleaner::services::ConfigService;
use bili_cleaner::state::AppState;
use bili_cleaner::utils::logger;

fn main() {
    // 初始化日志系统
    if let Err(e) = logger::init() {
        eprintln!("日志系统初始化失败: {}", e);
    }

    let api_base_url = ConfigService::api_base_url();
    let state = match AppState::new(&api_base_url) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "应用状态初始化失败");
            std::process::exit(1);
        }
    };

    // 启动Tauri应用
    tauri::Builder::default()
        .manage(state)
        .invoke_handler(tauri::generate_handler![
            login_commands::start_login,
            login_commands::login_state,
            login_commands::logout,
            cleanup_commands::request_cleanup,
            cleanup_commands::confirm_cleanup,
            cleanup_commands::decline_cleanup,
            cleanup_commands::cleanup_busy,
            cleanup_commands::progress_state,
            session_commands::has_valid_session,
            session_commands::current_session,
            session_commands::get_preferences,
            session_commands::set_preferences,
            log_commands::list_activity,
            log_commands::clear_activity,
        ])
        .run(tauri::generate_context!())
        .expect("启动Tauri应用时发生错误");
}
