//! 会话存储集成测试
//!
//! 覆盖持久化的完整生命周期: 保存、跨实例读取、登出清除,
//! 以及损坏文件的自愈行为。

use std::fs;
use std::path::PathBuf;

use bili_cleaner::models::Session;
use bili_cleaner::services::SessionStore;

fn temp_store_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "bili-store-integration-{}-{}.json",
        tag,
        std::process::id()
    ))
}

fn sample_session() -> Session {
    Session {
        mid: "10086".to_string(),
        sessdata: "s3ssdata".to_string(),
        csrf_token: "c5rf".to_string(),
    }
}

#[test]
fn test_save_then_load_across_instances() {
    let path = temp_store_path("reload");
    let store = SessionStore::with_path(path.clone());
    store.save(&sample_session()).unwrap();

    // 新实例模拟应用重启
    let reopened = SessionStore::with_path(path.clone());
    let loaded = reopened.load().expect("重启后会话应当仍可读取");
    assert_eq!(loaded, sample_session());
    assert!(reopened.has_valid_session());

    let _ = fs::remove_file(path);
}

#[test]
fn test_clear_removes_session() {
    let path = temp_store_path("clear");
    let store = SessionStore::with_path(path.clone());
    store.save(&sample_session()).unwrap();
    assert!(store.has_valid_session());

    store.clear().unwrap();
    assert!(store.load().is_none());
    assert!(!store.has_valid_session());

    // 清除是幂等的
    store.clear().unwrap();

    let _ = fs::remove_file(path);
}

#[test]
fn test_corrupted_file_self_heals_to_logged_out() {
    let path = temp_store_path("corrupt");
    fs::write(&path, "{ not valid json").unwrap();

    let store = SessionStore::with_path(path.clone());
    assert!(store.load().is_none());

    // 损坏文件已被清除,后续读取等同于未登录
    assert!(!path.exists());
    assert!(!store.has_valid_session());
}

#[test]
fn test_legacy_record_without_csrf_still_counts_as_logged_in() {
    let path = temp_store_path("legacy");
    fs::write(&path, r#"{"mid":"10086","sessdata":"s3ssdata"}"#).unwrap();

    let store = SessionStore::with_path(path.clone());
    let loaded = store.load().expect("缺少bili_jct的历史记录仍应可读");
    assert!(loaded.is_usable());
    assert!(!loaded.can_mutate());

    let _ = fs::remove_file(path);
}
