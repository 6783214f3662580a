use std::time::Duration;

use explorer_loader::FileDescriptorSet;
use explorer_session::{SessionManager, SessionManagerConfig};

fn test_fds() -> FileDescriptorSet {
    FileDescriptorSet::decode(explorer_test_service::FILE_DESCRIPTOR_SET)
        .expect("decode embedded descriptor set")
}

use prost::Message;

#[tokio::test]
async fn get_or_create_mints_a_fresh_session_for_empty_or_unknown_id() {
    let manager = SessionManager::new(SessionManagerConfig::default());

    let minted = manager.get_or_create(None).await;
    assert!(!minted.id.is_empty());

    let also_minted = manager.get_or_create(Some("")).await;
    assert_ne!(minted.id, also_minted.id);

    let unknown = manager.get_or_create(Some("does-not-exist")).await;
    assert_ne!(unknown.id, minted.id);
    assert_ne!(unknown.id, also_minted.id);

    manager.close().await;
}

#[tokio::test]
async fn get_or_create_returns_the_same_state_for_a_known_id() {
    let manager = SessionManager::new(SessionManagerConfig::default());

    let first = manager.get_or_create(None).await;
    first.registry.register(test_fds()).unwrap();

    let second = manager.get_or_create(Some(&first.id)).await;
    assert_eq!(first.id, second.id);
    assert!(second.registry.has_service("explorer.test.v1.EchoService"));

    manager.close().await;
}

#[tokio::test]
async fn sessions_are_isolated_from_one_another() {
    let manager = SessionManager::new(SessionManagerConfig::default());

    let a = manager.get_or_create(None).await;
    let b = manager.get_or_create(None).await;
    assert_ne!(a.id, b.id);

    a.registry.register(test_fds()).unwrap();

    assert!(a.registry.has_service("explorer.test.v1.EchoService"));
    assert!(!b.registry.has_service("explorer.test.v1.EchoService"));

    manager.close().await;
}

#[tokio::test]
async fn delete_removes_the_session() {
    let manager = SessionManager::new(SessionManagerConfig::default());

    let session = manager.get_or_create(None).await;
    manager.delete(&session.id).await;

    assert_eq!(manager.get_stats().await.active_sessions, 0);

    // A subsequent lookup mints a new session rather than resurrecting the old one.
    let fresh = manager.get_or_create(Some(&session.id)).await;
    assert_ne!(fresh.id, session.id);

    manager.close().await;
}

#[tokio::test]
async fn get_stats_reports_active_session_count_and_ages() {
    let manager = SessionManager::new(SessionManagerConfig::default());

    assert_eq!(manager.get_stats().await.active_sessions, 0);

    manager.get_or_create(None).await;
    manager.get_or_create(None).await;

    let stats = manager.get_stats().await;
    assert_eq!(stats.active_sessions, 2);
    assert!(stats.oldest_session_age_ms.unwrap() >= 0);
    assert!(stats.newest_session_age_ms.unwrap() >= 0);

    manager.close().await;
}

#[tokio::test]
async fn cleanup_loop_expires_sessions_past_their_ttl() {
    let manager = SessionManager::new(SessionManagerConfig {
        ttl: Duration::from_millis(20),
        cleanup_interval: Duration::from_millis(30),
    });

    let session = manager.get_or_create(None).await;
    assert_eq!(manager.get_stats().await.active_sessions, 1);

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(manager.get_stats().await.active_sessions, 0);
    drop(session);

    manager.close().await;
}

#[tokio::test]
async fn close_drains_the_cleanup_task_and_empties_the_map() {
    let manager = SessionManager::new(SessionManagerConfig::default());
    manager.get_or_create(None).await;

    manager.close().await;

    assert_eq!(manager.get_stats().await.active_sessions, 0);
}
