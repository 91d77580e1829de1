use std::sync::Arc;

use chrono::Duration;
use domain::{DeviceId, DeviceSession, SessionRepository, UserId};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::ApplicationError;
use crate::services::devices_service::{DevicesService, DevicesServiceDependencies};
use crate::services::test_support::{FakeTokenIssuer, FixedClock, MemorySessions};
use crate::tokens::TokenIssuer;

struct Fixture {
    service: DevicesService,
    sessions: Arc<MemorySessions>,
    issuer: Arc<FakeTokenIssuer>,
    clock: Arc<FixedClock>,
}

fn fixture() -> Fixture {
    let sessions = Arc::new(MemorySessions::default());
    let issuer = Arc::new(FakeTokenIssuer::default());
    let clock = Arc::new(FixedClock::default());
    let service = DevicesService::new(DevicesServiceDependencies {
        sessions: sessions.clone(),
        token_issuer: issuer.clone(),
        clock: clock.clone(),
    });
    Fixture {
        service,
        sessions,
        issuer,
        clock,
    }
}

impl Fixture {
    /// 模拟一次登录：签发令牌对并落一条会话，返回刷新令牌。
    async fn open_session(&self, user_id: UserId, device_name: &str) -> (DeviceId, String) {
        let device_id = DeviceId::generate();
        let pair = self
            .issuer
            .issue_pair(user_id, device_id, self.clock.now())
            .unwrap();
        let session = DeviceSession::start(
            device_id,
            user_id,
            "10.0.0.1",
            device_name,
            pair.refresh_issued_at,
            pair.refresh_expires_at,
        );
        self.sessions.create(session).await.unwrap();
        (device_id, pair.refresh_token)
    }
}

#[tokio::test]
async fn list_returns_only_own_sessions() {
    let fx = fixture();
    let user = UserId::generate();
    let (_, token) = fx.open_session(user, "laptop").await;
    fx.open_session(user, "phone").await;
    fx.open_session(UserId::generate(), "stranger").await;

    let devices = fx.service.list(&token).await.unwrap();
    let titles: Vec<&str> = devices.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(devices.len(), 2);
    assert!(titles.contains(&"laptop"));
    assert!(titles.contains(&"phone"));
}

#[tokio::test]
async fn list_drops_expired_sessions() {
    let fx = fixture();
    let user = UserId::generate();
    let (_, token) = fx.open_session(user, "laptop").await;

    // 手工落一条已过期的会话
    let now = fx.clock.now();
    let expired = DeviceSession::start(
        DeviceId::generate(),
        user,
        "10.0.0.1",
        "old-phone",
        now - Duration::seconds(60),
        now - Duration::seconds(1),
    );
    fx.sessions.create(expired).await.unwrap();

    let devices = fx.service.list(&token).await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].title, "laptop");
}

#[tokio::test]
async fn delete_others_keeps_current_device() {
    let fx = fixture();
    let user = UserId::generate();
    let (current, token) = fx.open_session(user, "laptop").await;
    fx.open_session(user, "phone").await;
    fx.open_session(user, "tablet").await;
    let (other_device, _) = fx.open_session(UserId::generate(), "stranger").await;

    fx.service.delete_others(&token).await.unwrap();

    let remaining = fx.sessions.list_by_user(user).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].device_id, current);
    // 其他用户的会话不受影响
    assert!(fx
        .sessions
        .find_by_device(other_device)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn delete_device_removes_own_session() {
    let fx = fixture();
    let user = UserId::generate();
    let (_, token) = fx.open_session(user, "laptop").await;
    let (phone, _) = fx.open_session(user, "phone").await;

    fx.service
        .delete_device(&token, Uuid::from(phone))
        .await
        .unwrap();
    assert!(fx.sessions.find_by_device(phone).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_foreign_device_is_forbidden() {
    let fx = fixture();
    let (_, token) = fx.open_session(UserId::generate(), "laptop").await;
    let (foreign, _) = fx.open_session(UserId::generate(), "stranger").await;

    let result = fx.service.delete_device(&token, Uuid::from(foreign)).await;
    assert!(matches!(result, Err(ApplicationError::Forbidden)));
    // 会话原样保留
    assert!(fx.sessions.find_by_device(foreign).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_unknown_device_is_not_found() {
    let fx = fixture();
    let (_, token) = fx.open_session(UserId::generate(), "laptop").await;

    let result = fx.service.delete_device(&token, Uuid::new_v4()).await;
    assert!(matches!(result, Err(ApplicationError::NotFound)));
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let fx = fixture();
    let result = fx.service.list("not-a-token").await;
    assert!(matches!(result, Err(ApplicationError::Authentication)));
}

#[tokio::test]
async fn token_for_revoked_session_is_unauthorized() {
    let fx = fixture();
    let user = UserId::generate();
    let (device, token) = fx.open_session(user, "laptop").await;
    fx.sessions.delete(device).await.unwrap();

    let result = fx.service.list(&token).await;
    assert!(matches!(result, Err(ApplicationError::Authentication)));
}

#[tokio::test]
async fn stale_token_after_rotation_is_unauthorized() {
    let fx = fixture();
    let user = UserId::generate();
    let (device, token) = fx.open_session(user, "laptop").await;

    // 模拟刷新旋转：会话的旋转标记前移，旧令牌的 iat 不再匹配
    let mut session = fx.sessions.find_by_device(device).await.unwrap().unwrap();
    let rotated_at = fx.clock.now() + Duration::seconds(5);
    session.rotate("10.0.0.1", rotated_at, rotated_at + Duration::seconds(20));
    fx.sessions.update(session).await.unwrap();

    let result = fx.service.list(&token).await;
    assert!(matches!(result, Err(ApplicationError::Authentication)));
}
