//! End-to-end lifecycle tests against the in-memory store

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

use sp_core::{
    InMemoryTokenRepository, ManualClock, TokenError, TokenRepository, TokenService,
    TokenServiceConfig,
};

fn config() -> TokenServiceConfig {
    TokenServiceConfig {
        jwt_secret: "integration-test-secret".to_string(),
        access_token_ttl: Duration::hours(1),
        ..TokenServiceConfig::default()
    }
}

#[tokio::test]
async fn test_full_token_lifecycle() {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
    let clock = Arc::new(ManualClock::new(t0));
    let repository = Arc::new(InMemoryTokenRepository::new());
    let service = TokenService::with_clock(repository.clone(), config(), clock.clone());

    let pair = service.authenticate("u1").await.unwrap();
    assert_eq!(pair.expires_in, 3600);
    assert_eq!(pair.expires_at, t0 + Duration::seconds(3600));
    assert_eq!(service.validate_token(&pair.access_token).unwrap(), "u1");

    let rotated = service.refresh_tokens(&pair.refresh_token).await.unwrap();
    assert_eq!(service.validate_token(&rotated.access_token).unwrap(), "u1");
    assert_eq!(
        service.refresh_tokens(&pair.refresh_token).await,
        Err(TokenError::TokenRevoked)
    );

    service.logout(&rotated.refresh_token).await.unwrap();
    service.logout(&rotated.refresh_token).await.unwrap();
    assert_eq!(
        service.refresh_tokens(&rotated.refresh_token).await,
        Err(TokenError::TokenRevoked)
    );

    // Access tokens are not revocable; they simply run out
    assert!(service.validate_token(&rotated.access_token).is_ok());
    clock.advance(Duration::hours(1) + Duration::seconds(1));
    assert_eq!(
        service.validate_token(&rotated.access_token),
        Err(TokenError::TokenExpired)
    );

    // Both records expire after a week and are swept
    clock.advance(Duration::days(7));
    assert_eq!(service.sweep_expired().await.unwrap(), 2);
    assert!(repository.is_empty().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_has_exactly_one_winner() {
    let repository = Arc::new(InMemoryTokenRepository::new());
    let service = Arc::new(TokenService::new(repository.clone(), config()));
    let pair = service.authenticate("u1").await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        let token = pair.refresh_token.clone();
        handles.push(tokio::spawn(async move {
            service.refresh_tokens(&token).await
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(rotated) => winners.push(rotated),
            Err(e) => assert_eq!(e, TokenError::TokenRevoked),
        }
    }

    assert_eq!(winners.len(), 1);

    // Exactly one new live record exists next to the revoked original
    let records = repository.records_for_subject("u1").await;
    assert_eq!(records.len(), 2);
    assert_eq!(records.iter().filter(|r| !r.revoked).count(), 1);
    let live = repository
        .find_refresh_token(&winners[0].refresh_token)
        .await
        .unwrap();
    assert!(!live.revoked);
}
