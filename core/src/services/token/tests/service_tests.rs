//! Issuance, verification and rotation behavior.

use chrono::Duration;

use crate::domain::clock::Clock;
use crate::domain::entities::token::RevocationReason;
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::{SessionRepository, TokenRepository};
use crate::services::token::TokenServiceConfig;

use ks_shared::config::{JwtConfig, VerifyCacheConfig};

use super::{ctx, Harness};

#[tokio::test]
async fn test_issue_and_verify_roundtrip() {
    let h = Harness::new();
    let user = h.seed_user().await;
    let session = h.open_session(user.id).await;

    let (token, issued) = h.service.issue(&user, session.id).unwrap();
    let claims = h.service.verify(&token).await.unwrap();

    assert_eq!(claims, issued);
    assert_eq!(claims.user_id().unwrap(), user.id);
    assert_eq!(claims.session_id().unwrap(), session.id);
}

#[tokio::test]
async fn test_verify_rejects_tampered_token() {
    let h = Harness::new();
    let user = h.seed_user().await;
    let session = h.open_session(user.id).await;

    let (token, _) = h.service.issue(&user, session.id).unwrap();
    let mut tampered = token.clone();
    tampered.pop();

    let result = h.service.verify(&tampered).await;
    assert!(matches!(result, Err(DomainError::Token(_))));
}

#[tokio::test]
async fn test_verify_rejects_pending_token() {
    let h = Harness::new();
    let user = h.seed_user().await;

    let (pending, _) = h.service.issue_pending_token(user.id).unwrap();

    let result = h.service.verify(&pending).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidTokenFormat))
    ));
}

#[tokio::test]
async fn test_decode_pending_token_rejects_access_token() {
    let h = Harness::new();
    let user = h.seed_user().await;
    let session = h.open_session(user.id).await;

    let (pending, _) = h.service.issue_pending_token(user.id).unwrap();
    let (access, _) = h.service.issue(&user, session.id).unwrap();

    assert!(h.service.decode_pending_token(&pending).is_ok());
    assert!(matches!(
        h.service.decode_pending_token(&access),
        Err(DomainError::Token(TokenError::InvalidTokenFormat))
    ));
}

#[tokio::test]
async fn test_revocation_wins_over_warm_cache() {
    let h = Harness::new();
    let user = h.seed_user().await;
    let session = h.open_session(user.id).await;

    let (token, _) = h.service.issue(&user, session.id).unwrap();

    // Warm the cache with a positive outcome
    h.service.verify(&token).await.unwrap();
    assert_eq!(h.service.cache().len(), 1);

    h.service
        .revoke_access_token(&token, RevocationReason::Logout)
        .await
        .unwrap();

    let result = h.service.verify(&token).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::TokenRevoked))
    ));
    // The stale positive slot is dropped on the way out
    assert!(h.service.cache().is_empty());
}

#[tokio::test]
async fn test_warm_cache_does_not_outlive_token_expiry() {
    // Positive cache TTL (300s) deliberately exceeds the access lifetime
    let jwt = JwtConfig::default().with_access_expiry_minutes(1);
    let h = Harness::with_config(TokenServiceConfig::new(jwt, VerifyCacheConfig::default()));
    let user = h.seed_user().await;
    let session = h.open_session(user.id).await;

    let (token, _) = h.service.issue(&user, session.id).unwrap();
    h.service.verify(&token).await.unwrap();
    assert_eq!(h.service.cache().len(), 1);

    h.clock.advance(Duration::seconds(120));

    let result = h.service.verify(&token).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::TokenExpired))
    ));
    assert!(h.service.cache().is_empty());
}

#[tokio::test]
async fn test_revoked_outcome_is_not_cached() {
    let h = Harness::new();
    let user = h.seed_user().await;
    let session = h.open_session(user.id).await;

    let (token, _) = h.service.issue(&user, session.id).unwrap();
    h.service
        .revoke_access_token(&token, RevocationReason::AdminAction)
        .await
        .unwrap();

    let result = h.service.verify(&token).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::TokenRevoked))
    ));
    assert!(h.service.cache().is_empty());
}

#[tokio::test]
async fn test_malformed_token_failure_is_cached() {
    let h = Harness::new();

    let result = h.service.verify("not-a-jwt").await;
    assert!(matches!(result, Err(DomainError::Token(_))));
    assert_eq!(h.service.cache().len(), 1);

    // Second presentation is served from the cache with the same outcome
    let result = h.service.verify("not-a-jwt").await;
    assert!(matches!(result, Err(DomainError::Token(_))));
}

#[tokio::test]
async fn test_refresh_rotates_within_family() {
    let h = Harness::new();
    let user = h.seed_user().await;
    let (session, refresh) = h.login(&user).await;

    let pair = h.service.refresh(&refresh, &ctx()).await.unwrap();
    assert_ne!(pair.refresh_token, refresh);

    let family = h.tokens.find_family(session.family_id).await.unwrap();
    assert_eq!(family.len(), 2);

    let active: Vec<_> = family
        .iter()
        .filter(|t| t.is_active(h.clock.now()))
        .collect();
    assert_eq!(active.len(), 1);

    let old = family.iter().find(|t| t.is_revoked).unwrap();
    assert_eq!(old.replaced_by, Some(active[0].id));
}

#[tokio::test]
async fn test_reuse_of_rotated_value_revokes_family() {
    let h = Harness::new();
    let user = h.seed_user().await;
    let (session, refresh) = h.login(&user).await;

    h.service.refresh(&refresh, &ctx()).await.unwrap();

    // Presenting the rotated-out value again is treated as theft
    let result = h.service.refresh(&refresh, &ctx()).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::RefreshTokenReused))
    ));

    let family = h.tokens.find_family(session.family_id).await.unwrap();
    assert!(family.iter().all(|t| t.is_revoked));
}

#[tokio::test]
async fn test_refresh_unknown_value() {
    let h = Harness::new();

    let result = h.service.refresh("no-such-token", &ctx()).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidRefreshToken))
    ));
}

#[tokio::test]
async fn test_refresh_expired_token() {
    let h = Harness::new();
    let user = h.seed_user().await;
    let (_, refresh) = h.login(&user).await;

    h.clock.advance(Duration::days(8));

    let result = h.service.refresh(&refresh, &ctx()).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::TokenExpired))
    ));
}

#[tokio::test]
async fn test_refresh_rejected_for_inactive_account() {
    let h = Harness::new();
    let user = h.seed_user().await;
    let (session, refresh) = h.login(&user).await;

    h.users.set_active(user.id, false).await;

    let result = h.service.refresh(&refresh, &ctx()).await;
    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::AccountInactive))
    ));

    let family = h.tokens.find_family(session.family_id).await.unwrap();
    assert!(family.iter().all(|t| t.is_revoked));
}

#[tokio::test]
async fn test_refresh_rejected_for_dead_session() {
    let h = Harness::new();
    let user = h.seed_user().await;
    let (session, refresh) = h.login(&user).await;

    h.sessions.deactivate(session.id).await.unwrap();

    let result = h.service.refresh(&refresh, &ctx()).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidRefreshToken))
    ));

    let family = h.tokens.find_family(session.family_id).await.unwrap();
    assert!(family.iter().all(|t| t.is_revoked));
}

#[tokio::test]
async fn test_refresh_touches_session() {
    let h = Harness::new();
    let user = h.seed_user().await;
    let (session, refresh) = h.login(&user).await;

    h.clock.advance(Duration::minutes(10));
    h.service.refresh(&refresh, &ctx()).await.unwrap();

    let updated = h.sessions.find_by_id(session.id).await.unwrap().unwrap();
    assert_eq!(updated.last_active_at, h.clock.now());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_refresh_single_winner() {
    let h = Harness::new();
    let user = h.seed_user().await;
    let (_, refresh) = h.login(&user).await;

    let a = {
        let service = h.service.clone();
        let refresh = refresh.clone();
        tokio::spawn(async move { service.refresh(&refresh, &ctx()).await })
    };
    let b = {
        let service = h.service.clone();
        let refresh = refresh.clone();
        tokio::spawn(async move { service.refresh(&refresh, &ctx()).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    let reuses = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(DomainError::Token(TokenError::RefreshTokenReused))
            )
        })
        .count();

    assert_eq!(wins, 1);
    assert_eq!(reuses, 1);
}

#[tokio::test]
async fn test_revoke_all_for_user_spares_excepted_family() {
    let h = Harness::new();
    let user = h.seed_user().await;
    let (keep_session, keep_refresh) = h.login(&user).await;
    let (_, drop_refresh) = h.login(&user).await;

    let revoked = h
        .service
        .revoke_all_for_user(user.id, Some(keep_session.family_id))
        .await
        .unwrap();
    assert_eq!(revoked, 1);

    assert!(h.service.refresh(&keep_refresh, &ctx()).await.is_ok());
    assert!(h.service.refresh(&drop_refresh, &ctx()).await.is_err());
}

#[tokio::test]
async fn test_issue_pair_persists_only_refresh() {
    let h = Harness::new();
    let user = h.seed_user().await;
    let session = h.open_session(user.id).await;

    let pair = h
        .service
        .issue_pair(&user, session.id, session.family_id, &ctx())
        .await
        .unwrap();

    let family = h.tokens.find_family(session.family_id).await.unwrap();
    assert_eq!(family.len(), 1);
    assert!(family[0].is_active(h.clock.now()));

    let claims = h.service.verify(&pair.access_token).await.unwrap();
    assert_eq!(claims.session_id().unwrap(), session.id);
}
