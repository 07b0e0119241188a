use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde_json::Value;
use tripwise_backend::{
    auth::{
        TokenError, TokenService,
        password::{PasswordError, hash_secret, hash_secret_blocking, verify_secret},
    },
    models::Role,
};
use uuid::Uuid;

const SECRET: &str = "integration-test-secret";

fn tokens() -> TokenService {
    TokenService::new(SECRET, Duration::hours(72)).unwrap()
}

// --- Password hashing ---

#[test]
fn hash_then_verify_round_trips() {
    let hash = hash_secret("correct horse").unwrap();

    assert!(hash.starts_with("$argon2id$"));
    assert!(verify_secret("correct horse", &hash).unwrap());
    assert!(!verify_secret("battery staple", &hash).unwrap());
}

#[test]
fn same_password_hashes_differently() {
    let first = hash_secret("repeat-me").unwrap();
    let second = hash_secret("repeat-me").unwrap();

    assert_ne!(first, second);
    assert!(verify_secret("repeat-me", &first).unwrap());
    assert!(verify_secret("repeat-me", &second).unwrap());
}

#[test]
fn malformed_hash_is_an_error_not_a_mismatch() {
    let result = verify_secret("anything", "definitely-not-phc");
    assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
}

#[tokio::test]
async fn blocking_variant_produces_verifiable_hash() {
    let hash = hash_secret_blocking("from-async".to_string()).await.unwrap();
    assert!(verify_secret("from-async", &hash).unwrap());
}

// --- Tokens ---

#[test]
fn issued_claims_match_inputs() {
    let service = tokens();
    let user_id = Uuid::new_v4();
    let before = Utc::now().timestamp();

    let token = service
        .issue_with_ttl(user_id, "ana", Role::Admin, Duration::hours(2))
        .unwrap();
    let claims = service.verify(&token).unwrap();

    assert_eq!(claims.user_id, user_id);
    assert_eq!(claims.username, "ana");
    assert_eq!(claims.role, Role::Admin);
    assert!(claims.iat >= before);
    assert_eq!(claims.exp, claims.iat + Duration::hours(2).num_seconds());
}

#[test]
fn default_ttl_is_applied_by_issue() {
    let service = tokens();
    let token = service.issue(Uuid::new_v4(), "budi", Role::User).unwrap();
    let claims = service.verify(&token).unwrap();

    assert_eq!(claims.exp - claims.iat, service.ttl().num_seconds());
}

#[test]
fn already_expired_token_is_rejected() {
    let service = tokens();
    let token = service
        .issue_with_ttl(Uuid::new_v4(), "citra", Role::User, Duration::seconds(-1))
        .unwrap();

    assert_eq!(service.verify(&token), Err(TokenError::Expired));
}

#[test]
fn token_from_another_secret_fails_signature() {
    let other = TokenService::new("a-different-secret", Duration::hours(1)).unwrap();
    let token = other.issue(Uuid::new_v4(), "eve", Role::Admin).unwrap();

    assert_eq!(tokens().verify(&token), Err(TokenError::InvalidSignature));
}

#[test]
fn garbage_is_malformed() {
    for input in ["", "abc", "a.b.c"] {
        assert!(
            matches!(tokens().verify(input), Err(TokenError::Malformed(_))),
            "{input:?} should be malformed"
        );
    }
}

#[test]
fn tokens_decode_with_a_standard_hs256_library() {
    let user_id = Uuid::new_v4();
    let token = tokens().issue(user_id, "dewi", Role::User).unwrap();

    let data = decode::<Value>(
        &token,
        &DecodingKey::from_secret(SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .unwrap();

    assert_eq!(data.header.alg, Algorithm::HS256);
    assert_eq!(data.claims["user_id"], user_id.to_string());
    assert_eq!(data.claims["username"], "dewi");
    assert_eq!(data.claims["role"], "user");
    assert!(data.claims["exp"].is_i64());
}
