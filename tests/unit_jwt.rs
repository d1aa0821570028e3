use schoolhub::schoolhub_auth::{create_access_token, verify_token};
use schoolhub::schoolhub_config::JwtConfig;
use schoolhub::schoolhub_core::ErrorKind;
use uuid::Uuid;

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
    }
}

#[test]
fn test_create_access_token_success() {
    let jwt_config = get_test_jwt_config();

    let token = create_access_token(Uuid::new_v4(), "ann@example.com", &jwt_config).unwrap();

    assert!(!token.is_empty());
    assert_eq!(token.split('.').count(), 3);
}

#[test]
fn test_verify_token_returns_identity() {
    let jwt_config = get_test_jwt_config();
    let user_id = Uuid::new_v4();

    let token = create_access_token(user_id, "ann@example.com", &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.email, "ann@example.com");
}

#[test]
fn test_tokens_for_different_users_differ() {
    let jwt_config = get_test_jwt_config();

    let first = create_access_token(Uuid::new_v4(), "ann@example.com", &jwt_config).unwrap();
    let second = create_access_token(Uuid::new_v4(), "bob@example.com", &jwt_config).unwrap();

    assert_ne!(first, second);
}

#[test]
fn test_verify_token_with_custom_expiry() {
    let jwt_config = JwtConfig {
        access_token_expiry: 60,
        ..get_test_jwt_config()
    };

    let token = create_access_token(Uuid::new_v4(), "ann@example.com", &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.exp - claims.iat, 60);
}

#[test]
fn test_verify_token_tampered_payload() {
    let jwt_config = get_test_jwt_config();
    let token = create_access_token(Uuid::new_v4(), "ann@example.com", &jwt_config).unwrap();
    let other = create_access_token(Uuid::new_v4(), "mallory@example.com", &jwt_config).unwrap();

    let parts: Vec<&str> = token.split('.').collect();
    let other_parts: Vec<&str> = other.split('.').collect();
    let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

    let err = verify_token(&forged, &jwt_config).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidToken);
}

#[test]
fn test_verify_token_wrong_secret() {
    let jwt_config = get_test_jwt_config();
    let token = create_access_token(Uuid::new_v4(), "ann@example.com", &jwt_config).unwrap();

    let wrong_config = JwtConfig {
        secret: "another_secret_key_for_testing".to_string(),
        ..get_test_jwt_config()
    };

    let err = verify_token(&token, &wrong_config).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidToken);
}

#[test]
fn test_verify_token_garbage() {
    let jwt_config = get_test_jwt_config();

    for token in ["", "invalid-token", "a.b.c"] {
        let err = verify_token(token, &jwt_config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken);
    }
}
