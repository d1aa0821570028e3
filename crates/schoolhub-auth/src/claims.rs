//! JWT claim structure for access tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Claims embedded in an access token.
///
/// The token carries just enough identity to authorize a request without a
/// database lookup: the user id and the email the user logged in with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: Uuid,
    /// User's email address
    pub email: String,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize() {
        let id = Uuid::new_v4();
        let claims = Claims {
            sub: id,
            email: "ann@example.com".to_string(),
            exp: 1234567890,
            iat: 1234564290,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(&format!(r#""sub":"{}""#, id)));
        assert!(serialized.contains(r#""email":"ann@example.com""#));
    }

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"sub":"6f1c8f5e-3c2b-4f44-9a53-0d5d0b8d2f10","email":"user@test.com","exp":9999999999,"iat":9999996399}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(
            claims.sub,
            Uuid::parse_str("6f1c8f5e-3c2b-4f44-9a53-0d5d0b8d2f10").unwrap()
        );
        assert_eq!(claims.email, "user@test.com");
        assert_eq!(claims.exp, 9999999999);
    }

    #[test]
    fn test_claims_reject_non_uuid_subject() {
        let json = r#"{"sub":"42","email":"user@test.com","exp":9999999999,"iat":0}"#;
        assert!(serde_json::from_str::<Claims>(json).is_err());
    }
}
