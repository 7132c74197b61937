// JWT session token generation and validation

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::error::AuthError;

/// Session lifetime: 15 days, in seconds
pub const SESSION_TTL_SECS: i64 = 15 * 24 * 60 * 60;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub iat: i64,    // issued at timestamp
    pub exp: i64,    // expiration timestamp
}

/// Token service for session JWTs (HS256)
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl TokenService {
    /// Create a new TokenService with the server-held signing secret
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: SESSION_TTL_SECS,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a session token for `user_id`, valid for 15 days from now
    pub fn issue(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (unix seconds)
    pub fn issue_at(&self, user_id: Uuid, now: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded user id
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify against an explicit clock. A token is valid strictly before `exp`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Uuid, AuthError> {
        let claims = self.decode_claims(token)?;

        if now >= claims.exp {
            return Err(AuthError::ExpiredToken);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)
    }

    /// Decode and check the signature; expiry is left to the caller's clock
    fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Helper to create a test token service
    fn test_token_service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes")
    }

    #[test]
    fn test_round_trip() {
        let service = test_token_service();
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id).unwrap();
        assert_eq!(service.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn test_session_lasts_fifteen_days() {
        let service = test_token_service();
        let issued = 1_700_000_000;
        let token = service.issue_at(Uuid::new_v4(), issued).unwrap();

        let claims = service.decode_claims(&token).unwrap();
        assert_eq!(claims.iat, issued);
        assert_eq!(claims.exp - claims.iat, 1_296_000);
    }

    #[test]
    fn test_expiry_boundary() {
        let service = test_token_service();
        let user_id = Uuid::new_v4();
        let issued = 1_700_000_000;
        let token = service.issue_at(user_id, issued).unwrap();

        assert_eq!(service.verify_at(&token, issued).unwrap(), user_id);
        assert_eq!(
            service.verify_at(&token, issued + SESSION_TTL_SECS - 1).unwrap(),
            user_id
        );
        assert!(matches!(
            service.verify_at(&token, issued + SESSION_TTL_SECS),
            Err(AuthError::ExpiredToken)
        ));
        assert!(matches!(
            service.verify_at(&token, issued + SESSION_TTL_SECS + 86_400),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn test_token_issued_long_ago_is_rejected_now() {
        let service = test_token_service();
        let issued = Utc::now().timestamp() - SESSION_TTL_SECS - 10;
        let token = service.issue_at(Uuid::new_v4(), issued).unwrap();

        assert!(matches!(service.verify(&token), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let service = test_token_service();

        assert!(service.verify("").is_err());
        assert!(service.verify("not.a.token").is_err());
        assert!(service.verify("invalid_token_format").is_err());
        assert!(service
            .verify("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.invalid.signature")
            .is_err());
    }

    #[test]
    fn test_token_signature_verification() {
        let service1 = TokenService::new("secret1");
        let service2 = TokenService::new("secret2");

        let token = service1.issue(Uuid::new_v4()).unwrap();

        assert!(service1.verify(&token).is_ok());
        assert!(matches!(service2.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_unsigned_token_is_rejected() {
        let service = test_token_service();
        let token = service.issue(Uuid::new_v4()).unwrap();

        // header.payload with the signature stripped, and with alg swapped to none
        let mut parts = token.split('.');
        let header = parts.next().unwrap();
        let payload = parts.next().unwrap();
        assert!(service.verify(&format!("{}.{}.", header, payload)).is_err());

        let none_header = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0";
        assert!(service.verify(&format!("{}.{}.", none_header, payload)).is_err());
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let service = test_token_service();
        let claims = Claims {
            sub: "42".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_purposes".as_bytes()),
        )
        .unwrap();

        assert!(matches!(service.verify(&token), Err(AuthError::InvalidToken)));
    }

    proptest! {
        #[test]
        fn prop_round_trip(bytes in any::<[u8; 16]>()) {
            let service = test_token_service();
            let user_id = Uuid::from_bytes(bytes);

            let token = service.issue(user_id)?;
            prop_assert_eq!(service.verify(&token)?, user_id);
        }

        #[test]
        fn prop_tampered_tokens_rejected(index in any::<prop::sample::Index>(), replacement in "[A-Za-z0-9_-]") {
            let service = test_token_service();
            let token = service.issue(Uuid::new_v4())?;

            let position = index.index(token.len());
            let original = token.as_bytes()[position] as char;
            let replacement = replacement.chars().next().unwrap();
            prop_assume!(original != '.' && replacement != original);

            let mut tampered = token.clone();
            tampered.replace_range(position..position + 1, &replacement.to_string());

            prop_assert!(service.verify(&tampered).is_err());
        }

        #[test]
        fn prop_malformed_tokens_rejected(malformed in "[a-zA-Z0-9]{10,50}") {
            let service = test_token_service();
            prop_assert!(service.verify(&malformed).is_err());
        }
    }
}
