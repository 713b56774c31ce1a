//! JWT token validation.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crewchat_core::config::auth::AuthConfig;
use crewchat_core::error::AppError;

use super::claims::Claims;

/// Validates bearer JWT tokens presented on the WebSocket handshake and
/// the fallback HTTP surface.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // seconds of clock-skew tolerance
        // The platform's tokens carry no aud claim.
        validation.validate_aud = false;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token string.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::authentication(format!("Invalid token: {e}")))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::encoder::JwtEncoder;
    use crewchat_core::types::UserId;
    use crewchat_entity::user::UserRole;
    use uuid::Uuid;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_access_ttl_minutes: 15,
        }
    }

    #[test]
    fn round_trips_a_valid_token() {
        let config = test_config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);

        let user_id = UserId::new();
        let token = encoder
            .generate_access_token(user_id, Uuid::new_v4(), UserRole::Employee, "alice")
            .unwrap();

        let claims = decoder.decode(&token).unwrap();
        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.username, "alice");
        assert!(!claims.is_expired());
    }

    #[test]
    fn rejects_token_signed_with_wrong_secret() {
        let encoder = JwtEncoder::new(&AuthConfig {
            jwt_secret: "other-secret".to_string(),
            jwt_access_ttl_minutes: 15,
        });
        let decoder = JwtDecoder::new(&test_config());

        let token = encoder
            .generate_access_token(UserId::new(), Uuid::new_v4(), UserRole::Employee, "mallory")
            .unwrap();

        assert!(decoder.decode(&token).is_err());
    }

    #[test]
    fn rejects_garbage() {
        let decoder = JwtDecoder::new(&test_config());
        assert!(decoder.decode("not.a.jwt").is_err());
    }
}
