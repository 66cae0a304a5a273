//! JWT issuing and validation. Tokens carry the role-tagged identity; an
//! unrecognized role fails validation rather than defaulting to anything.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

use crate::config::JwtConfig;
use crate::services::access::Identity;

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
}

/// Token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user or client id)
    pub sub: String,
    /// Role tag: "lawyer" or "client"
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            expiry_hours: config.expiry_hours,
        }
    }

    /// Issue an HS256 token for an authenticated identity.
    pub fn issue(&self, identity: &Identity) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.expiry_hours);

        let claims = Claims {
            sub: identity.id().to_string(),
            role: identity.role().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and resolve the identity it carries.
    pub fn validate(&self, token: &str) -> Result<Identity, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        let claims = token_data.claims;

        match claims.role.as_str() {
            "lawyer" => Ok(Identity::Lawyer { id: claims.sub }),
            "client" => Ok(Identity::Client { id: claims.sub }),
            other => Err(AppError::Unauthorized(anyhow::anyhow!(
                "Unrecognized role: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(&JwtConfig {
            secret: "test-secret".to_string(),
            expiry_hours: 24,
        })
    }

    #[test]
    fn lawyer_identity_round_trips() {
        let jwt = service();
        let identity = Identity::Lawyer {
            id: "lawyer-1".to_string(),
        };

        let token = jwt.issue(&identity).expect("issue");
        assert_eq!(jwt.validate(&token).expect("validate"), identity);
    }

    #[test]
    fn client_identity_round_trips() {
        let jwt = service();
        let identity = Identity::Client {
            id: "client-1".to_string(),
        };

        let token = jwt.issue(&identity).expect("issue");
        assert_eq!(jwt.validate(&token).expect("validate"), identity);
    }

    #[test]
    fn garbage_token_is_rejected() {
        let jwt = service();
        assert!(jwt.validate("not-a-token").is_err());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let jwt = service();
        let other = JwtService::new(&JwtConfig {
            secret: "different-secret".to_string(),
            expiry_hours: 24,
        });

        let token = other
            .issue(&Identity::Lawyer {
                id: "lawyer-1".to_string(),
            })
            .expect("issue");

        assert!(jwt.validate(&token).is_err());
    }
}
