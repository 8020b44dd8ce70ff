use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::JwtConfig, error::ApiError, state::AppState};

/// Session token payload: the user it proves plus the validity window.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: TimeDuration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_days,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: TimeDuration::days(ttl_days),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + self.ttl;
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "session token verified");
        Ok(data.claims)
    }
}

/// Extracts and validates the bearer token, yielding the user id. Rejections
/// carry the wire messages the clients surface verbatim.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::auth("No token"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::auth("Invalid token"))?;

        match keys.verify(token) {
            Ok(claims) => Ok(AuthUser(claims.sub)),
            Err(_) => {
                warn!("invalid or expired token");
                Err(ApiError::auth("Invalid token"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::fake_state;

    fn make_keys() -> JwtKeys {
        JwtKeys::from_ref(&fake_state())
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[tokio::test]
    async fn token_carries_seven_day_expiry() {
        let keys = make_keys();
        let token = keys.sign(Uuid::new_v4()).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        let lifetime = claims.exp - claims.iat;
        assert_eq!(lifetime, 7 * 24 * 60 * 60);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let keys = make_keys();
        // Hand-craft claims that expired two days ago, well past validation
        // leeway.
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: (now - TimeDuration::days(9)).unix_timestamp() as usize,
            exp: (now - TimeDuration::days(2)).unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let keys = make_keys();
        let mut token = keys.sign(Uuid::new_v4()).expect("sign");
        // Corrupt the signature segment.
        token.pop();
        token.push('x');
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn wrong_audience_is_rejected() {
        let keys = make_keys();
        let mut other = make_keys();
        other.audience = "someone-else".into();
        let token = other.sign(Uuid::new_v4()).expect("sign");
        assert!(keys.verify(&token).is_err());
    }
}
