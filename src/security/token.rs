//! HMAC-signed access tokens (JWT).
//! Used by: security.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::config::TokenSettings;
use crate::error::{Error, Result};
use crate::security::claims::{AccessClaims, Claims, DecodedClaims, EncodedClaims};

pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_lifetime: Duration,
}

impl TokenService {
    pub fn new(settings: &TokenSettings) -> Result<Self> {
        let secret = settings.secret_key.expose().as_bytes();
        if secret.is_empty() {
            return Err(Error::Config("secret key must not be empty".into()));
        }
        let default_lifetime = Duration::try_minutes(settings.access_token_expire_minutes)
            .filter(|lifetime| *lifetime > Duration::zero())
            .ok_or_else(|| {
                Error::Config(format!(
                    "token lifetime of {} minutes is out of range",
                    settings.access_token_expire_minutes
                ))
            })?;

        // Expiry is checked by hand against an explicit `now` so that the
        // clock can be injected and no leeway applies.
        let mut validation = Validation::new(settings.algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            algorithm: settings.algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            default_lifetime,
        })
    }

    /// Signs `claims` with an expiry of now plus `lifetime` (or the configured default).
    pub fn create_access_token(&self, claims: &Claims, lifetime: Option<Duration>) -> Result<String> {
        self.issue_at(claims, lifetime, Utc::now())
    }

    pub fn issue_at(
        &self,
        claims: &Claims,
        lifetime: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let lifetime = lifetime.unwrap_or(self.default_lifetime);
        let expires_at = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| Error::Signing(format!("token lifetime {lifetime} overflows expiry")))?;
        let payload = EncodedClaims::new(claims, expires_at);
        encode(&Header::new(self.algorithm), &payload, &self.encoding_key)
            .map_err(|e| Error::Signing(e.to_string()))
    }

    /// Returns the subject of a valid, unexpired token and `None` for anything else.
    pub fn verify_token(&self, token: &str) -> Option<String> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<String> {
        self.decode_at(token, now).map(|claims| claims.subject)
    }

    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Option<AccessClaims> {
        let data = decode::<DecodedClaims>(token, &self.decoding_key, &self.validation)
            .inspect_err(|e| tracing::debug!(error = %e, "token rejected"))
            .ok()?;

        match data.claims.expires_at() {
            Some(expires_at) if now < expires_at => {}
            _ => {
                tracing::debug!("token rejected: expired");
                return None;
            }
        }

        let claims = data.claims.into_access_claims();
        if claims.is_none() {
            tracing::debug!("token rejected: no subject");
        }
        claims
    }
}
