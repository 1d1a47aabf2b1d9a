//! Access-token claims: a subject, an expiry, and a bag of primitive extras.
//! Used by: security::token.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Claim names owned by the issuer; callers cannot set them through `extra`.
pub const RESERVED_CLAIMS: [&str; 2] = ["sub", "exp"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// What a caller hands to the issuer. The expiry is added at issuance.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    pub subject: String,
    pub extra: BTreeMap<String, ClaimValue>,
}

impl Claims {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// Claims recovered from a token that passed signature and expiry checks.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessClaims {
    pub subject: String,
    pub expires_at: DateTime<Utc>,
    pub extra: BTreeMap<String, ClaimValue>,
}

#[derive(Serialize)]
pub(crate) struct EncodedClaims<'a> {
    sub: &'a str,
    exp: i64,
    #[serde(flatten)]
    extra: BTreeMap<&'a str, &'a ClaimValue>,
}

impl<'a> EncodedClaims<'a> {
    pub(crate) fn new(claims: &'a Claims, expires_at: DateTime<Utc>) -> Self {
        let extra = claims
            .extra
            .iter()
            .filter(|(name, _)| !RESERVED_CLAIMS.contains(&name.as_str()))
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        Self {
            sub: &claims.subject,
            exp: expires_at.timestamp(),
            extra,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct DecodedClaims {
    #[serde(default)]
    sub: Option<String>,
    exp: i64,
    #[serde(flatten)]
    extra: BTreeMap<String, ClaimValue>,
}

impl DecodedClaims {
    pub(crate) fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// `None` when the subject is absent or empty. An empty `sub` names no
    /// principal, so a caller treating it as an identity would authenticate
    /// as nobody in particular.
    pub(crate) fn into_access_claims(self) -> Option<AccessClaims> {
        let expires_at = self.expires_at()?;
        let subject = self.sub.filter(|s| !s.is_empty())?;
        Some(AccessClaims {
            subject,
            expires_at,
            extra: self.extra,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};

    #[test]
    fn encoded_claims_carry_one_exp_and_sub() -> Result<()> {
        let claims = Claims::new("alice")
            .with("exp", 1_i64)
            .with("sub", "mallory")
            .with("role", "editor");
        let expires_at = Utc
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .ok_or_else(|| Error::Internal("timestamp out of range".into()))?;
        let json = serde_json::to_value(EncodedClaims::new(&claims, expires_at))?;
        assert_eq!(
            json,
            serde_json::json!({"sub": "alice", "exp": 1_700_000_000_i64, "role": "editor"})
        );
        Ok(())
    }

    #[test]
    fn encoding_leaves_caller_claims_untouched() {
        let claims = Claims::new("alice").with("exp", 5_i64);
        let before = claims.clone();
        let _ = EncodedClaims::new(&claims, Utc::now());
        assert_eq!(claims, before);
    }

    #[test]
    fn decoded_claims_keep_primitive_extras() -> Result<()> {
        let decoded: DecodedClaims = serde_json::from_value(serde_json::json!({
            "sub": "alice",
            "exp": 1_700_000_000_i64,
            "admin": true,
            "quota": 3,
            "plan": "pro"
        }))?;
        let access = decoded
            .into_access_claims()
            .ok_or_else(|| Error::Internal("claims rejected".into()))?;
        assert_eq!(access.subject, "alice");
        assert_eq!(access.extra.get("admin"), Some(&ClaimValue::Bool(true)));
        assert_eq!(access.extra.get("quota"), Some(&ClaimValue::Int(3)));
        assert_eq!(access.extra.get("plan"), Some(&ClaimValue::Text("pro".into())));
        Ok(())
    }

    #[test]
    fn missing_or_empty_subject_yields_none() -> Result<()> {
        let missing: DecodedClaims = serde_json::from_value(serde_json::json!({"exp": 10}))?;
        assert!(missing.into_access_claims().is_none());
        let empty: DecodedClaims = serde_json::from_value(serde_json::json!({"sub": "", "exp": 10}))?;
        assert!(empty.into_access_claims().is_none());
        Ok(())
    }
}
