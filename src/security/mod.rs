//! Credential and token service: password hashing plus access-token issue/verify.
//! Used by: state, extract.
//!
//! Every operation is synchronous and reads only the configuration captured at
//! construction, so one instance is shared across all request tasks.

pub mod claims;
pub mod password;
pub mod token;

use chrono::Duration;

use crate::config::Settings;
use crate::error::Result;
use claims::Claims;
use password::PasswordService;
use token::TokenService;

pub struct CredentialService {
    pub tokens: TokenService,
    pub passwords: PasswordService,
}

impl CredentialService {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            tokens: TokenService::new(&settings.token)?,
            passwords: PasswordService::new(&settings.password_hash)?,
        })
    }

    pub fn create_access_token(&self, claims: &Claims, lifetime: Option<Duration>) -> Result<String> {
        self.tokens.create_access_token(claims, lifetime)
    }

    pub fn verify_token(&self, token: &str) -> Option<String> {
        self.tokens.verify_token(token)
    }

    pub fn get_password_hash(&self, password: &str) -> Result<String> {
        self.passwords.hash_password(password)
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        self.passwords.verify_password(password, hash)
    }
}
