//! Argon2id password hashing.
//! Used by: security.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::config::PasswordHashSettings;
use crate::error::{Error, Result};

pub struct PasswordService {
    params: Params,
}

impl PasswordService {
    pub fn new(settings: &PasswordHashSettings) -> Result<Self> {
        let params = Params::new(
            settings.memory_kib,
            settings.iterations,
            settings.parallelism,
            None,
        )
        .map_err(|e| Error::Config(format!("invalid password hash parameters: {e}")))?;
        Ok(Self { params })
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Produces a PHC string with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::Hashing(e.to_string()))
    }

    /// Checks `password` against `hash` using the parameters embedded in `hash`.
    /// A malformed hash is a mismatch.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "unparseable password hash");
                return false;
            }
        };
        self.hasher()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
