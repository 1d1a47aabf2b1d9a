//! Process settings, read once at startup from the environment.
//! Used by: main, state, security, dependencies, server.

use std::fmt;

use jsonwebtoken::Algorithm;

use crate::error::{Error, Result};

const DEFAULT_APP_NAME: &str = "CreativeFlow AI";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_ALGORITHM: &str = "HS256";
const DEFAULT_EXPIRE_MINUTES: i64 = 30;
const DEFAULT_AWS_REGION: &str = "us-east-1";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// A string that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Signing material and default lifetime for access tokens.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret_key: Secret,
    pub algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
}

impl TokenSettings {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: Secret::new(secret_key),
            algorithm: Algorithm::HS256,
            access_token_expire_minutes: DEFAULT_EXPIRE_MINUTES,
        }
    }
}

/// Argon2 cost parameters. Defaults match the argon2 crate's recommended values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashSettings {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// Credentials for downstream content services. Nothing in this crate calls them.
#[derive(Debug, Clone, Default)]
pub struct ServiceKeys {
    pub openai_api_key: Option<Secret>,
    pub elevenlabs_api_key: Option<Secret>,
    pub stability_api_key: Option<Secret>,
}

#[derive(Debug, Clone)]
pub struct AwsSettings {
    pub access_key_id: Option<Secret>,
    pub secret_access_key: Option<Secret>,
    pub bucket_name: Option<String>,
    pub region: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    pub debug: bool,
    pub bind_addr: String,
    pub database_url: String,
    pub redis_url: String,
    pub token: TokenSettings,
    pub password_hash: PasswordHashSettings,
    pub services: ServiceKeys,
    pub aws: AwsSettings,
    pub cors_origins: Vec<String>,
}

impl Settings {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(Error::Config(format!("failed to read .env: {e}"))),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).and_then(|v| normalize_optional(&v));
        let required = |key: &str| {
            get(key).ok_or_else(|| Error::Config(format!("{key} is required")))
        };

        let algorithm = parse_algorithm(&get("ALGORITHM").unwrap_or_else(|| DEFAULT_ALGORITHM.into()))?;
        let access_token_expire_minutes = match get("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(v) => parse_number::<i64>("ACCESS_TOKEN_EXPIRE_MINUTES", &v)?,
            None => DEFAULT_EXPIRE_MINUTES,
        };
        if access_token_expire_minutes <= 0 {
            return Err(Error::Config("ACCESS_TOKEN_EXPIRE_MINUTES must be positive".into()));
        }
        if chrono::Duration::try_minutes(access_token_expire_minutes).is_none() {
            return Err(Error::Config(format!(
                "ACCESS_TOKEN_EXPIRE_MINUTES {access_token_expire_minutes} is out of range"
            )));
        }

        let defaults = PasswordHashSettings::default();
        let password_hash = PasswordHashSettings {
            memory_kib: parse_or("PASSWORD_HASH_MEMORY_KIB", get("PASSWORD_HASH_MEMORY_KIB"), defaults.memory_kib)?,
            iterations: parse_or("PASSWORD_HASH_ITERATIONS", get("PASSWORD_HASH_ITERATIONS"), defaults.iterations)?,
            parallelism: parse_or("PASSWORD_HASH_PARALLELISM", get("PASSWORD_HASH_PARALLELISM"), defaults.parallelism)?,
        };

        let cors_origins = get("CORS_ORIGINS")
            .map(|v| parse_list(&v))
            .unwrap_or_else(|| vec![DEFAULT_CORS_ORIGIN.to_string()]);

        Ok(Self {
            app_name: get("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.into()),
            debug: get("DEBUG").map(|v| parse_bool(&v)).unwrap_or(false),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            token: TokenSettings {
                secret_key: Secret::new(required("SECRET_KEY")?),
                algorithm,
                access_token_expire_minutes,
            },
            password_hash,
            services: ServiceKeys {
                openai_api_key: get("OPENAI_API_KEY").map(Secret::new),
                elevenlabs_api_key: get("ELEVENLABS_API_KEY").map(Secret::new),
                stability_api_key: get("STABILITY_API_KEY").map(Secret::new),
            },
            aws: AwsSettings {
                access_key_id: get("AWS_ACCESS_KEY_ID").map(Secret::new),
                secret_access_key: get("AWS_SECRET_ACCESS_KEY").map(Secret::new),
                bucket_name: get("AWS_BUCKET_NAME"),
                region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.into()),
            },
            cors_origins,
        })
    }
}

/// Only the HMAC family is accepted: the key is a shared secret.
fn parse_algorithm(value: &str) -> Result<Algorithm> {
    match value.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(Error::Config(format!(
            "unsupported ALGORITHM '{other}', expected HS256, HS384 or HS512"
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::Config(format!("invalid {key} '{value}': {e}")))
}

fn parse_or<T: std::str::FromStr>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T::Err: fmt::Display,
{
    value.map_or(Ok(default), |v| parse_number(key, &v))
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter_map(normalize_optional)
        .collect()
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DATABASE_URL", "sqlite://creativeflow.db"),
        ("REDIS_URL", "redis://127.0.0.1:6379/0"),
        ("SECRET_KEY", "s3cret"),
    ];

    #[test]
    fn defaults_apply_when_only_required_set() -> Result<()> {
        let settings = Settings::from_lookup(lookup(&REQUIRED))?;
        assert_eq!(settings.app_name, "CreativeFlow AI");
        assert!(!settings.debug);
        assert_eq!(settings.token.algorithm, Algorithm::HS256);
        assert_eq!(settings.token.access_token_expire_minutes, 30);
        assert_eq!(settings.token.secret_key.expose(), "s3cret");
        assert_eq!(settings.aws.region, "us-east-1");
        assert_eq!(settings.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(settings.password_hash, PasswordHashSettings::default());
        assert!(settings.services.openai_api_key.is_none());
        Ok(())
    }

    #[test]
    fn missing_secret_is_config_error() {
        let result = Settings::from_lookup(lookup(&REQUIRED[..2]));
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("SECRET_KEY")));
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[2] = ("SECRET_KEY", "   ");
        assert!(Settings::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn overrides_are_parsed() -> Result<()> {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("ALGORITHM", "hs512"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "90"),
            ("DEBUG", "yes"),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
            ("PASSWORD_HASH_ITERATIONS", "3"),
        ]);
        let settings = Settings::from_lookup(lookup(&pairs))?;
        assert_eq!(settings.token.algorithm, Algorithm::HS512);
        assert_eq!(settings.token.access_token_expire_minutes, 90);
        assert!(settings.debug);
        assert_eq!(settings.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(settings.password_hash.iterations, 3);
        Ok(())
    }

    #[test]
    fn asymmetric_algorithm_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ALGORITHM", "RS256"));
        assert!(matches!(Settings::from_lookup(lookup(&pairs)), Err(Error::Config(_))));
    }

    #[test]
    fn non_positive_lifetime_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ACCESS_TOKEN_EXPIRE_MINUTES", "0"));
        assert!(Settings::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn out_of_range_lifetime_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ACCESS_TOKEN_EXPIRE_MINUTES", "9223372036854775807"));
        let result = Settings::from_lookup(lookup(&pairs));
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("out of range")));
    }

    #[test]
    fn non_numeric_lifetime_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ACCESS_TOKEN_EXPIRE_MINUTES", "soon"));
        assert!(Settings::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn secrets_hidden_from_debug() -> Result<()> {
        let settings = Settings::from_lookup(lookup(&REQUIRED))?;
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("Secret(***)"));
        Ok(())
    }
}
