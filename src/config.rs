use std::str::FromStr;

use anyhow::Context;
use jsonwebtoken::Algorithm;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        anyhow::ensure!(!secret.trim().is_empty(), "JWT_SECRET must not be empty");

        let algorithm = parse_hmac_algorithm(
            lookup("JWT_ALGORITHM").as_deref().unwrap_or("HS256"),
        )?;

        let ttl_minutes = parse_or("JWT_TTL_MINUTES", lookup("JWT_TTL_MINUTES"), 30i64)?;
        anyhow::ensure!(ttl_minutes > 0, "JWT_TTL_MINUTES must be positive");

        let jwt = JwtConfig {
            secret,
            algorithm,
            ttl_minutes,
        };

        Ok(Self {
            database_url,
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                lookup("DATABASE_MAX_CONNECTIONS"),
                10u32,
            )?,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or("APP_PORT", lookup("APP_PORT"), 8080u16)?,
            jwt,
        })
    }
}

/// Tokens are signed with a shared secret, so only the HMAC family is accepted.
fn parse_hmac_algorithm(name: &str) -> anyhow::Result<Algorithm> {
    let algorithm = Algorithm::from_str(name.trim())
        .with_context(|| format!("unknown JWT_ALGORITHM {name:?}"))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => {
            anyhow::bail!("JWT_ALGORITHM {other:?} needs a key pair; use HS256, HS384 or HS512")
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {v:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/blog"),
        ("JWT_SECRET", "s3cret"),
    ];

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let cfg = load(&REQUIRED).expect("config loads");
        assert_eq!(cfg.jwt.algorithm, Algorithm::HS256);
        assert_eq!(cfg.jwt.ttl_minutes, 30);
        assert_eq!(cfg.database_max_connections, 10);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn secret_is_required() {
        let err = load(&[("DATABASE_URL", "postgres://localhost/blog")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn blank_secret_is_rejected() {
        let err = load(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "   ")]).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("JWT_ALGORITHM", "HS512"),
            ("JWT_TTL_MINUTES", "5"),
            ("APP_PORT", "9000"),
            ("DATABASE_MAX_CONNECTIONS", "3"),
        ]);
        let cfg = load(&pairs).expect("config loads");
        assert_eq!(cfg.jwt.algorithm, Algorithm::HS512);
        assert_eq!(cfg.jwt.ttl_minutes, 5);
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.database_max_connections, 3);
    }

    #[test]
    fn asymmetric_algorithms_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("JWT_ALGORITHM", "RS256"));
        assert!(load(&pairs).is_err());
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("JWT_TTL_MINUTES", "0"));
        assert!(load(&pairs).is_err());
    }

    #[test]
    fn garbage_port_is_reported() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("APP_PORT", "eighty"));
        let err = load(&pairs).unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }
}
