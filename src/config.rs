use std::{net::SocketAddr, str::FromStr};

use anyhow::Context;
use jsonwebtoken::Algorithm;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Argon2id cost parameters. Fixed for the life of the process.
#[derive(Debug, Clone, Copy)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    pub hash: HashConfig,
    pub cookie_secure: bool,
    pub cors_allowed_origins: Vec<String>,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        anyhow::ensure!(!secret.trim().is_empty(), "JWT_SECRET must not be empty");

        let algorithm = parse_hmac_algorithm(
            &std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".into()),
        )?;

        let jwt = JwtConfig {
            secret,
            algorithm,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "appka".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "appka-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", 60),
        };

        let defaults = HashConfig::default();
        let hash = HashConfig {
            memory_kib: env_or("ARGON2_MEMORY_KIB", defaults.memory_kib),
            iterations: env_or("ARGON2_ITERATIONS", defaults.iterations),
            parallelism: env_or("ARGON2_PARALLELISM", defaults.parallelism),
        };

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();

        let bind_addr: SocketAddr = format!(
            "{}:{}",
            std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
        )
        .parse()
        .context("APP_HOST/APP_PORT do not form a socket address")?;

        Ok(Self {
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            jwt,
            hash,
            cookie_secure: env_or("COOKIE_SECURE", false),
            cors_allowed_origins,
            bind_addr,
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Only shared-secret signatures are accepted; the secret never leaves the process.
fn parse_hmac_algorithm(raw: &str) -> anyhow::Result<Algorithm> {
    let alg = Algorithm::from_str(raw.trim())
        .map_err(|e| anyhow::anyhow!("unknown JWT_ALGORITHM {raw:?}: {e}"))?;
    match alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(alg),
        other => anyhow::bail!("JWT_ALGORITHM {other:?} is not an HMAC algorithm"),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hmac_algorithms_only() {
        assert_eq!(parse_hmac_algorithm("HS256").unwrap(), Algorithm::HS256);
        assert_eq!(parse_hmac_algorithm(" HS512 ").unwrap(), Algorithm::HS512);
        assert!(parse_hmac_algorithm("RS256").is_err());
        assert!(parse_hmac_algorithm("none").is_err());
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        let origins = parse_origins("http://a.test, https://b.test ,,");
        assert_eq!(origins, vec!["http://a.test", "https://b.test"]);
        assert!(parse_origins("").is_empty());
    }
}
