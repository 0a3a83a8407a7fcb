use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

/// Upper bound for `JWT_TTL_MINUTES` (one year).
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Tokens carry no `exp` claim when unset.
    pub ttl_minutes: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    /// Secret key mixed into every argon2 hash.
    pub hash_salt: Option<String>,
    pub cors_origins: Vec<String>,
    pub upload_dir: PathBuf,
    pub admin_token: Option<String>,
    pub secure_cookies: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let secret = var("JWT_SECRET")
            .or_else(|| var("SECRET_KEY"))
            .context("JWT_SECRET is not set")?;
        let ttl_minutes = var("JWT_TTL_MINUTES")
            .map(|v| parse_ttl_minutes(&v))
            .transpose()?;
        let port = var("APP_PORT")
            .or_else(|| var("SERVER_PORT"))
            .map(|v| v.parse::<u16>().context("APP_PORT must be a port number"))
            .transpose()?
            .unwrap_or(8080);

        Ok(Self {
            database_url,
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            jwt: JwtConfig {
                secret,
                ttl_minutes,
            },
            hash_salt: var("HASH_SALT").filter(|s| !s.is_empty()),
            cors_origins: parse_origins(
                &var("CORS_ORIGINS").unwrap_or_else(|| "http://localhost:3000".into()),
            ),
            upload_dir: var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            admin_token: var("ADMIN_TOKEN").filter(|s| !s.is_empty()),
            secure_cookies: var("ENV").as_deref() == Some("production"),
        })
    }
}

fn parse_ttl_minutes(raw: &str) -> anyhow::Result<i64> {
    let minutes = raw
        .trim()
        .parse::<i64>()
        .context("JWT_TTL_MINUTES must be an integer")?;
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        anyhow::bail!("JWT_TTL_MINUTES must be between 1 and {}", MAX_TTL_MINUTES);
    }
    Ok(minutes)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
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
        AppConfig::from_vars(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_only_required_vars_set() {
        let cfg = load(&[("DATABASE_URL", "postgres://db"), ("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.jwt.ttl_minutes, None);
        assert_eq!(cfg.cors_origins, vec!["http://localhost:3000".to_string()]);
        assert_eq!(cfg.upload_dir, PathBuf::from("uploads"));
        assert!(cfg.hash_salt.is_none());
        assert!(cfg.admin_token.is_none());
        assert!(!cfg.secure_cookies);
    }

    #[test]
    fn legacy_names_are_accepted() {
        let cfg = load(&[
            ("DATABASE_URL", "postgres://db"),
            ("SECRET_KEY", "legacy"),
            ("SERVER_PORT", "4000"),
        ])
        .unwrap();
        assert_eq!(cfg.jwt.secret, "legacy");
        assert_eq!(cfg.port, 4000);
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        let cfg = load(&[
            ("DATABASE_URL", "postgres://db"),
            ("JWT_SECRET", "s"),
            ("CORS_ORIGINS", "http://localhost:3000, https://blog.example.com,"),
            ("ENV", "production"),
        ])
        .unwrap();
        assert_eq!(
            cfg.cors_origins,
            vec!["http://localhost:3000", "https://blog.example.com"]
        );
        assert!(cfg.secure_cookies);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = load(&[("DATABASE_URL", "postgres://db")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = load(&[
            ("DATABASE_URL", "postgres://db"),
            ("JWT_SECRET", "s"),
            ("APP_PORT", "http"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }

    #[test]
    fn ttl_minutes_are_range_checked() {
        let base = [("DATABASE_URL", "postgres://db"), ("JWT_SECRET", "s")];
        let with_ttl = |ttl: &str| {
            let mut pairs = base.to_vec();
            pairs.push(("JWT_TTL_MINUTES", ttl));
            load(&pairs)
        };

        assert_eq!(with_ttl("90").unwrap().jwt.ttl_minutes, Some(90));
        assert_eq!(
            with_ttl(&MAX_TTL_MINUTES.to_string()).unwrap().jwt.ttl_minutes,
            Some(MAX_TTL_MINUTES)
        );
        for bad in ["0", "-5", &i64::MAX.to_string(), "soon"] {
            let err = with_ttl(bad).unwrap_err();
            assert!(err.to_string().contains("JWT_TTL_MINUTES"), "{bad}: {err}");
        }
    }
}
