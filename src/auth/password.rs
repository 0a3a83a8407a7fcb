use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

/// Argon2id with default params, keyed with the configured secret when present.
fn hasher(secret: Option<&str>) -> anyhow::Result<Argon2<'_>> {
    match secret {
        Some(key) => Argon2::new_with_secret(
            key.as_bytes(),
            Algorithm::default(),
            Version::default(),
            Params::default(),
        )
        .map_err(|e| {
            error!(error = %e, "argon2 secret rejected");
            anyhow::anyhow!(e.to_string())
        }),
        None => Ok(Argon2::default()),
    }
}

pub fn hash_password(plain: &str, secret: Option<&str>) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher(secret)?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str, secret: Option<&str>) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(hasher(secret)?
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password, None).expect("hashing should succeed");
        assert!(verify_password(password, &hash, None).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password, None).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash, None).expect("verify should not error"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("password", None).unwrap();
        let b = hash_password("password", None).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn secret_must_match_to_verify() {
        let hash = hash_password("hunter22", Some("pepper")).unwrap();
        assert!(verify_password("hunter22", &hash, Some("pepper")).unwrap());
        assert!(!verify_password("hunter22", &hash, Some("other")).unwrap());
        assert!(!verify_password("hunter22", &hash, None).unwrap());
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash", None).unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
