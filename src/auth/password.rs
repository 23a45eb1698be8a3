use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::error::ApiError;

/// Minimum estimated-strength score accepted at registration.
pub const MIN_STRENGTH_SCORE: u8 = 3;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Estimate password strength on a 0..=4 scale from length and character
/// variety. Scores below [`MIN_STRENGTH_SCORE`] are too guessable.
pub fn strength_score(plain: &str) -> u8 {
    let len = plain.chars().count();
    if len < 8 {
        return if len == 0 { 0 } else { 1 };
    }

    let mut has_lower = false;
    let mut has_upper = false;
    let mut has_digit = false;
    let mut has_other = false;
    for c in plain.chars() {
        if c.is_ascii_lowercase() {
            has_lower = true;
        } else if c.is_ascii_uppercase() {
            has_upper = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        } else {
            has_other = true;
        }
    }
    let classes = [has_lower, has_upper, has_digit, has_other]
        .iter()
        .filter(|&&b| b)
        .count() as u8;

    let mut score = 1;
    if len >= 12 {
        score += 1;
    }
    score += match classes {
        0 | 1 => 0,
        2 => 1,
        _ => 2,
    };
    score.min(4)
}

/// Registration-time gate; not re-applied at login or password change.
pub fn check_strength(plain: &str) -> Result<(), ApiError> {
    if strength_score(plain) < MIN_STRENGTH_SCORE {
        return Err(ApiError::Validation(
            "please choose a stronger password".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn hashes_are_salted() {
        let password = "Secur3P@ssw0rd!";
        let a = hash_password(password).expect("hash a");
        let b = hash_password(password).expect("hash b");
        assert_ne!(a, b);
    }

    #[test]
    fn weak_passwords_score_low() {
        assert!(strength_score("") < MIN_STRENGTH_SCORE);
        assert!(strength_score("abc") < MIN_STRENGTH_SCORE);
        assert!(strength_score("password") < MIN_STRENGTH_SCORE);
        assert!(strength_score("12345678") < MIN_STRENGTH_SCORE);
    }

    #[test]
    fn strong_passwords_pass_the_gate() {
        assert!(check_strength("Secur3P@ssw0rd!").is_ok());
        assert!(check_strength("correct-horse-battery-staple").is_ok());
    }

    #[test]
    fn gate_rejects_weak_passwords() {
        let err = check_strength("password").unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
