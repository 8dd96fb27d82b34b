//! Password value type with argon2 hashing.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::constants::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use crate::error::{DomainError, DomainResult};

/// Validated plaintext password.
///
/// Construction enforces the length policy; the plaintext never leaves this
/// type except as an argon2 hash.
pub struct Password(String);

impl Password {
    /// Validate and wrap a plaintext password.
    pub fn new(plaintext: impl Into<String>) -> DomainResult<Self> {
        let plaintext = plaintext.into();

        if plaintext.len() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::password(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        if plaintext.len() > MAX_PASSWORD_LENGTH {
            return Err(DomainError::password(format!(
                "Password must be at most {} characters",
                MAX_PASSWORD_LENGTH
            )));
        }

        Ok(Self(plaintext))
    }

    /// Hash the password with argon2 and a fresh salt.
    pub fn hash(&self) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(self.0.as_bytes(), &salt)
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Verify the password against a stored argon2 hash.
    pub fn verify(&self, stored_hash: &str) -> DomainResult<bool> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| DomainError::internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(self.0.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_password() {
        assert!(Password::new("short").is_err());
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let password = Password::new("correct horse battery").unwrap();
        let hash = password.hash().unwrap();

        assert!(password.verify(&hash).unwrap());
        assert!(!Password::new("wrong password!").unwrap().verify(&hash).unwrap());
    }
}
