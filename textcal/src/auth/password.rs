//! Argon2id password hashing.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
        rand_core::OsRng,
    },
};
use std::sync::Arc;

use super::errors::{AuthError, AuthResult};

/// Default Argon2 memory cost in KiB
pub const DEFAULT_MEMORY_KIB: u32 = Params::DEFAULT_M_COST;
/// Default Argon2 iteration count
pub const DEFAULT_ITERATIONS: u32 = Params::DEFAULT_T_COST;
/// Default Argon2 parallelism
pub const DEFAULT_PARALLELISM: u32 = Params::DEFAULT_P_COST;

/// One-way salted password hasher.
///
/// Produces PHC strings (`$argon2id$v=19$...`) with a fresh random salt per
/// call. A server-side pepper is appended to the password before hashing and
/// verification.
///
/// Cloning is cheap; clones share the pepper.
#[derive(Clone)]
pub struct PasswordHasher {
    pepper: Arc<str>,
    params: Params,
}

impl PasswordHasher {
    /// Create a hasher with the default Argon2id cost parameters.
    pub fn new(pepper: impl Into<String>) -> Self {
        Self::with_params(pepper, Params::default())
    }

    /// Create a hasher with explicit cost parameters.
    pub fn with_params(pepper: impl Into<String>, params: Params) -> Self {
        Self {
            pepper: Arc::from(pepper.into()),
            params,
        }
    }

    /// Create a hasher from raw Argon2id costs.
    ///
    /// # Errors
    ///
    /// * `AuthError::HashingFailed` - a cost is outside the range Argon2 accepts
    pub fn with_cost(
        pepper: impl Into<String>,
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> AuthResult<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::HashingFailed(e.to_string()))?;
        Ok(Self::with_params(pepper, params))
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn peppered(&self, plaintext: &str) -> String {
        format!("{}{}", plaintext, self.pepper)
    }

    /// Hash a password.
    ///
    /// # Errors
    ///
    /// * `AuthError::HashingFailed` - Argon2 rejected the input or parameters
    pub fn hash(&self, plaintext: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Ok(self
            .argon2()
            .hash_password(self.peppered(plaintext).as_bytes(), &salt)
            .map_err(|e| AuthError::HashingFailed(e.to_string()))?
            .to_string())
    }

    /// Check a password against a stored hash.
    ///
    /// The comparison is constant-time. A mismatch is `Ok(false)`, not an error.
    ///
    /// # Errors
    ///
    /// * `AuthError::MalformedHash` - `hash` is not a parseable Argon2 PHC string
    pub fn verify(&self, hash: &str, plaintext: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::MalformedHash)?;

        match self
            .argon2()
            .verify_password(self.peppered(plaintext).as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(_) => Err(AuthError::MalformedHash),
        }
    }

    /// [`hash`](Self::hash) on the blocking thread pool.
    pub async fn hash_blocking(&self, plaintext: String) -> AuthResult<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AuthError::HashingFailed(e.to_string()))?
    }

    /// [`verify`](Self::verify) on the blocking thread pool.
    pub async fn verify_blocking(&self, hash: String, plaintext: String) -> AuthResult<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &plaintext))
            .await
            .map_err(|e| AuthError::HashingFailed(e.to_string()))?
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    // Minimum Argon2 cost keeps the suite fast.
    PasswordHasher::with_cost("test_pepper_for_testing_only", Params::MIN_M_COST, 1, 1)
        .expect("valid argon2 params")
}
