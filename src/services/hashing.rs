use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::sync::OnceLock;

/// Argon2id with a configurable work factor. Verification reads the
/// parameters embedded in the stored hash, so raising the cost does not
/// invalidate existing hashes.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Stand-in hash verified when no account matches, so a login for an
    /// unknown email costs the same argon2 work as a wrong password.
    dummy_hash: OnceLock<String>,
}

impl PasswordHasher {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, argon2::Error> {
        Ok(Self {
            params: Params::new(memory_kib, iterations, 1, None)?,
            dummy_hash: OnceLock::new(),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash_password(&self, password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    pub fn verify_password(
        &self,
        password: &str,
        hash: &str,
    ) -> Result<bool, argon2::password_hash::Error> {
        let parsed_hash = PasswordHash::new(hash)?;
        Ok(self
            .argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn dummy_hash(&self) -> Result<&str, argon2::password_hash::Error> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash);
        }
        let hash = self.hash_password("karnya-unknown-account")?;
        Ok(self.dummy_hash.get_or_init(|| hash))
    }

    /// Runs a full verification against the stand-in hash and discards the
    /// outcome.
    pub fn verify_unknown_account(&self, password: &str) -> Result<(), argon2::password_hash::Error> {
        let hash = self.dummy_hash()?;
        self.verify_password(password, hash)?;
        Ok(())
    }
}

impl Default for PasswordHasher {
    // m=8MB, t=2 iterations, p=1 parallelism
    fn default() -> Self {
        Self {
            params: Params::new(8192, 2, 1, None).unwrap_or_default(),
            dummy_hash: OnceLock::new(),
        }
    }
}
