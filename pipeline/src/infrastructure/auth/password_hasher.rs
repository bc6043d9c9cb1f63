// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Argon2id-backed [`PasswordHasher`] (spec.md §4.8: "constant-time
//! verifier over a salted slow hash").

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::Argon2;
use evidence_domain::entities::PasswordVerifier;
use evidence_domain::error::CoreError;
use evidence_domain::services::PasswordHasher;
use argon2::password_hash::rand_core::OsRng;

#[derive(Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<PasswordVerifier, CoreError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CoreError::internal(format!("password hashing failed: {e}")))?;
        Ok(PasswordVerifier::from_hash(hash.to_string()))
    }

    fn verify(&self, plaintext: &str, verifier: &PasswordVerifier) -> bool {
        let parsed = match PasswordHash::new(verifier.as_str()) {
            Ok(h) => h,
            Err(_) => return false,
        };
        Argon2::default().verify_password(plaintext.as_bytes(), &parsed).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_correct_password() {
        let hasher = Argon2PasswordHasher::new();
        let verifier = hasher.hash("correct horse battery staple").unwrap();
        assert!(hasher.verify("correct horse battery staple", &verifier));
    }

    #[test]
    fn rejects_a_wrong_password() {
        let hasher = Argon2PasswordHasher::new();
        let verifier = hasher.hash("correct horse battery staple").unwrap();
        assert!(!hasher.verify("wrong password", &verifier));
    }

    #[test]
    fn two_hashes_of_the_same_password_differ() {
        let hasher = Argon2PasswordHasher::new();
        let a = hasher.hash("same password").unwrap();
        let b = hasher.hash("same password").unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }
}
