// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Password hashing port (spec.md §4.8): "constant-time verifier over a
//! salted slow hash (bcrypt or equivalent)". The concrete adapter uses
//! argon2id; the domain only names the contract so the algorithm choice
//! stays an infrastructure concern.

use crate::entities::PasswordVerifier;
use crate::error::CoreError;

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<PasswordVerifier, CoreError>;

    /// Constant-time comparison; never discloses *which* of (email,
    /// password) was wrong to the caller (spec.md §4.8).
    fn verify(&self, plaintext: &str, verifier: &PasswordVerifier) -> bool;
}
