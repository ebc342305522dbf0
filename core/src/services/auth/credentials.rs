//! External credential collaborators: password hashing and TOTP.
//!
//! Both are consumed through narrow traits so the service can be wired
//! with test doubles; the algorithms themselves are not this crate's
//! concern.

use once_cell::sync::Lazy;

use crate::errors::{DomainError, DomainResult};

/// Password hash compare, consumed as an external collaborator.
pub trait PasswordVerifier: Send + Sync {
    fn hash(&self, password: &str) -> DomainResult<String>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Default bcrypt-backed verifier.
pub struct BcryptVerifier {
    cost: u32,
}

impl BcryptVerifier {
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Lower-cost verifier for tests.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordVerifier for BcryptVerifier {
    fn hash(&self, password: &str) -> DomainResult<String> {
        bcrypt::hash(password, self.cost).map_err(|e| DomainError::Internal {
            message: format!("Password hashing failed: {}", e),
        })
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

/// TOTP code check, consumed as an external collaborator.
pub trait TotpVerifier: Send + Sync {
    fn verify(&self, secret: &str, code: &str, window: u8) -> bool;
}

/// Hash compared against when the presented email matches no account, so
/// the unknown-email and wrong-password paths cost the same and the
/// response cannot be used for account enumeration.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    bcrypt::hash("keystone-timing-equalizer", bcrypt::DEFAULT_COST)
        .expect("bcrypt default cost is valid")
});

pub(crate) fn dummy_hash() -> &'static str {
    &DUMMY_HASH
}
