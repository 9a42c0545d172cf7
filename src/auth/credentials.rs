use rand::Rng;
use tracing::instrument;

use super::Role;
use crate::error::AppError;
use crate::models::NewUser;

/// Characters a generated password suffix is drawn from. Look-alikes (0/O, 1/l/I) are left out.
pub const PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789!@#$%&*";

pub const PASSWORD_SUFFIX_LEN: usize = 8;

/// Role prefix followed by eight characters from the thread-local CSPRNG.
pub fn generate_password(role: Role) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..PASSWORD_SUFFIX_LEN)
        .map(|_| PASSWORD_CHARSET[rng.random_range(0..PASSWORD_CHARSET.len())] as char)
        .collect();

    format!("{}{}", role.password_prefix(), suffix)
}

#[instrument(skip_all, fields(cost = cost))]
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// A plaintext password and its bcrypt hash. Issued before the store lock is
/// taken so hashing never holds up other requests.
pub struct IssuedPassword {
    pub password: String,
    pub hash: String,
}

impl IssuedPassword {
    pub fn generate(role: Role, cost: u32) -> Result<Self, AppError> {
        Self::from_plain(generate_password(role), cost)
    }

    pub fn from_plain(password: String, cost: u32) -> Result<Self, AppError> {
        let hash = hash_password(&password, cost)?;
        Ok(Self { password, hash })
    }

    /// The password a new account asked for, or a generated one.
    pub fn for_user(input: &NewUser, cost: u32) -> Result<Self, AppError> {
        match &input.password {
            Some(password) => Self::from_plain(password.clone(), cost),
            None => Self::generate(input.role, cost),
        }
    }
}

/// Malformed hashes count as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
