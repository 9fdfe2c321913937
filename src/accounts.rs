//! Account registration and login, delegating password handling to a
//! [`CredentialHasher`].

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sea_orm::ConnectionTrait;
use tracing::{info, warn};

use crate::entities::users;
use crate::error::{Error, Result};
use crate::store;
use crate::validation::NewUser;

pub const MIN_PASSWORD_LEN: usize = 8;

pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id with the crate's default parameters, stored as a PHC string.
#[derive(Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(hashing_failed)
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                warn!("Stored password hash is unreadable: {}", e);
                false
            }
        }
    }
}

fn hashing_failed(err: argon2::password_hash::Error) -> Error {
    Error::internal(format!("password could not be hashed: {}", err))
}

pub async fn register<C: ConnectionTrait>(
    db: &C,
    hasher: &dyn CredentialHasher,
    username: &str,
    password: &str,
) -> Result<users::Model> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::invalid_argument(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if store::users::find_user_by_username(db, username).await?.is_some() {
        return Err(Error::already_exists(format!("user {}", username.trim())));
    }

    let new_user = NewUser::new(username, hasher.hash(password)?)?;
    let user = store::users::insert_user(db, &new_user).await?;
    info!("Registered user {}", user.id);
    Ok(user)
}

/// Unknown users and wrong passwords fail the same way.
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    hasher: &dyn CredentialHasher,
    username: &str,
    password: &str,
) -> Result<users::Model> {
    match store::users::find_user_by_username(db, username).await? {
        Some(user) if hasher.verify(password, &user.password_hash) => Ok(user),
        _ => Err(Error::not_found("no account matches these credentials")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argon2_round_trip() {
        let hasher = Argon2Hasher::default();
        let hash = hasher.hash("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("correct horse", &hash));
        assert!(!hasher.verify("wrong horse", &hash));
        assert!(!hasher.verify("correct horse", "not a hash"));
    }

    #[test]
    fn test_hashing_failure_is_internal() {
        let err = hashing_failed(argon2::password_hash::Error::Crypto);
        assert!(err.is_internal());
        assert!(!err.is_invalid_argument());
    }
}
