use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password must not be empty")]
    Empty,
    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
}

/// Salted bcrypt hash. A new salt is drawn on every call.
pub fn hash_password(pw: &str, cost: u32) -> Result<String, PasswordError> {
    if pw.is_empty() {
        return Err(PasswordError::Empty);
    }
    Ok(bcrypt::hash(pw, cost)?)
}

pub fn verify_password(pw: &str, hash: &str) -> Result<bool, PasswordError> {
    Ok(bcrypt::verify(pw, hash)?)
}
