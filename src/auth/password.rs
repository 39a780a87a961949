use crate::error::AppError;

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// The `users.password` column, split by how the value has to be checked.
///
/// Accounts created before hashing was introduced still carry their password
/// in clear text. Those are accepted by direct comparison and re-hashed by the
/// caller on the next successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredPassword {
    Hashed(String),
    LegacyPlaintext(String),
    Unset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Match,
    /// Matched a clear-text value that should now be re-hashed.
    MatchNeedsRehash,
    Mismatch,
}

impl StoredPassword {
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            StoredPassword::Unset
        } else if BCRYPT_PREFIXES.iter().any(|prefix| raw.starts_with(prefix)) {
            StoredPassword::Hashed(raw.to_string())
        } else {
            StoredPassword::LegacyPlaintext(raw.to_string())
        }
    }

    pub fn check(&self, candidate: &str) -> PasswordCheck {
        match self {
            StoredPassword::Hashed(hash) => match bcrypt::verify(candidate, hash) {
                Ok(true) => PasswordCheck::Match,
                _ => PasswordCheck::Mismatch,
            },
            StoredPassword::LegacyPlaintext(plain) if plain == candidate => {
                PasswordCheck::MatchNeedsRehash
            }
            _ => PasswordCheck::Mismatch,
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, HASH_COST)?)
}
