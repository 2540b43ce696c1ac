use crate::storage::KvStore;
use std::collections::HashMap;

pub const USERS_KEY: &str = "users";
pub const CURRENT_USER_KEY: &str = "currentUser";

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("invalid signup details")]
    InvalidInput,
    #[error("user already exists: {0}")]
    DuplicateUser(String),
    #[error("invalid username or password")]
    BadCredentials,
    #[error("corrupt user map")]
    CorruptUserMap(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Adds a user to the credential map. Passwords are stored verbatim; there
/// is deliberately no hashing and no strength policy. Success does not log
/// the user in.
pub fn register(
    store: &mut dyn KvStore,
    username: &str,
    password: &str,
    confirm: &str,
) -> Result<(), AuthError> {
    if username.is_empty() || password.is_empty() || password != confirm {
        return Err(AuthError::InvalidInput);
    }
    let mut users = load_users(store)?;
    if users.contains_key(username) {
        return Err(AuthError::DuplicateUser(username.to_string()));
    }
    users.insert(username.to_string(), password.to_string());
    store.set(USERS_KEY, &serde_json::to_string(&users)?)?;
    Ok(())
}

/// Exact string comparison against the stored password. Performs no writes.
pub fn authenticate(
    store: &dyn KvStore,
    username: &str,
    password: &str,
) -> Result<bool, AuthError> {
    let users = load_users(store)?;
    Ok(users.get(username).map(String::as_str) == Some(password))
}

pub fn login(store: &mut dyn KvStore, username: &str) -> Result<(), AuthError> {
    store.set(CURRENT_USER_KEY, username)?;
    Ok(())
}

pub fn logout(store: &mut dyn KvStore) -> Result<(), AuthError> {
    store.remove(CURRENT_USER_KEY)?;
    Ok(())
}

/// Presence of the flag is the whole session model.
pub fn current_user(store: &dyn KvStore) -> Option<String> {
    store.get(CURRENT_USER_KEY)
}

fn load_users(store: &dyn KvStore) -> Result<HashMap<String, String>, AuthError> {
    match store.get(USERS_KEY) {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(HashMap::new()),
    }
}
