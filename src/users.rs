use std::collections::HashMap;

use crate::config::{MAX_BIO_LENGTH, MAX_HANDLE_LENGTH, MIN_PASSWORD_LENGTH};
use crate::core::errors::{StoreError, StoreResult};
use crate::models::models::Profile;

/// Profiles keyed by handle. Registration is reject-on-duplicate.
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: HashMap<String, Profile>,
}

/// Input checks that do not need the store. Run before the (slow) hash so the
/// caller can fail fast without taking any lock.
pub fn validate_registration(handle: &str, bio: &str, raw_password: &str) -> StoreResult<()> {
    if handle.is_empty() {
        return Err(StoreError::InvalidInput("Handle is required".to_string()));
    }
    if handle.chars().count() > MAX_HANDLE_LENGTH {
        return Err(StoreError::InvalidInput(format!(
            "Handle must be at most {} characters",
            MAX_HANDLE_LENGTH
        )));
    }
    if handle.chars().any(char::is_whitespace) {
        return Err(StoreError::InvalidInput("Handle must not contain whitespace".to_string()));
    }
    if raw_password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(StoreError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if bio.chars().count() > MAX_BIO_LENGTH {
        return Err(StoreError::InvalidInput(format!(
            "Bio too long (max {} chars)",
            MAX_BIO_LENGTH
        )));
    }
    Ok(())
}

impl ProfileStore {
    pub fn contains(&self, handle: &str) -> bool {
        self.profiles.contains_key(handle)
    }

    pub fn insert(&mut self, profile: Profile) -> StoreResult<&Profile> {
        if self.profiles.contains_key(&profile.handle) {
            return Err(StoreError::AlreadyExists(format!(
                "Handle {} is already registered",
                profile.handle
            )));
        }
        let handle = profile.handle.clone();
        let stored: &Profile = self.profiles.entry(handle).or_insert(profile);
        Ok(stored)
    }

    pub fn get(&self, handle: &str) -> Option<&Profile> {
        self.profiles.get(handle)
    }

    /// Copy of the stored hash, so verification can run without holding a lock.
    pub fn credential_hash(&self, handle: &str) -> Option<String> {
        self.profiles.get(handle).map(|p| p.credential_hash.clone())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Profiles sorted by handle.
    pub fn all(&self) -> Vec<Profile> {
        let mut profiles: Vec<Profile> = self.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| a.handle.cmp(&b.handle));
        profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(handle: &str) -> Profile {
        Profile {
            handle: handle.to_string(),
            display_name: handle.to_string(),
            email: format!("{}@hello.com", handle),
            bio: String::new(),
            photo_ref: String::new(),
            credential_hash: String::new(),
        }
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut store = ProfileStore::default();
        store.insert(profile("rich")).unwrap();
        let err = store.insert(profile("rich")).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn credential_hash_is_copied_out() {
        let mut store = ProfileStore::default();
        let mut rich = profile("rich");
        rich.credential_hash = "$argon2id$stub".to_string();
        store.insert(rich).unwrap();
        assert_eq!(store.credential_hash("rich").as_deref(), Some("$argon2id$stub"));
        assert_eq!(store.credential_hash("nobody"), None);
    }

    #[test]
    fn registration_validation() {
        assert!(validate_registration("rich", "", "buttons").is_ok());
        assert!(validate_registration("", "", "buttons").is_err());
        assert!(validate_registration("ri ch", "", "buttons").is_err());
        assert!(validate_registration("rich", "", "ab").is_err());
        assert!(validate_registration(&"x".repeat(MAX_HANDLE_LENGTH + 1), "", "buttons").is_err());
        assert!(validate_registration("rich", &"b".repeat(MAX_BIO_LENGTH + 1), "buttons").is_err());
    }
}
