//! Bearer token source.

use std::sync::{PoisonError, RwLock};

/// Supplies the current bearer token. Requests are not issued while it
/// returns `None`.
pub trait AuthProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// In-memory token holder, set after login and cleared on logout.
#[derive(Debug, Default)]
pub struct TokenStore {
    token: RwLock<Option<String>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl AuthProvider for TokenStore {
    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_store_lifecycle() {
        let store = TokenStore::new();
        assert!(store.token().is_none());
        store.set_token("abc");
        assert_eq!(store.token().as_deref(), Some("abc"));
        store.clear();
        assert!(store.token().is_none());
    }

    #[test]
    fn test_empty_token_counts_as_missing() {
        assert!(TokenStore::with_token("").token().is_none());
    }
}
