//! Validity tokens.
//!
//! Every handle the facade hands out (symbols, types, scopes) carries the
//! token of the session that produced it. Accessors check that token
//! against the session they are called with; a mismatch or a token that has
//! been invalidated is a caller bug and aborts the operation.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use smol_str::SmolStr;
use thiserror::Error;
use tracing::debug;

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidityError {
    #[error("analysis session {id} is no longer valid: {reason}")]
    Invalidated { id: u64, reason: SmolStr },
    #[error("handle from analysis session {found} used in analysis session {expected}")]
    Foreign { expected: u64, found: u64 },
}

#[derive(Debug)]
enum Lifecycle {
    Valid,
    Invalidated(SmolStr),
}

struct TokenState {
    id: u64,
    lifecycle: RwLock<Lifecycle>,
}

/// Capability tying handles to one analysis snapshot.
#[derive(Clone)]
pub struct ValidityToken(Arc<TokenState>);

impl ValidityToken {
    pub fn new() -> Self {
        let id = NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed);
        Self(Arc::new(TokenState {
            id,
            lifecycle: RwLock::new(Lifecycle::Valid),
        }))
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn is_valid(&self) -> bool {
        matches!(*self.0.lifecycle.read(), Lifecycle::Valid)
    }

    /// Invalidate the token. Later invalidations keep the first reason.
    pub fn invalidate(&self, reason: &str) {
        let mut lifecycle = self.0.lifecycle.write();
        if matches!(*lifecycle, Lifecycle::Valid) {
            debug!(token = self.0.id, reason, "validity token invalidated");
            *lifecycle = Lifecycle::Invalidated(SmolStr::new(reason));
        }
    }

    /// `Ok` when this (active) token is valid and `handle` belongs to it.
    pub fn check(&self, handle: &ValidityToken) -> Result<(), ValidityError> {
        if let Lifecycle::Invalidated(reason) = &*self.0.lifecycle.read() {
            return Err(ValidityError::Invalidated {
                id: self.0.id,
                reason: reason.clone(),
            });
        }
        if self.0.id != handle.0.id {
            return Err(ValidityError::Foreign {
                expected: self.0.id,
                found: handle.0.id,
            });
        }
        Ok(())
    }

    /// Like [`check`](Self::check) but faults on failure.
    #[track_caller]
    pub fn assert_accessible(&self, handle: &ValidityToken) {
        if let Err(error) = self.check(handle) {
            panic!("{error}");
        }
    }
}

impl Default for ValidityToken {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ValidityToken {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for ValidityToken {}

impl fmt::Debug for ValidityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValidityToken({}, valid: {})", self.0.id, self.is_valid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_tokens_differ() {
        let a = ValidityToken::new();
        let b = ValidityToken::new();
        assert_ne!(a, b);
        assert!(a.check(&a).is_ok());
        assert_eq!(
            a.check(&b),
            Err(ValidityError::Foreign { expected: a.id(), found: b.id() })
        );
    }

    #[test]
    fn test_invalidate_keeps_first_reason() {
        let token = ValidityToken::new();
        token.invalidate("file changed");
        token.invalidate("closed");
        let error = token.check(&token).unwrap_err();
        assert_eq!(
            error.to_string(),
            format!("analysis session {} is no longer valid: file changed", token.id())
        );
    }

    #[test]
    #[should_panic(expected = "is no longer valid")]
    fn test_assert_on_invalidated_token_panics() {
        let token = ValidityToken::new();
        let handle = token.clone();
        token.invalidate("closed");
        token.assert_accessible(&handle);
    }
}
