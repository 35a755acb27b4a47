//! Resolving bearer tokens from application state.
use crate::CallSpec;
use serde_json::Value;

/// Reads the bearer token for authenticated calls out of the application state.
pub trait AuthResolver<S> {
    fn token(&self, state: &S) -> Option<String>;
}

impl<S, F> AuthResolver<S> for F
where
    F: Fn(&S) -> Option<String>,
{
    fn token(&self, state: &S) -> Option<String> {
        self(state)
    }
}

/// Resolver for applications without authentication.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAuth;

impl<S> AuthResolver<S> for NoAuth {
    fn token(&self, _state: &S) -> Option<String> {
        None
    }
}

/// Token stored as a string at a JSON pointer of a JSON application state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenPointer {
    pointer: String,
}

impl TokenPointer {
    pub fn new(pointer: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
        }
    }

    pub fn pointer(&self) -> &str {
        &self.pointer
    }
}

impl Default for TokenPointer {
    fn default() -> Self {
        Self::new("/login/token")
    }
}

impl AuthResolver<Value> for TokenPointer {
    fn token(&self, state: &Value) -> Option<String> {
        state
            .pointer(&self.pointer)
            .and_then(Value::as_str)
            .map(str::to_owned)
    }
}

/// Copy of `call` with its token attached, if the call requires authentication.
pub fn authenticate<S, A>(call: &CallSpec, resolver: &A, state: &S) -> CallSpec
where
    A: AuthResolver<S> + ?Sized,
{
    let mut call = call.clone();
    if call.requires_authentication {
        call.token = resolver.token(state);
    }
    call
}
