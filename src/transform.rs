//! Per-action-type response transformations.
use serde_json::Value;
use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

pub type Transformation<S> = Rc<dyn Fn(Value, &S) -> Value>;

/// Registry of transformations applied to response bodies before they are stored.
///
/// Keyed by trigger action type. Owned by whoever composes the application and shared with the
/// middleware; registering for a type that already has a transformation replaces it.
pub struct Transformations<S> {
    by_type: RefCell<HashMap<String, Transformation<S>>>,
}

impl<S> Default for Transformations<S> {
    fn default() -> Self {
        Self {
            by_type: RefCell::new(HashMap::new()),
        }
    }
}

impl<S> fmt::Debug for Transformations<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let by_type = self.by_type.borrow();
        f.debug_set().entries(by_type.keys()).finish()
    }
}

impl<S> Transformations<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, action_type: impl Into<String>, transformation: F)
    where
        F: Fn(Value, &S) -> Value + 'static,
    {
        let action_type = action_type.into();
        #[cfg(feature = "log")]
        log::debug!("registering transformation for {action_type}");
        self.by_type
            .borrow_mut()
            .insert(action_type, Rc::new(transformation));
    }

    /// Transform `body` with the registration for `action_type`, or return it unchanged.
    ///
    /// The registry is not borrowed while the transformation runs, so it may register.
    pub fn apply(&self, action_type: &str, body: Value, state: &S) -> Value {
        let transformation = self.by_type.borrow().get(action_type).cloned();
        match transformation {
            Some(transformation) => transformation(body, state),
            None => body,
        }
    }

    pub fn contains(&self, action_type: &str) -> bool {
        self.by_type.borrow().contains_key(action_type)
    }

    pub fn len(&self) -> usize {
        self.by_type.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.by_type.borrow_mut().clear();
    }
}
