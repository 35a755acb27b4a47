//! Single-threaded state container.
use crate::{Action, Cache};
use std::{
    cell::{Cell, Ref, RefCell},
    fmt,
    rc::Rc,
};

/// State types exposing the fetch cache.
pub trait HasCache {
    fn cache(&self) -> &Cache;
}

impl HasCache for Cache {
    fn cache(&self) -> &Cache {
        self
    }
}

/// Handle returned by [`Store::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Application state plus the reducer folding actions into it.
///
/// [`Store::apply`] is the end of the dispatch chain: middleware hands actions to it once they
/// are done with them. Subscribers are notified after every applied action.
pub struct Store<S> {
    state: RefCell<S>,
    reducer: Box<dyn Fn(&mut S, &Action)>,
    subscribers: RefCell<Vec<(Subscription, Rc<dyn Fn()>)>>,
    next_subscription: Cell<u64>,
}

impl<S> Store<S> {
    pub fn new<R>(initial: S, reducer: R) -> Self
    where
        R: Fn(&mut S, &Action) + 'static,
    {
        Self {
            state: RefCell::new(initial),
            reducer: Box::new(reducer),
            subscribers: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
        }
    }

    /// Reduce `action` into the state and notify subscribers.
    pub fn apply(&self, action: &Action) {
        #[cfg(feature = "log")]
        log::trace!("applying {}", action.action_type());
        {
            let mut state = self.state.borrow_mut();
            (self.reducer)(&mut *state, action);
        }

        // Subscribers may dispatch, so none of our borrows can be held while they run.
        let subscribers: Vec<_> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, subscriber)| subscriber.clone())
            .collect();
        for subscriber in subscribers {
            subscriber();
        }
    }

    pub fn with_state<R, F: FnOnce(&S) -> R>(&self, read: F) -> R {
        read(&*self.state.borrow())
    }

    pub fn borrow(&self) -> Ref<'_, S> {
        self.state.borrow()
    }

    pub fn state(&self) -> S
    where
        S: Clone,
    {
        self.state.borrow().clone()
    }

    pub fn subscribe<F: Fn() + 'static>(&self, subscriber: F) -> Subscription {
        let subscription = Subscription(self.next_subscription.get());
        self.next_subscription.set(subscription.0 + 1);
        self.subscribers
            .borrow_mut()
            .push((subscription, Rc::new(subscriber)));
        subscription
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.subscribers
            .borrow_mut()
            .retain(|(candidate, _)| *candidate != subscription);
    }
}

impl<S: fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state.borrow())
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}
