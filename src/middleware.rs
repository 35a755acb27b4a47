//! Turning trigger actions into HTTP calls and lifecycle actions.
use crate::{
    authenticate, path_key, should_fetch, Action, AuthResolver, CallSpec, Config, HasCache,
    HttpRequest, HttpResponse, LifecycleAction, SlotReducer, Store, Transformations, Transport,
    TransportError, TriggerAction,
};
use futures::{
    future::{self, LocalBoxFuture},
    FutureExt,
};
use serde_json::Value;
use std::{fmt, rc::Rc};

/// How a dispatch ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Not a trigger; forwarded unchanged.
    Passed,
    /// Not dispatched because the field already covers the key.
    Skipped,
    /// `RECEIVE` applied.
    Received,
    /// `ERROR` applied with this message.
    Failed(String),
}

/// A link of the dispatch chain in front of a [`Store`].
pub trait Middleware<S> {
    /// Forward `action` and start whatever work it triggers.
    ///
    /// Synchronous effects, such as forwarding the action, have happened by the time this
    /// returns. The future finishes the remaining, asynchronous part.
    fn handle(
        self: Rc<Self>,
        store: Rc<Store<S>>,
        action: Action,
    ) -> LocalBoxFuture<'static, Completion>;
}

/// Middleware performing the HTTP call of every trigger action.
///
/// For a trigger it forwards the trigger, applies `REQUEST` immediately, performs the call and
/// then applies either `RECEIVE` (with the body passed through the registered transformation) or
/// `ERROR`. Failures of any kind end up as `ERROR`; the returned future never fails.
pub struct FetchMiddleware<S, T, A> {
    transport: T,
    auth: A,
    transformations: Rc<Transformations<S>>,
    config: Config,
}

impl<S, T, A> FetchMiddleware<S, T, A>
where
    T: Transport,
    A: AuthResolver<S>,
{
    pub fn new(transport: T, auth: A) -> Self {
        Self {
            transport,
            auth,
            transformations: Rc::new(Transformations::new()),
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Share a registry owned elsewhere.
    pub fn with_transformations(mut self, transformations: Rc<Transformations<S>>) -> Self {
        self.transformations = transformations;
        self
    }

    pub fn transformations(&self) -> &Rc<Transformations<S>> {
        &self.transformations
    }

    pub fn register_transformation<F>(&self, action_type: impl Into<String>, transformation: F)
    where
        F: Fn(Value, &S) -> Value + 'static,
    {
        self.transformations.register(action_type, transformation);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn prepare(&self, call: &CallSpec) -> Result<HttpRequest, TransportError> {
        let body = call
            .encoded_body()
            .map_err(|error| TransportError::InvalidRequest(error.to_string()))?;
        Ok(HttpRequest {
            method: call.method,
            url: self.config.resolve_url(&call.key()),
            headers: call.headers(),
            body,
        })
    }

    async fn perform(
        &self,
        store: &Store<S>,
        trigger: &TriggerAction,
        request: HttpRequest,
    ) -> Result<Value, String> {
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(error) => {
                #[cfg(feature = "log")]
                log::warn!("{} failed: {error}", trigger.action_type);
                return Err(error.to_string());
            }
        };
        if !response.ok() {
            #[cfg(feature = "log")]
            log::warn!("{} answered with status {}", trigger.action_type, response.status);
            return Err(error_message(&response));
        }
        let body = response.parse_json().map_err(|error| error.to_string())?;
        Ok(store.with_state(|state| {
            self.transformations
                .apply(&trigger.action_type, body, state)
        }))
    }

    fn complete(
        &self,
        store: &Store<S>,
        trigger: &TriggerAction,
        outcome: Result<Value, String>,
    ) -> Completion {
        match outcome {
            Ok(data) => {
                #[cfg(feature = "log")]
                log::debug!("{} received {}", trigger.action_type, trigger.key());
                store.apply(&LifecycleAction::receive(trigger, data).into());
                Completion::Received
            }
            Err(message) => {
                store.apply(&LifecycleAction::error(trigger, message.clone()).into());
                Completion::Failed(message)
            }
        }
    }
}

impl<S, T, A> Middleware<S> for FetchMiddleware<S, T, A>
where
    S: 'static,
    T: Transport + 'static,
    A: AuthResolver<S> + 'static,
{
    fn handle(
        self: Rc<Self>,
        store: Rc<Store<S>>,
        action: Action,
    ) -> LocalBoxFuture<'static, Completion> {
        store.apply(&action);
        let Action::Trigger(trigger) = action else {
            return future::ready(Completion::Passed).boxed_local();
        };
        #[cfg(feature = "log")]
        log::debug!("{} fetching {}", trigger.action_type, trigger.key());

        let call = store.with_state(|state| authenticate(&trigger.call, &self.auth, state));
        store.apply(&LifecycleAction::request(&trigger).into());
        let request = self.prepare(&call);
        async move {
            let outcome = match request {
                Ok(request) => self.perform(&store, &trigger, request).await,
                Err(error) => Err(error.to_string()),
            };
            self.complete(&store, &trigger, outcome)
        }
        .boxed_local()
    }
}

impl<S, T: fmt::Debug, A: fmt::Debug> fmt::Debug for FetchMiddleware<S, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchMiddleware")
            .field("transport", &self.transport)
            .field("auth", &self.auth)
            .field("transformations", &self.transformations)
            .field("config", &self.config)
            .finish()
    }
}

/// Message of a non-2xx response.
///
/// Servers are expected to answer `{"error": {"message": ...}}`. A top-level `message` or a
/// string `error` is accepted too; anything else yields a generic message with the status.
pub fn error_message(response: &HttpResponse) -> String {
    response
        .parse_json()
        .ok()
        .and_then(|body| {
            body.pointer("/error/message")
                .or_else(|| body.get("message"))
                .or_else(|| body.get("error"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| format!("request failed with status {}", response.status))
}

/// Handle on a store and the middleware in front of it.
pub struct Client<S> {
    store: Rc<Store<S>>,
    middleware: Rc<dyn Middleware<S>>,
}

impl<S> Clone for Client<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            middleware: self.middleware.clone(),
        }
    }
}

impl<S> PartialEq for Client<S> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }
}

impl<S: 'static> Client<S> {
    pub fn new<M: Middleware<S> + 'static>(store: Store<S>, middleware: M) -> Self {
        Self {
            store: Rc::new(store),
            middleware: Rc::new(middleware),
        }
    }

    /// Dispatch through the middleware.
    ///
    /// Synchronous effects happen before this returns; the future resolves once the action has
    /// been fully processed.
    pub fn dispatch(&self, action: impl Into<Action>) -> LocalBoxFuture<'static, Completion> {
        self.middleware
            .clone()
            .handle(self.store.clone(), action.into())
    }

    /// Dispatch `trigger` unless the field it maps to already holds or awaits its key.
    pub fn dispatch_if_necessary(
        &self,
        trigger: TriggerAction,
        reducer: &SlotReducer,
    ) -> LocalBoxFuture<'static, Completion>
    where
        S: HasCache,
    {
        let key = trigger.key();
        let necessary = self.store.with_state(|state| {
            let slot = reducer
                .field_for(&trigger.action_type)
                .and_then(|field| state.cache().get(field));
            should_fetch(slot, Some(&key), path_key)
        });
        if necessary {
            self.dispatch(trigger)
        } else {
            future::ready(Completion::Skipped).boxed_local()
        }
    }

    pub fn store(&self) -> &Rc<Store<S>> {
        &self.store
    }

    pub fn state(&self) -> S
    where
        S: Clone,
    {
        self.store.state()
    }
}

impl<S> fmt::Debug for Client<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}
