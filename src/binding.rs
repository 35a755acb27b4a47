//! Declaring the fields a view needs.
//!
//! A [`Binding`] is a list of [`FetchDescriptor`]s. Whatever drives the view calls
//! [`Binding::try_to_fetch`] when the view is mounted or updated and renders from
//! [`Binding::view_props`].
use crate::{
    path_key, should_fetch, CallSpec, Client, Completion, HasCache, Slot, TriggerAction,
};
use futures::future::LocalBoxFuture;
use serde_json::Value;
use std::{collections::BTreeMap, fmt, rc::Rc};

/// Slot of every active descriptor, by prop name. `None` means nothing was requested yet.
pub type ViewProps = BTreeMap<String, Option<Slot>>;

/// One field a view needs.
pub struct FetchDescriptor<P, S> {
    prop_name: String,
    store_field_name: String,
    call: Rc<dyn Fn(&P, &S) -> CallSpec>,
    transforming: Rc<dyn Fn(Value) -> Value>,
    on: Rc<dyn Fn(&P, &S) -> bool>,
}

impl<P, S> Clone for FetchDescriptor<P, S> {
    fn clone(&self) -> Self {
        Self {
            prop_name: self.prop_name.clone(),
            store_field_name: self.store_field_name.clone(),
            call: self.call.clone(),
            transforming: self.transforming.clone(),
            on: self.on.clone(),
        }
    }
}

impl<P, S> fmt::Debug for FetchDescriptor<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchDescriptor")
            .field("prop_name", &self.prop_name)
            .field("store_field_name", &self.store_field_name)
            .finish_non_exhaustive()
    }
}

impl<P: 'static, S: 'static> FetchDescriptor<P, S> {
    /// Fetch `prop_name` with the call built by `call`. The cache field defaults to the prop name.
    pub fn new<F>(prop_name: impl Into<String>, call: F) -> Self
    where
        F: Fn(&P, &S) -> CallSpec + 'static,
    {
        let prop_name = prop_name.into();
        Self {
            store_field_name: prop_name.clone(),
            prop_name,
            call: Rc::new(call),
            transforming: Rc::new(|value: Value| value),
            on: Rc::new(|_: &P, _: &S| true),
        }
    }

    /// Store under `field` instead of the prop name.
    pub fn named(mut self, field: impl Into<String>) -> Self {
        self.store_field_name = field.into();
        self
    }

    /// Transform fetched values before handing them to the view.
    pub fn transforming<F: Fn(Value) -> Value + 'static>(mut self, transforming: F) -> Self {
        self.transforming = Rc::new(transforming);
        self
    }

    /// Only fetch and expose this field while `on` holds.
    pub fn on<F: Fn(&P, &S) -> bool + 'static>(mut self, on: F) -> Self {
        self.on = Rc::new(on);
        self
    }
}

impl<P, S> FetchDescriptor<P, S> {
    pub fn prop_name(&self) -> &str {
        &self.prop_name
    }

    pub fn store_field_name(&self) -> &str {
        &self.store_field_name
    }

    pub fn is_active(&self, props: &P, state: &S) -> bool {
        (self.on)(props, state)
    }

    pub fn trigger(&self, props: &P, state: &S) -> TriggerAction {
        TriggerAction::for_field(&self.store_field_name, (self.call)(props, state))
    }
}

pub struct Binding<P, S> {
    descriptors: Vec<FetchDescriptor<P, S>>,
}

impl<P, S> Clone for Binding<P, S> {
    fn clone(&self) -> Self {
        Self {
            descriptors: self.descriptors.clone(),
        }
    }
}

impl<P, S> Default for Binding<P, S> {
    fn default() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }
}

impl<P, S> fmt::Debug for Binding<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.descriptors).finish()
    }
}

impl<P, S: HasCache> Binding<P, S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch(mut self, descriptor: FetchDescriptor<P, S>) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn descriptors(&self) -> &[FetchDescriptor<P, S>] {
        &self.descriptors
    }

    /// Triggers that need dispatching for the current props and state.
    pub fn triggers(&self, props: &P, state: &S) -> Vec<TriggerAction> {
        self.descriptors
            .iter()
            .filter(|descriptor| descriptor.is_active(props, state))
            .filter_map(|descriptor| {
                let trigger = descriptor.trigger(props, state);
                let slot = state.cache().get(descriptor.store_field_name());
                should_fetch(slot, Some(&trigger.key()), path_key).then_some(trigger)
            })
            .collect()
    }

    /// Props derived from the cache. Fetched values go through the descriptor's transformation;
    /// fetching and failed slots are exposed unchanged.
    pub fn view_props(&self, props: &P, state: &S) -> ViewProps {
        self.descriptors
            .iter()
            .filter(|descriptor| descriptor.is_active(props, state))
            .map(|descriptor| {
                let slot = state
                    .cache()
                    .get(descriptor.store_field_name())
                    .cloned()
                    .map(|slot| slot.map_value(|value| (descriptor.transforming)(value)));
                (descriptor.prop_name.clone(), slot)
            })
            .collect()
    }

    /// Dispatch every needed trigger.
    ///
    /// All decisions are taken against the same state snapshot and every `REQUEST` is applied
    /// before this returns, so calling it again right away dispatches nothing new.
    pub fn try_to_fetch(
        &self,
        props: &P,
        client: &Client<S>,
    ) -> Vec<LocalBoxFuture<'static, Completion>>
    where
        S: 'static,
    {
        let triggers = client.store().with_state(|state| self.triggers(props, state));
        triggers
            .into_iter()
            .map(|trigger| client.dispatch(trigger))
            .collect()
    }
}
