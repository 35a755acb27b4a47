use crate::{Binding, Client, HasCache, ViewProps};
use futures::FutureExt;
use std::{cell::Cell, rc::Rc};
use yew::prelude::*;

/// Fetch the fields declared in `binding` and return their slots.
///
/// Expects a [`Client<S>`] in context, typically provided with `ContextProvider<Client<S>>`.
/// Missing fields are dispatched after every render (mount and update); the component re-renders
/// whenever the store changes.
#[hook]
pub fn use_fetches<P, S>(binding: &Binding<P, S>, props: &P) -> ViewProps
where
    P: Clone + 'static,
    S: HasCache + 'static,
{
    #[cfg(feature = "log")]
    log::debug!("use_fetches({} descriptors)", binding.descriptors().len());
    let client = use_context::<Client<S>>().expect("Client not present");
    let revision = use_state(|| 0usize);

    {
        let client = client.clone();
        let setter = revision.setter();
        let counter = Rc::new(Cell::new(*revision));
        use_effect_with_deps(
            move |_| {
                let subscription = client.store().subscribe(move || {
                    counter.set(counter.get() + 1);
                    setter.set(counter.get());
                });
                move || client.store().unsubscribe(subscription)
            },
            (),
        );
    }

    {
        let client = client.clone();
        let binding = binding.clone();
        let props = props.clone();
        use_effect(move || {
            for fetch in binding.try_to_fetch(&props, &client) {
                wasm_bindgen_futures::spawn_local(fetch.map(|_| ()));
            }
            || ()
        });
    }

    client
        .store()
        .with_state(|state| binding.view_props(props, state))
}
