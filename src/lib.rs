//! # Fetch Slots
//!
//! Declarative data fetching for applications built around a store, a reducer and dispatched
//! actions. A trigger action carries a [`CallSpec`]; [`FetchMiddleware`] performs the call and
//! emits `REQUEST`, `RECEIVE` or `ERROR` lifecycle actions; [`SlotReducer`] folds those into one
//! [`Slot`] per field, dropping responses to superseded requests; [`should_fetch`] decides when a
//! field needs a new fetch so that views can declare their data with a [`Binding`] and call it on
//! every render.
//!
//! Everything is single-threaded: state lives in a [`Store`] behind a `RefCell` and futures are
//! `!Send`, matching browser WASM executors.

mod action;
mod auth;
mod binding;
mod call;
mod config;
pub mod convention;
mod error;
mod middleware;
mod policy;
mod reducer;
mod slot;
mod store;
mod transform;
mod transport;
#[cfg(feature = "yew")]
pub mod yew;

pub use crate::{
    action::*, auth::*, binding::*, call::*, config::*, error::*, middleware::*, policy::*,
    reducer::*, slot::*, store::*, transform::*, transport::*,
};
