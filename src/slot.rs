//! Fetch slots and the cache holding them.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fmt};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotState {
    Fetching,
    Fetched,
    Error,
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SlotState::Fetching => "fetching",
            SlotState::Fetched => "fetched",
            SlotState::Error => "error",
        })
    }
}

/// Fetch status of one cached field.
///
/// Every variant remembers the `path` (key) that produced it. Only a fetched slot has a value and
/// only a failed slot has an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Slot<V = Value> {
    Fetching { path: String },
    Fetched { path: String, value: V },
    Error { path: String, error: String },
}

impl<V> Slot<V> {
    pub fn state(&self) -> SlotState {
        match self {
            Slot::Fetching { .. } => SlotState::Fetching,
            Slot::Fetched { .. } => SlotState::Fetched,
            Slot::Error { .. } => SlotState::Error,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Slot::Fetching { path } | Slot::Fetched { path, .. } | Slot::Error { path, .. } => path,
        }
    }

    pub fn value(&self) -> Option<&V> {
        match self {
            Slot::Fetched { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Slot::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self, Slot::Fetching { .. })
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self, Slot::Fetched { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Slot::Error { .. })
    }

    /// Transform the value of a fetched slot, keeping state and path.
    pub fn map_value<W, F: FnOnce(V) -> W>(self, transform: F) -> Slot<W> {
        match self {
            Slot::Fetching { path } => Slot::Fetching { path },
            Slot::Fetched { path, value } => Slot::Fetched {
                path,
                value: transform(value),
            },
            Slot::Error { path, error } => Slot::Error { path, error },
        }
    }
}

/// Slots by field name. A field has no slot until its first request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cache {
    slots: BTreeMap<String, Slot>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Slot> {
        self.slots.get(field)
    }

    /// Replace the slot of `field`, returning the previous one.
    pub fn insert(&mut self, field: impl Into<String>, slot: Slot) -> Option<Slot> {
        self.slots.insert(field.into(), slot)
    }

    pub fn is_fetching(&self, field: &str) -> bool {
        self.get(field).is_some_and(Slot::is_fetching)
    }

    pub fn is_fetched(&self, field: &str) -> bool {
        self.get(field).is_some_and(Slot::is_fetched)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.slots.iter().map(|(field, slot)| (field.as_str(), slot))
    }
}
