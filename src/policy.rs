//! Deciding whether a field needs a new fetch.
use crate::Slot;
use serde_json::Value;

/// Field of a fetched value read by [`default_key`].
pub const DEFAULT_KEY_FIELD: &str = "key";

/// Decide whether fetching `desired_key` is necessary given the current slot.
///
/// `key_of` extracts the key a slot was fetched under. In order:
///
/// 1. No desired key: nothing to fetch.
/// 2. No slot yet: first fetch.
/// 3. Already fetching the desired key: no duplicate.
/// 4. Slot failed: never retried automatically, whatever the key.
/// 5. Otherwise fetch when the slot's key differs from the desired one.
pub fn should_fetch<F>(slot: Option<&Slot>, desired_key: Option<&str>, key_of: F) -> bool
where
    F: Fn(&Slot) -> Option<String>,
{
    let Some(key) = desired_key.filter(|key| !key.is_empty()) else {
        return false;
    };
    let Some(slot) = slot else {
        return true;
    };
    match slot {
        Slot::Fetching { .. } if key_of(slot).as_deref() == Some(key) => false,
        Slot::Error { .. } => {
            #[cfg(feature = "log")]
            log::info!(
                "ignoring request to fetch '{key}' because of previous error: '{}'",
                slot.error().unwrap_or_default()
            );
            false
        }
        _ => key_of(slot).as_deref() != Some(key),
    }
}

/// Key of a slot: the path it was fetched under.
pub fn path_key(slot: &Slot) -> Option<String> {
    Some(slot.path().to_owned())
}

/// Key stored in `field` of a fetched value, falling back to the slot path.
pub fn value_key(field: &str) -> impl Fn(&Slot) -> Option<String> + '_ {
    move |slot| {
        let stored = slot.value().and_then(|value| value.get(field)).map(|key| match key {
            Value::String(key) => key.clone(),
            other => other.to_string(),
        });
        stored.or_else(|| path_key(slot))
    }
}

pub fn default_key(slot: &Slot) -> Option<String> {
    value_key(DEFAULT_KEY_FIELD)(slot)
}
