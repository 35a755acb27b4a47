//! Folding lifecycle actions into the cache.
use crate::{convention, Action, ActionError, Cache, LifecycleAction, LifecycleEvent, Slot};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reducer maintaining one [`Slot`] per field.
///
/// Lifecycle actions whose origin type is namespaced (`SLOT_<field>`) update `<field>`. Other
/// trigger types can be tracked by mapping them to a field with [`SlotReducer::with_mapping`].
/// Everything else leaves the cache untouched.
#[derive(Clone, Debug, Default)]
pub struct SlotReducer {
    mappings: BTreeMap<String, String>,
}

impl SlotReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track lifecycle actions of `action_type` under `field`.
    pub fn with_mapping(
        mut self,
        action_type: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        self.mappings.insert(action_type.into(), field.into());
        self
    }

    /// Field updated by lifecycle actions originating from `origin_type`.
    pub fn field_for<'a>(&'a self, origin_type: &'a str) -> Option<&'a str> {
        self.mappings
            .get(origin_type)
            .map(String::as_str)
            .or_else(|| convention::field_name(origin_type))
    }

    pub fn reduce(&self, cache: Cache, action: &Action) -> Cache {
        match action {
            Action::Lifecycle(lifecycle) => match self.field_for(&lifecycle.origin_type) {
                Some(field) => process_lifecycle(field, cache, lifecycle),
                None => cache,
            },
            _ => cache,
        }
    }

    /// Reduce into a cache owned by a larger state.
    pub fn reduce_in_place(&self, cache: &mut Cache, action: &Action) {
        let current = std::mem::take(cache);
        *cache = self.reduce(current, action);
    }

    /// Reduce an action in its JSON form.
    ///
    /// Only actions carrying an `originType` this reducer tracks, and whose `type` is derived from
    /// it, are decoded. Anything else returns the cache unchanged. A tracked action with an
    /// unknown or missing `apiCallType` is an error.
    pub fn reduce_wire(&self, cache: Cache, wire: &Value) -> Result<Cache, ActionError> {
        let Some(object) = wire.as_object() else {
            return Ok(cache);
        };
        let action_type = object.get("type").and_then(Value::as_str);
        let origin_type = object.get("originType").and_then(Value::as_str);
        let (Some(action_type), Some(origin_type)) = (action_type, origin_type) else {
            return Ok(cache);
        };
        if !convention::derives_from(action_type, origin_type) {
            return Ok(cache);
        }
        let Some(field) = self.field_for(origin_type) else {
            return Ok(cache);
        };
        let lifecycle = LifecycleAction::from_wire(action_type, origin_type, object)?;
        Ok(process_lifecycle(field, cache, &lifecycle))
    }
}

/// Apply one lifecycle action to the slot of `field`.
///
/// A `RECEIVE` for a path other than the slot's current one answers a superseded request and is
/// dropped.
pub fn process_lifecycle(field: &str, mut cache: Cache, action: &LifecycleAction) -> Cache {
    let path = action.path.clone();
    let slot = match &action.event {
        LifecycleEvent::Request => Slot::Fetching { path },
        LifecycleEvent::Receive { data } => {
            if let Some(current) = cache.get(field) {
                if current.path() != path {
                    #[cfg(feature = "log")]
                    log::debug!(
                        "discarding stale response for {field}: got {path}, slot is at {}",
                        current.path()
                    );
                    return cache;
                }
            }
            Slot::Fetched {
                path,
                value: data.clone(),
            }
        }
        LifecycleEvent::Error { error } => Slot::Error {
            path,
            error: error.clone(),
        },
    };
    cache.insert(field, slot);
    cache
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{get, TriggerAction};
    use serde_json::json;

    fn trigger(field: &str, path: &str) -> TriggerAction {
        TriggerAction::for_field(field, get(path))
    }

    fn request(field: &str, path: &str) -> Action {
        LifecycleAction::request(&trigger(field, path)).into()
    }

    fn receive(field: &str, path: &str, data: Value) -> Action {
        LifecycleAction::receive(&trigger(field, path), data).into()
    }

    #[test]
    fn initial_cache_is_empty() {
        let cache = SlotReducer::new().reduce(Cache::default(), &Action::plain("INIT"));
        assert!(cache.is_empty());
    }

    #[test]
    fn trigger_does_not_touch_cache() {
        let action = trigger("theWeather", "getWeather").into();
        let cache = SlotReducer::new().reduce(Cache::new(), &action);
        assert!(cache.is_empty());
    }

    #[test]
    fn request_sets_fetching() {
        let cache = SlotReducer::new().reduce(Cache::new(), &request("theWeather", "getWeather"));
        assert_eq!(
            cache.get("theWeather"),
            Some(&Slot::Fetching {
                path: "getWeather".into()
            })
        );
    }

    #[test]
    fn receive_without_slot_sets_fetched() {
        let cache = SlotReducer::new().reduce(
            Cache::new(),
            &receive("theWeather", "getWeather", json!({"temp": "23 degrees"})),
        );
        assert_eq!(
            cache.get("theWeather"),
            Some(&Slot::Fetched {
                path: "getWeather".into(),
                value: json!({"temp": "23 degrees"})
            })
        );
    }

    #[test]
    fn stale_receive_is_discarded() {
        let reducer = SlotReducer::new();
        let fetching = reducer.reduce(Cache::new(), &request("weather", "A"));

        let after_stale = reducer.reduce(fetching.clone(), &receive("weather", "B", json!(1)));
        assert_eq!(after_stale, fetching);

        let after_fresh = reducer.reduce(fetching, &receive("weather", "A", json!(2)));
        assert_eq!(
            after_fresh.get("weather"),
            Some(&Slot::Fetched {
                path: "A".into(),
                value: json!(2)
            })
        );
    }

    #[test]
    fn request_replaces_any_slot() {
        let reducer = SlotReducer::new();
        let cache = reducer.reduce(Cache::new(), &receive("weather", "A", json!(1)));
        let cache = reducer.reduce(cache, &request("weather", "B"));
        assert_eq!(cache.get("weather"), Some(&Slot::Fetching { path: "B".into() }));
    }

    #[test]
    fn error_is_unconditional() {
        let reducer = SlotReducer::new();
        let cache = reducer.reduce(Cache::new(), &request("weather", "A"));
        let failed = LifecycleAction::error(&trigger("weather", "B"), "Not found").into();
        let cache = reducer.reduce(cache, &failed);
        assert_eq!(
            cache.get("weather"),
            Some(&Slot::Error {
                path: "B".into(),
                error: "Not found".into()
            })
        );
    }

    #[test]
    fn fields_are_independent() {
        let reducer = SlotReducer::new();
        let cache = reducer.reduce(Cache::new(), &request("weather", "w"));
        let cache = reducer.reduce(cache, &receive("user", "u", json!("me")));
        assert!(cache.is_fetching("weather"));
        assert!(cache.is_fetched("user"));
    }

    #[test]
    fn unmarked_lifecycle_is_ignored_unless_mapped() {
        let weather = TriggerAction::new("GET_WEATHER", get("weather"));
        let action: Action = LifecycleAction::request(&weather).into();

        assert!(SlotReducer::new().reduce(Cache::new(), &action).is_empty());

        let mapped = SlotReducer::new().with_mapping("GET_WEATHER", "weather");
        assert_eq!(mapped.field_for("GET_WEATHER"), Some("weather"));
        assert!(mapped.reduce(Cache::new(), &action).is_fetching("weather"));
    }

    #[test]
    fn reduce_in_place_updates_owner() {
        let mut cache = Cache::new();
        SlotReducer::new().reduce_in_place(&mut cache, &request("weather", "w"));
        assert!(cache.is_fetching("weather"));
    }

    #[test]
    fn wire_reduce_ignores_unmanaged_actions() {
        let reducer = SlotReducer::new();
        let unmanaged = [
            json!({"type": "AUDIT_LOG", "originType": "LOGIN"}),
            json!({"type": "SAVE", "dataApiCall": {"path": "x"}}),
            json!({"type": "SAVE", "dataApiCall": null}),
            json!({
                "type": "NOT_MANAGED",
                "originType": "SLOT_weather",
                "apiCallType": "REQUEST",
                "path": "w"
            }),
            json!({"type": "GET_WEATHER_REQUEST", "originType": "GET_WEATHER", "path": "w"}),
            json!("INIT"),
        ];
        for wire in unmanaged {
            let cache = reducer.reduce_wire(Cache::new(), &wire).unwrap();
            assert!(cache.is_empty(), "{wire} changed the cache");
        }
    }

    #[test]
    fn wire_reduce_requires_kind_on_managed_actions() {
        let result = SlotReducer::new().reduce_wire(
            Cache::new(),
            &json!({"type": "SLOT_weather_REQUEST", "originType": "SLOT_weather", "path": "w"}),
        );
        assert!(matches!(result, Err(ActionError::MissingField { field: "apiCallType", .. })));
    }

    #[test]
    fn wire_reduce_fails_loudly_on_unknown_kind() {
        let reducer = SlotReducer::new();
        let result = reducer.reduce_wire(
            Cache::new(),
            &json!({
                "type": "SLOT_weather_RETRY",
                "originType": "SLOT_weather",
                "apiCallType": "RETRY",
                "path": "weather"
            }),
        );
        assert!(matches!(result, Err(ActionError::UnknownApiCallType { .. })));

        let cache = reducer
            .reduce_wire(
                Cache::new(),
                &json!({
                    "type": "SLOT_weather_REQUEST",
                    "originType": "SLOT_weather",
                    "apiCallType": "REQUEST",
                    "path": "weather"
                }),
            )
            .unwrap();
        assert!(cache.is_fetching("weather"));
    }
}
