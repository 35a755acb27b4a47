//! Actions flowing through the store.
//!
//! Actions are a closed sum type: a [`Action::Plain`] application action, a
//! [`Action::Trigger`] carrying a [`CallSpec`], or a [`Action::Lifecycle`] action derived from a
//! trigger. The JSON envelope used by other dispatchers is produced and parsed by
//! [`Action::to_wire`] and [`Action::from_wire`].
use crate::{convention, ActionError, CallSpec};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Lifecycle stage of a fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApiCallType {
    Request,
    Receive,
    Error,
}

impl ApiCallType {
    pub const ALL: [ApiCallType; 3] = [
        ApiCallType::Request,
        ApiCallType::Receive,
        ApiCallType::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiCallType::Request => "REQUEST",
            ApiCallType::Receive => "RECEIVE",
            ApiCallType::Error => "ERROR",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for ApiCallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action asking for a fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerAction {
    pub action_type: String,
    pub call: CallSpec,
}

impl TriggerAction {
    pub fn new(action_type: impl Into<String>, call: CallSpec) -> Self {
        Self {
            action_type: action_type.into(),
            call,
        }
    }

    /// Trigger whose result is cached under `field`.
    pub fn for_field(field: &str, call: CallSpec) -> Self {
        Self::new(convention::marked_type(field), call)
    }

    /// Key identifying which fetch this is.
    pub fn key(&self) -> String {
        self.call.key()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LifecycleEvent {
    Request,
    Receive { data: Value },
    Error { error: String },
}

/// Action derived from a trigger, carrying the key it was issued for.
#[derive(Clone, Debug, PartialEq)]
pub struct LifecycleAction {
    pub origin_type: String,
    pub path: String,
    pub event: LifecycleEvent,
}

impl LifecycleAction {
    fn derive(trigger: &TriggerAction, event: LifecycleEvent) -> Self {
        Self {
            origin_type: trigger.action_type.clone(),
            path: trigger.key(),
            event,
        }
    }

    pub fn request(trigger: &TriggerAction) -> Self {
        Self::derive(trigger, LifecycleEvent::Request)
    }

    pub fn receive(trigger: &TriggerAction, data: Value) -> Self {
        Self::derive(trigger, LifecycleEvent::Receive { data })
    }

    pub fn error(trigger: &TriggerAction, error: impl Into<String>) -> Self {
        Self::derive(
            trigger,
            LifecycleEvent::Error {
                error: error.into(),
            },
        )
    }

    pub fn api_call_type(&self) -> ApiCallType {
        match self.event {
            LifecycleEvent::Request => ApiCallType::Request,
            LifecycleEvent::Receive { .. } => ApiCallType::Receive,
            LifecycleEvent::Error { .. } => ApiCallType::Error,
        }
    }

    pub fn action_type(&self) -> String {
        convention::derived_type(&self.origin_type, self.api_call_type())
    }
}

/// Build the `RECEIVE` a trigger would produce, without performing any call.
///
/// Useful to prime a store with data that is already known.
pub fn simulate_receive(trigger: &TriggerAction, data: Value) -> Action {
    LifecycleAction::receive(trigger, data).into()
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Plain {
        action_type: String,
        fields: Map<String, Value>,
    },
    Trigger(TriggerAction),
    Lifecycle(LifecycleAction),
}

impl Action {
    pub fn plain(action_type: impl Into<String>) -> Self {
        Action::Plain {
            action_type: action_type.into(),
            fields: Map::new(),
        }
    }

    pub fn action_type(&self) -> String {
        match self {
            Action::Plain { action_type, .. } => action_type.clone(),
            Action::Trigger(trigger) => trigger.action_type.clone(),
            Action::Lifecycle(lifecycle) => lifecycle.action_type(),
        }
    }

    /// JSON envelope of this action.
    pub fn to_wire(&self) -> Value {
        let mut object = Map::new();
        object.insert("type".into(), Value::String(self.action_type()));
        match self {
            Action::Plain { fields, .. } => {
                for (key, value) in fields {
                    object.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
            Action::Trigger(trigger) => {
                object.insert("dataApiCall".into(), trigger.call.to_wire());
            }
            Action::Lifecycle(lifecycle) => {
                object.insert("originType".into(), Value::String(lifecycle.origin_type.clone()));
                object.insert(
                    "apiCallType".into(),
                    Value::String(lifecycle.api_call_type().as_str().into()),
                );
                object.insert("path".into(), Value::String(lifecycle.path.clone()));
                match &lifecycle.event {
                    LifecycleEvent::Request => {}
                    LifecycleEvent::Receive { data } => {
                        object.insert("data".into(), data.clone());
                    }
                    LifecycleEvent::Error { error } => {
                        object.insert("error".into(), Value::String(error.clone()));
                    }
                }
            }
        }
        Value::Object(object)
    }

    /// Parse a JSON envelope.
    ///
    /// A lifecycle action with an `apiCallType` other than `REQUEST`, `RECEIVE` or `ERROR` is a
    /// bug in whatever built it and is rejected.
    pub fn from_wire(wire: &Value) -> Result<Self, ActionError> {
        let object = wire.as_object().ok_or(ActionError::NotAnObject)?;
        let action_type = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ActionError::MissingType)?
            .to_owned();

        if let Some(call) = object.get("dataApiCall").filter(|call| !call.is_null()) {
            let call = serde_json::from_value(call.clone()).map_err(|source| {
                ActionError::InvalidCall {
                    action_type: action_type.clone(),
                    source,
                }
            })?;
            return Ok(Action::Trigger(TriggerAction { action_type, call }));
        }

        let Some(origin_type) = object.get("originType").and_then(Value::as_str) else {
            let mut fields = object.clone();
            fields.remove("type");
            return Ok(Action::Plain {
                action_type,
                fields,
            });
        };

        LifecycleAction::from_wire(&action_type, origin_type, object).map(Action::Lifecycle)
    }
}

impl LifecycleAction {
    /// Decode the lifecycle part of an envelope whose `type` and `originType` are already known.
    pub(crate) fn from_wire(
        action_type: &str,
        origin_type: &str,
        object: &Map<String, Value>,
    ) -> Result<Self, ActionError> {
        let missing = |field| ActionError::MissingField {
            action_type: action_type.to_owned(),
            field,
        };
        let tag = object
            .get("apiCallType")
            .and_then(Value::as_str)
            .ok_or_else(|| missing("apiCallType"))?;
        let kind = ApiCallType::parse(tag).ok_or_else(|| ActionError::UnknownApiCallType {
            action_type: action_type.to_owned(),
            api_call_type: tag.to_owned(),
        })?;
        let path = object
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| missing("path"))?
            .to_owned();
        let event = match kind {
            ApiCallType::Request => LifecycleEvent::Request,
            ApiCallType::Receive => LifecycleEvent::Receive {
                data: object.get("data").cloned().unwrap_or(Value::Null),
            },
            ApiCallType::Error => LifecycleEvent::Error {
                error: object
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned(),
            },
        };
        Ok(LifecycleAction {
            origin_type: origin_type.to_owned(),
            path,
            event,
        })
    }
}

impl From<TriggerAction> for Action {
    fn from(trigger: TriggerAction) -> Self {
        Action::Trigger(trigger)
    }
}

impl From<LifecycleAction> for Action {
    fn from(lifecycle: LifecycleAction) -> Self {
        Action::Lifecycle(lifecycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::get;
    use serde_json::json;

    fn weather() -> TriggerAction {
        TriggerAction::new("GET_WEATHER", get("weather"))
    }

    #[test]
    fn request_envelope() {
        let request: Action = LifecycleAction::request(&weather()).into();
        assert_eq!(
            request.to_wire(),
            json!({
                "type": "GET_WEATHER_REQUEST",
                "originType": "GET_WEATHER",
                "apiCallType": "REQUEST",
                "path": "weather"
            })
        );
    }

    #[test]
    fn receive_and_error_envelopes() {
        let receive = simulate_receive(&weather(), json!({"weather": "someResponse"}));
        assert_eq!(receive.action_type(), "GET_WEATHER_RECEIVE");
        assert_eq!(receive.to_wire()["data"], json!({"weather": "someResponse"}));

        let error: Action = LifecycleAction::error(&weather(), "boom").into();
        assert_eq!(error.to_wire()["error"], json!("boom"));
        assert_eq!(error.to_wire()["apiCallType"], json!("ERROR"));
    }

    #[test]
    fn trigger_envelope() {
        let trigger: Action = weather().into();
        assert_eq!(
            trigger.to_wire(),
            json!({"type": "GET_WEATHER", "dataApiCall": {"method": "GET", "path": "weather"}})
        );
        assert_eq!(Action::from_wire(&trigger.to_wire()).unwrap(), trigger);
    }

    #[test]
    fn plain_actions_keep_their_fields() {
        let wire = json!({"type": "LOGOUT", "reason": "expired"});
        let action = Action::from_wire(&wire).unwrap();
        assert!(matches!(&action, Action::Plain { action_type, .. } if action_type == "LOGOUT"));
        assert_eq!(action.to_wire(), wire);
    }

    #[test]
    fn lifecycle_from_wire() {
        let action = Action::from_wire(&json!({
            "type": "SLOT_theWeather_RECEIVE",
            "originType": "SLOT_theWeather",
            "apiCallType": "RECEIVE",
            "path": "getWeather",
            "data": {"temp": "23 degrees"}
        }))
        .unwrap();
        assert_eq!(
            action,
            Action::Lifecycle(LifecycleAction {
                origin_type: "SLOT_theWeather".into(),
                path: "getWeather".into(),
                event: LifecycleEvent::Receive {
                    data: json!({"temp": "23 degrees"})
                },
            })
        );
    }

    #[test]
    fn unknown_api_call_type_is_rejected() {
        let error = Action::from_wire(&json!({
            "type": "SLOT_weather_CANCEL",
            "originType": "SLOT_weather",
            "apiCallType": "CANCEL",
            "path": "weather"
        }))
        .unwrap_err();
        assert!(matches!(
            error,
            ActionError::UnknownApiCallType { ref action_type, ref api_call_type }
                if action_type == "SLOT_weather_CANCEL" && api_call_type == "CANCEL"
        ));
    }

    #[test]
    fn null_call_is_a_plain_action() {
        let wire = json!({"type": "SAVE", "dataApiCall": null});
        let action = Action::from_wire(&wire).unwrap();
        assert!(matches!(&action, Action::Plain { action_type, .. } if action_type == "SAVE"));
        assert_eq!(action.to_wire(), wire);
    }

    #[test]
    fn malformed_envelopes() {
        assert!(matches!(Action::from_wire(&json!([1])), Err(ActionError::NotAnObject)));
        assert!(matches!(Action::from_wire(&json!({"x": 1})), Err(ActionError::MissingType)));
        let without_path = json!({
            "type": "A_REQUEST",
            "originType": "A",
            "apiCallType": "REQUEST"
        });
        assert!(matches!(
            Action::from_wire(&without_path),
            Err(ActionError::MissingField { field: "path", .. })
        ));
        assert!(matches!(
            Action::from_wire(&json!({"type": "A", "dataApiCall": {"path": "x"}})),
            Err(ActionError::InvalidCall { .. })
        ));
    }
}
