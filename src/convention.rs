//! Wire-level naming of lifecycle action types.
//!
//! A trigger of type `T` produces `T_REQUEST`, `T_RECEIVE` and `T_ERROR`. Triggers built by the
//! binding layer are namespaced as `SLOT_<field>` so the reducer can recover the field name from
//! the origin type alone.
use crate::ApiCallType;

/// Namespace of triggers whose field name is encoded in the type.
pub const MARKER: &str = "SLOT";

fn suffix(kind: ApiCallType) -> &'static str {
    match kind {
        ApiCallType::Request => "_REQUEST",
        ApiCallType::Receive => "_RECEIVE",
        ApiCallType::Error => "_ERROR",
    }
}

pub fn derived_type(origin_type: &str, kind: ApiCallType) -> String {
    format!("{origin_type}{}", suffix(kind))
}

pub fn request_type_for(origin_type: &str) -> String {
    derived_type(origin_type, ApiCallType::Request)
}

pub fn receive_type_for(origin_type: &str) -> String {
    derived_type(origin_type, ApiCallType::Receive)
}

pub fn error_type_for(origin_type: &str) -> String {
    derived_type(origin_type, ApiCallType::Error)
}

/// Split a derived type back into its origin type and lifecycle kind.
pub fn decode_derived(action_type: &str) -> Option<(&str, ApiCallType)> {
    ApiCallType::ALL.iter().find_map(|kind| {
        action_type
            .strip_suffix(suffix(*kind))
            .filter(|origin| !origin.is_empty())
            .map(|origin| (origin, *kind))
    })
}

/// Whether `action_type` is named after `origin_type`, as `<origin>_<stage>` for any stage.
pub fn derives_from(action_type: &str, origin_type: &str) -> bool {
    action_type
        .strip_prefix(origin_type)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|stage| !stage.is_empty())
}

/// Trigger type for a cache field.
pub fn marked_type(field: &str) -> String {
    format!("{MARKER}_{field}")
}

/// Field name encoded in a namespaced origin type, if it is one.
pub fn field_name(origin_type: &str) -> Option<&str> {
    origin_type
        .strip_prefix(MARKER)?
        .strip_prefix('_')
        .filter(|field| !field.is_empty())
}

pub fn is_marked(action_type: &str) -> bool {
    field_name(action_type).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_types_name_their_origin() {
        assert!(derives_from("SLOT_weather_REQUEST", "SLOT_weather"));
        assert!(derives_from("SLOT_weather_RETRY", "SLOT_weather"));
        assert!(!derives_from("NOT_MANAGED", "SLOT_weather"));
        assert!(!derives_from("SLOT_weather", "SLOT_weather"));
        assert!(!derives_from("SLOT_weatherREQUEST", "SLOT_weather"));
    }

    #[test]
    fn derived_names() {
        assert_eq!(request_type_for("GET_WEATHER"), "GET_WEATHER_REQUEST");
        assert_eq!(receive_type_for("GET_WEATHER"), "GET_WEATHER_RECEIVE");
        assert_eq!(error_type_for("GET_WEATHER"), "GET_WEATHER_ERROR");
    }

    #[test]
    fn decode_is_lossless() {
        for origin in ["GET_WEATHER", "SLOT_weather", "SLOT_user_REQUEST_list"] {
            for kind in ApiCallType::ALL {
                let encoded = derived_type(origin, kind);
                assert_eq!(decode_derived(&encoded), Some((origin, kind)));
            }
        }
    }

    #[test]
    fn decode_rejects_plain_types() {
        assert_eq!(decode_derived("GET_WEATHER"), None);
        assert_eq!(decode_derived("_REQUEST"), None);
    }

    #[test]
    fn field_round_trip() {
        for field in ["weather", "theWeather", "user_profile"] {
            let origin = marked_type(field);
            assert!(is_marked(&origin));
            assert_eq!(field_name(&origin), Some(field));
            let receive = receive_type_for(&origin);
            let (decoded, _) = decode_derived(&receive).unwrap();
            assert_eq!(field_name(decoded), Some(field));
        }
    }

    #[test]
    fn unmarked_types() {
        assert_eq!(field_name("GET_WEATHER"), None);
        assert_eq!(field_name("SLOT"), None);
        assert_eq!(field_name("SLOT_"), None);
        assert_eq!(field_name("SLOTTED_x"), None);
        assert!(!is_marked("LOGOUT"));
    }
}
