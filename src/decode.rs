//! The single typed-decode boundary.
//!
//! Backend revisions disagree on whether lists and records arrive bare or
//! wrapped in an envelope object. That drift is absorbed here, once: every
//! response body goes through one of these three functions and comes out as
//! either a typed value or [`ClientError::UnexpectedShape`]. Nothing
//! downstream ever sees raw JSON.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;

/// Strict decode of a single object.
pub fn decode_one<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::shape(format!("{context}: {e}")))
}

/// Decode a list that arrives either as a bare array or wrapped in an object
/// under `wrapper_key`, e.g. `[...]` vs `{"tickets": [...]}`. Anything else
/// is a shape error, never a panic and never a silent empty list.
pub fn decode_list<T: DeserializeOwned>(
    body: &str,
    wrapper_key: &str,
    context: &str,
) -> Result<Vec<T>, ClientError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ClientError::shape(format!("{context}: {e}")))?;

    let items = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => match map.remove(wrapper_key) {
            Some(inner @ Value::Array(_)) => inner,
            _ => {
                return Err(ClientError::shape(format!(
                    "{context}: expected an array or {{{wrapper_key}: [...]}}"
                )))
            }
        },
        _ => {
            return Err(ClientError::shape(format!(
                "{context}: expected an array or {{{wrapper_key}: [...]}}"
            )))
        }
    };

    serde_json::from_value(items).map_err(|e| ClientError::shape(format!("{context}: {e}")))
}

/// Decode an object that arrives either bare or wrapped, e.g. `{...}` vs
/// `{"activity": {...}}`. Both shapes are live on the backend.
pub fn decode_wrapped<T: DeserializeOwned>(
    body: &str,
    wrapper_key: &str,
    context: &str,
) -> Result<T, ClientError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ClientError::shape(format!("{context}: {e}")))?;

    let inner = match value {
        Value::Object(mut map) => match map.remove(wrapper_key) {
            Some(inner @ Value::Object(_)) => inner,
            _ => Value::Object(map),
        },
        other => other,
    };

    serde_json::from_value(inner).map_err(|e| ClientError::shape(format!("{context}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Arena, Ticket};

    const TICKET: &str = r#"{"id":"t1","activity_id":"a1","seat_number":7,"status":"UNPAID"}"#;

    #[test]
    fn list_accepts_bare_array() {
        let body = format!("[{TICKET}]");
        let tickets: Vec<Ticket> = decode_list(&body, "tickets", "list_tickets").unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id, "t1");
    }

    #[test]
    fn list_accepts_wrapped_array() {
        let body = format!(r#"{{"tickets":[{TICKET}]}}"#);
        let tickets: Vec<Ticket> = decode_list(&body, "tickets", "list_tickets").unwrap();
        assert_eq!(tickets.len(), 1);
    }

    #[test]
    fn list_rejects_anything_else() {
        for body in [r#"{"foo":1}"#, r#""tickets""#, "42", r#"{"tickets":7}"#] {
            let res: Result<Vec<Ticket>, _> = decode_list(body, "tickets", "list_tickets");
            assert!(
                matches!(res, Err(ClientError::UnexpectedShape { .. })),
                "body {body:?} should be a shape error"
            );
        }
    }

    #[test]
    fn wrapped_accepts_both_shapes() {
        let bare = r#"{"id":"ar1","title":"Dome","address":"1 Way","capacity":500}"#;
        let arena: Arena = decode_wrapped(bare, "arena", "arena").unwrap();
        assert_eq!(arena.id, "ar1");

        let wrapped = format!(r#"{{"arena":{bare}}}"#);
        let arena: Arena = decode_wrapped(&wrapped, "arena", "arena").unwrap();
        assert_eq!(arena.capacity, 500);
    }

    #[test]
    fn wrapped_reports_field_errors() {
        let res: Result<Arena, _> = decode_wrapped(r#"{"arena":{"id":"x"}}"#, "arena", "arena");
        assert!(matches!(res, Err(ClientError::UnexpectedShape { .. })));
    }
}
