use serde_json::Value;

use crate::{ClientError, Params};

/// Successful call payload.
pub type CallResult = Params;

const UNKNOWN_ERROR: &str = "unknown_error";

/// Decoded API envelope, before it is split into success or failure.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub outcome: Result<CallResult, ClientError>,
    pub warning: Option<String>,
}

/// Decodes a raw response body into a call outcome.
///
/// The body must be a JSON object carrying a boolean `ok` field. A `data`
/// object, when present, becomes the result; otherwise the body minus `ok`.
pub(crate) fn decode(body: &[u8]) -> Envelope {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(error) => {
            return Envelope {
                outcome: Err(ClientError::Protocol(format!("invalid JSON: {error}"))),
                warning: None,
            };
        }
    };

    let Value::Object(mut object) = value else {
        return Envelope {
            outcome: Err(ClientError::Protocol(
                "response is not a JSON object".to_owned(),
            )),
            warning: None,
        };
    };

    let warning = object
        .get("warning")
        .and_then(Value::as_str)
        .map(str::to_owned);

    let outcome = match object.get("ok").map(Value::as_bool) {
        Some(Some(true)) => {
            object.remove("ok");
            match object.remove("data") {
                Some(Value::Object(data)) => Ok(data),
                Some(other) => {
                    object.insert("data".to_owned(), other);
                    Ok(object)
                }
                None => Ok(object),
            }
        }
        Some(Some(false)) => {
            let error = object
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_ERROR)
                .to_owned();
            Err(ClientError::RemoteRejected {
                error,
                response: Value::Object(object),
            })
        }
        Some(None) => Err(ClientError::Protocol(
            "field 'ok' is not a boolean".to_owned(),
        )),
        None => Err(ClientError::Protocol("missing field 'ok'".to_owned())),
    };

    Envelope { outcome, warning }
}
