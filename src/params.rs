use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ClientError;

/// Parameter mapping sent with a call.
///
/// Values may be strings, numbers, booleans, or arbitrary JSON blobs.
pub type Params = Map<String, Value>;

/// Name of a remote API operation, for example `team.info`.
///
/// Construction rejects empty identifiers and anything other than dotted
/// names made of ASCII letters, digits, `_` and `-`, so an identifier always
/// maps to one path segment under the API base URL.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodId(String);

impl MethodId {
    /// Validates and wraps a method identifier.
    pub fn new(method: impl Into<String>) -> Result<Self, ClientError> {
        let method = method.into();
        if method.trim().is_empty() {
            return Err(ClientError::InvalidArgument(
                "method identifier must not be empty".to_owned(),
            ));
        }
        let well_formed = method
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !well_formed || method.starts_with('.') || method.contains("..") {
            return Err(ClientError::InvalidArgument(format!(
                "malformed method identifier '{method}'"
            )));
        }
        Ok(Self(method))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MethodId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Merges caller options with the required payload.
///
/// Payload keys win on conflict so required parameters cannot be overridden.
pub fn merge(payload: Option<Params>, options: Option<Params>) -> Params {
    let mut merged = options.unwrap_or_default();
    if let Some(payload) = payload {
        merged.extend(payload);
    }
    merged
}

/// Flattens a parameter mapping into form fields.
///
/// `null` values are dropped. Arrays and objects are sent as JSON text.
pub fn encode(params: &Params) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| {
            let encoded = match value {
                Value::Null => return None,
                Value::String(text) => text.clone(),
                Value::Bool(flag) => flag.to_string(),
                Value::Number(number) => number.to_string(),
                Value::Array(_) | Value::Object(_) => value.to_string(),
            };
            Some((key.clone(), encoded))
        })
        .collect()
}

/// Converts a typed options struct into a [`Params`] mapping.
///
/// Serialization of an options struct that is not a JSON object is a caller
/// bug and is reported as [`ClientError::InvalidArgument`].
pub fn to_params<T: Serialize>(options: &T) -> Result<Params, ClientError> {
    match serde_json::to_value(options) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Params::new()),
        Ok(other) => Err(ClientError::InvalidArgument(format!(
            "options must serialize to an object, got {other}"
        ))),
        Err(error) => Err(ClientError::InvalidArgument(format!(
            "options could not be serialized: {error}"
        ))),
    }
}
