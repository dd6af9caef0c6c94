//! Subfeed messages.
//!
//! A subfeed carries heterogeneous JSON messages discriminated by their
//! `type` field. Every object tagged `iteration` is an [`Iteration`], with
//! malformed fields decoded leniently; every other shape is kept verbatim as
//! [`Message::Other`]. Decoding a well-formed JSON object never fails.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// Discriminant value marking an iteration message.
pub const ITERATION_KIND: &str = "iteration";

/// Field holding the message discriminant.
const KIND_FIELD: &str = "type";

const TIMESTAMP_FIELD: &str = "timestamp";
const CHAIN_ID_FIELD: &str = "chainId";
const PARAMETERS_FIELD: &str = "parameters";

/// Identifier of the execution chain that produced an iteration.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ChainId {
    Number(Number),
    Text(String),
    /// Present but `null`.
    Null,
    /// Not present on the message.
    #[default]
    Absent,
    /// Booleans, arrays and objects, kept as received.
    Other(Value),
}

impl ChainId {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Number(n) => ChainId::Number(n),
            Value::String(s) => ChainId::Text(s),
            Value::Null => ChainId::Null,
            other => ChainId::Other(other),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ChainId::Absent)
    }
}

impl From<i64> for ChainId {
    fn from(value: i64) -> Self {
        ChainId::Number(value.into())
    }
}

impl From<&str> for ChainId {
    fn from(value: &str) -> Self {
        ChainId::Text(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(ChainId::from_value)
    }
}

impl Serialize for ChainId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ChainId::Number(n) => n.serialize(serializer),
            ChainId::Text(s) => serializer.serialize_str(s),
            ChainId::Null | ChainId::Absent => serializer.serialize_none(),
            ChainId::Other(value) => value.serialize(serializer),
        }
    }
}

/// String form of a chain id, as JavaScript's `value + ''` would print it.
impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainId::Number(n) => f.write_str(&number_text(n)),
            ChainId::Text(s) => f.write_str(s),
            ChainId::Null => f.write_str("null"),
            ChainId::Absent => f.write_str("undefined"),
            ChainId::Other(value) => f.write_str(&value_text(value)),
        }
    }
}

fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        // Integral floats print without a fractional part ("3", not "3.0").
        Some(x) if x == 0.0 => "0".to_string(),
        Some(x) if x.fract() == 0.0 && x.abs() < 1e21 => format!("{:.0}", x),
        Some(x) => x.to_string(),
        None => n.to_string(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::String(s) => s.clone(),
        // Array elements that are null print as nothing.
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => value_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// One unit of progress within a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Iteration {
    /// Epoch seconds, fractional allowed. See [`coerce_timestamp`].
    pub timestamp: f64,
    #[serde(skip_serializing_if = "ChainId::is_absent")]
    pub chain_id: ChainId,
    /// Parameter values in the order the producer emitted them.
    pub parameters: Map<String, Value>,
}

impl Iteration {
    pub fn new(timestamp: f64, chain_id: impl Into<ChainId>, parameters: Map<String, Value>) -> Self {
        Self {
            timestamp,
            chain_id: chain_id.into(),
            parameters,
        }
    }

    /// Read the iteration fields of a message object.
    ///
    /// Never fails: a missing timestamp is NaN, a missing chain id is
    /// [`ChainId::Absent`], and non-object parameters are empty.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            timestamp: object
                .get(TIMESTAMP_FIELD)
                .map(coerce_timestamp)
                .unwrap_or(f64::NAN),
            chain_id: object
                .get(CHAIN_ID_FIELD)
                .cloned()
                .map(ChainId::from_value)
                .unwrap_or_default(),
            parameters: object
                .get(PARAMETERS_FIELD)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

impl<'de> Deserialize<'de> for Iteration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::<String, Value>::deserialize(deserializer).map(|object| Iteration::from_object(&object))
    }
}

/// Numeric value of a timestamp field, following JavaScript arithmetic
/// coercion.
///
/// Numbers pass through, numeric strings are parsed (blank is 0), `null` is
/// 0 and booleans are 0 or 1. Anything else is NaN.
pub fn coerce_timestamp(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_numeric_text(s),
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn parse_numeric_text(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }
    let unsigned = text.strip_prefix(&['+', '-'][..]).unwrap_or(text);
    if unsigned == "Infinity" {
        return if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    // Rust also parses "inf" and "nan", which are not numeric text here.
    let numeric = unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if numeric {
        text.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// A message received on a subfeed.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Iteration(Iteration),
    /// Any message that is not an iteration, kept as received.
    Other {
        kind: Option<String>,
        payload: Value,
    },
}

impl Message {
    /// Classify a raw JSON message by its discriminant alone.
    pub fn from_value(payload: Value) -> Self {
        let kind = payload
            .get(KIND_FIELD)
            .and_then(Value::as_str)
            .map(str::to_owned);

        if kind.as_deref() == Some(ITERATION_KIND) {
            if let Some(object) = payload.as_object() {
                return Message::Iteration(Iteration::from_object(object));
            }
        }

        Message::Other { kind, payload }
    }

    /// The message discriminant, if it carries one.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Message::Iteration(_) => Some(ITERATION_KIND),
            Message::Other { kind, .. } => kind.as_deref(),
        }
    }

    pub fn as_iteration(&self) -> Option<&Iteration> {
        match self {
            Message::Iteration(iteration) => Some(iteration),
            Message::Other { .. } => None,
        }
    }

    pub fn is_iteration(&self) -> bool {
        matches!(self, Message::Iteration(_))
    }
}

impl From<Iteration> for Message {
    fn from(iteration: Iteration) -> Self {
        Message::Iteration(iteration)
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Message::from_value)
    }
}

#[derive(Serialize)]
struct TaggedIteration<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    iteration: &'a Iteration,
}

impl Serialize for Message {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Message::Iteration(iteration) => TaggedIteration {
                kind: ITERATION_KIND,
                iteration,
            }
            .serialize(serializer),
            Message::Other { payload, .. } => payload.serialize(serializer),
        }
    }
}
