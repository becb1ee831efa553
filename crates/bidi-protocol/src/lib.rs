//! Shared types for the USB Bidi extension.
//!
//! This crate is intentionally lightweight (only `serde`).
//! It defines:
//! - Bidi Schema key names the extension answers to and reports under
//! - Typed schema values and response entries (SchemaValue, SchemaResponse)
//! - The small integer status codes handed back to the print monitor

use serde::{Deserialize, Serialize};

// ── Query keys ─────────────────────────────────────────────────────

/// Category query key; expands to duplex, memory and queue property entries
pub const QUERY_CONFIGURATION: &str = "Configuration";

/// Query key answered with the number of probe bytes the device accepted
pub const QUERY_INT_KEY: &str = "IntKey";

// ── Schema keys ────────────────────────────────────────────────────

pub const KEY_DUPLEX_INSTALLED: &str = "\\Printer.Configuration.DuplexUnit:Installed";
pub const KEY_MEMORY_SIZE: &str = "\\Printer.Configuration.Memory:Size";
pub const KEY_QUEUE_PROPERTY: &str = "\\Printer.DeviceInfo:QueueProperty";
pub const KEY_INTEGER_VALUE: &str = "\\Printer.Extension:IntegerValue";
/// Leaf key; queried and reported under the same name
pub const KEY_STRING_VALUE: &str = "\\Printer.Extension:StringValue";
pub const KEY_STATUS_VALUE: &str = "\\Printer.Extension:StatusValue";

/// Settable boolean action
pub const KEY_DEVICE_ACTION: &str = "\\Printer.Extension:DeviceAction";
/// Settable single-byte value
pub const KEY_CHANGEABLE_DATA: &str = "\\Printer.Extension:ChangeableData";

/// Queue property read while answering `Configuration`
pub const QUEUE_PROPERTY_NAME: &str = "QueuePropName";

// ── Values ─────────────────────────────────────────────────────────

/// A typed Bidi Schema value. The type is implied by the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SchemaValue {
    Bool(bool),
    Int32(i32),
    String(String),
}

impl SchemaValue {
    /// Truthiness as the host scripting environment sees it
    pub fn as_bool(&self) -> bool {
        match self {
            SchemaValue::Bool(b) => *b,
            SchemaValue::Int32(n) => *n != 0,
            SchemaValue::String(s) => !s.is_empty(),
        }
    }

    /// Integer view of the value, `None` for strings
    pub fn as_int32(&self) -> Option<i32> {
        match self {
            SchemaValue::Bool(b) => Some(i32::from(*b)),
            SchemaValue::Int32(n) => Some(*n),
            SchemaValue::String(_) => None,
        }
    }
}

impl std::fmt::Display for SchemaValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaValue::Bool(b) => write!(f, "{}", b),
            SchemaValue::Int32(n) => write!(f, "{}", n),
            SchemaValue::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// One reported (key, value) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub key: String,
    pub value: SchemaValue,
}

impl SchemaResponse {
    pub fn new(key: impl Into<String>, value: SchemaValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A single element the host asks the extension to apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidiSchemaElement {
    pub name: String,
    pub value: SchemaValue,
}

impl BidiSchemaElement {
    pub fn new(name: impl Into<String>, value: SchemaValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

// ── Status codes ───────────────────────────────────────────────────

/// Completion status returned to the print monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ScriptStatus {
    /// Call completed
    #[default]
    Success = 0,
    /// Device not ready; call again later (with requery keys, if any)
    Retry = 1,
    /// Status stream will never produce more data; stop polling
    StatusExhausted = 2,
}

impl ScriptStatus {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ScriptStatus::Success),
            1 => Some(ScriptStatus::Retry),
            2 => Some(ScriptStatus::StatusExhausted),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScriptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptStatus::Success => write!(f, "success"),
            ScriptStatus::Retry => write!(f, "retry"),
            ScriptStatus::StatusExhausted => write!(f, "status-exhausted"),
        }
    }
}
