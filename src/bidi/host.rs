//! Capability interfaces the print monitor hands to each entry point
//!
//! The monitor owns the device handle, the property bags and the response
//! collection; the translator only sees these narrow traits.

use bidi_protocol::{SchemaResponse, SchemaValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sequential byte stream to the attached printer
pub trait PrinterStream {
    /// Write `data`, returning how many bytes the device accepted
    fn write(&mut self, data: &[u8]) -> usize;

    /// Read at most `max_len` bytes; empty when nothing is available
    fn read(&mut self, max_len: usize) -> Vec<u8>;
}

/// Write-only response collection filled during one call
pub trait SchemaResponses {
    fn add_bool(&mut self, key: &str, value: bool);
    fn add_int32(&mut self, key: &str, value: i32);
    fn add_string(&mut self, key: &str, value: &str);
    /// Ask the monitor to query `key` again after a wait
    fn add_requery_key(&mut self, key: &str);
}

/// Read-only string property store
pub trait PropertyBag {
    fn get_string(&self, name: &str) -> Option<String>;
}

/// Per-call script context exposing the driver and queue property bags
pub trait ScriptContext {
    fn driver_properties(&self) -> &dyn PropertyBag;
    fn queue_properties(&self) -> &dyn PropertyBag;
}

/// In-memory accumulator.
///
/// Keys stay unique (a second add for the same key replaces the value) and
/// requery keys are kept in insertion order without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSet {
    pub responses: Vec<SchemaResponse>,
    pub requery_keys: Vec<String>,
}

impl ResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&SchemaValue> {
        self.responses
            .iter()
            .find(|r| r.key == key)
            .map(|r| &r.value)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty() && self.requery_keys.is_empty()
    }

    fn insert(&mut self, key: &str, value: SchemaValue) {
        match self.responses.iter_mut().find(|r| r.key == key) {
            Some(existing) => existing.value = value,
            None => self.responses.push(SchemaResponse::new(key, value)),
        }
    }
}

impl SchemaResponses for ResponseSet {
    fn add_bool(&mut self, key: &str, value: bool) {
        self.insert(key, SchemaValue::Bool(value));
    }

    fn add_int32(&mut self, key: &str, value: i32) {
        self.insert(key, SchemaValue::Int32(value));
    }

    fn add_string(&mut self, key: &str, value: &str) {
        self.insert(key, SchemaValue::String(value.to_string()));
    }

    fn add_requery_key(&mut self, key: &str) {
        if !self.requery_keys.iter().any(|k| k == key) {
            self.requery_keys.push(key.to_string());
        }
    }
}

/// Property bag backed by a map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap(HashMap<String, String>);

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

impl From<HashMap<String, String>> for PropertyMap {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl PropertyBag for PropertyMap {
    fn get_string(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

/// Script context with owned driver and queue property maps
#[derive(Debug, Clone, Default)]
pub struct QueueContext {
    pub driver: PropertyMap,
    pub queue: PropertyMap,
}

impl QueueContext {
    pub fn new(driver: PropertyMap, queue: PropertyMap) -> Self {
        Self { driver, queue }
    }

    pub fn with_queue_property(mut self, name: &str, value: &str) -> Self {
        self.queue.insert(name, value);
        self
    }
}

impl ScriptContext for QueueContext {
    fn driver_properties(&self) -> &dyn PropertyBag {
        &self.driver
    }

    fn queue_properties(&self) -> &dyn PropertyBag {
        &self.queue
    }
}
