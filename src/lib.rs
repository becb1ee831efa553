//! USB Bidi Extension
//!
//! Answers a USB print monitor's Bidi Schema requests by exchanging small
//! fixed command frames with the attached printer.
//!
//! # Entry points
//! - `get_schemas`: answer a batch of query keys
//! - `set_schema`: apply one schema element
//! - `get_status`: read unsolicited status while printing
//! - `request_status`: solicit status on the alternate status interface

pub mod bidi;
pub mod core;
pub mod device;
pub mod monitor;

pub use bidi::{get_schemas, get_status, request_status, set_schema};
pub use bidi::{PrinterStream, ResponseSet, SchemaResponses, ScriptContext};
pub use bidi_protocol::{BidiSchemaElement, SchemaResponse, SchemaValue, ScriptStatus};
pub use crate::core::config::Config;
