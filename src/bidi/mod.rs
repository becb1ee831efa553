//! Bidi module - translates Bidi Schema requests into printer command frames
//!
//! The print monitor calls one of four entry points per invocation and owns
//! scheduling, retries and the device handle. Nothing here survives a call.

pub mod frames;
pub mod host;
mod schemas;
mod setter;
mod status;

pub use frames::{FrameSpec, Operation, FRAMES, READ_LIMIT};
pub use host::{
    PrinterStream, PropertyBag, PropertyMap, QueueContext, ResponseSet, SchemaResponses,
    ScriptContext,
};
pub use schemas::get_schemas;
pub use setter::set_schema;
pub use status::{get_status, request_status, PollMode, PollState, StatusPoller};
