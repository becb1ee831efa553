//! Set path: apply one Bidi Schema element to the device

use super::frames::{self, Decoded, Operation, Tagged};
use super::host::{PrinterStream, ScriptContext};
use bidi_protocol::{BidiSchemaElement, ScriptStatus, KEY_CHANGEABLE_DATA, KEY_DEVICE_ACTION};
use tracing::{debug, warn};

/// Apply `element` to the device.
///
/// Returns `Retry` only when the device acknowledged changeable data as not
/// yet applied. Unknown element names are ignored without touching the device.
pub fn set_schema(
    _context: &dyn ScriptContext,
    stream: &mut dyn PrinterStream,
    element: &BidiSchemaElement,
) -> ScriptStatus {
    debug!("Set {} = {}", element.name, element.value);
    match element.name.as_str() {
        KEY_DEVICE_ACTION => {
            let operation = if element.value.as_bool() {
                Operation::DeviceActionOn
            } else {
                Operation::DeviceActionOff
            };
            frames::transmit(stream, frames::frame(operation), 0);
            ScriptStatus::Success
        }
        KEY_CHANGEABLE_DATA => match element.value.as_int32() {
            // Only the low byte goes on the wire
            Some(value) => set_changeable_data(stream, value as u8),
            None => {
                warn!("{} expects an integer, got {}", KEY_CHANGEABLE_DATA, element.value);
                ScriptStatus::Success
            }
        },
        other => {
            debug!("Ignoring unknown schema element {}", other);
            ScriptStatus::Success
        }
    }
}

fn set_changeable_data(stream: &mut dyn PrinterStream, value: u8) -> ScriptStatus {
    let spec = frames::frame(Operation::ChangeableData);
    let decoded = frames::exchange(stream, spec, value).and_then(|data| spec.decode_response(&data));
    match decoded {
        Some(Decoded::Tagged(Tagged::ChangeableDataAck { pending: true })) => {
            debug!("Changeable data not applied yet, requesting retry");
            ScriptStatus::Retry
        }
        _ => ScriptStatus::Success,
    }
}
