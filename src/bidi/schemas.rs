//! Query path: answer a batch of Bidi Schema query keys

use super::frames::{self, Decoded, FlagByte, Operation};
use super::host::{PrinterStream, SchemaResponses, ScriptContext};
use bidi_protocol::{
    ScriptStatus, KEY_DUPLEX_INSTALLED, KEY_INTEGER_VALUE, KEY_MEMORY_SIZE, KEY_QUEUE_PROPERTY,
    KEY_STRING_VALUE, QUERY_CONFIGURATION, QUERY_INT_KEY, QUEUE_PROPERTY_NAME,
};
use tracing::debug;

/// Answer every requested query key.
///
/// Unknown keys are skipped and repeated keys are answered once. Returns
/// `Retry` when the device reported it was not ready for some key; those
/// keys are added to the requery list.
pub fn get_schemas<K: AsRef<str>>(
    context: &dyn ScriptContext,
    stream: &mut dyn PrinterStream,
    requests: &[K],
    responses: &mut dyn SchemaResponses,
) -> ScriptStatus {
    let mut status = ScriptStatus::Success;
    let mut seen: Vec<&str> = Vec::with_capacity(requests.len());

    for request in requests {
        let key: &str = request.as_ref();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);

        debug!("Query key {}", key);
        match key {
            QUERY_CONFIGURATION => {
                if query_configuration(context, stream, responses) == ScriptStatus::Retry {
                    responses.add_requery_key(QUERY_CONFIGURATION);
                    status = ScriptStatus::Retry;
                }
            }
            QUERY_INT_KEY => query_int_key(stream, responses),
            KEY_STRING_VALUE => query_string_value(stream, responses),
            other => debug!("Ignoring unknown query key {}", other),
        }
    }

    status
}

/// Duplex unit, memory size and the queue property.
///
/// Every sub-query runs even when the duplex query reports not ready; only
/// the duplex entry is withheld in that case.
fn query_configuration(
    context: &dyn ScriptContext,
    stream: &mut dyn PrinterStream,
    responses: &mut dyn SchemaResponses,
) -> ScriptStatus {
    let mut status = ScriptStatus::Success;

    match frames::query(stream, Operation::DuplexQuery) {
        Some(Decoded::Flag(FlagByte::NotReady)) => {
            debug!("Duplex unit not ready, requesting requery");
            status = ScriptStatus::Retry;
        }
        Some(Decoded::Flag(flag)) => {
            responses.add_bool(KEY_DUPLEX_INSTALLED, flag == FlagByte::Set)
        }
        _ => responses.add_bool(KEY_DUPLEX_INSTALLED, false),
    }

    let mem_size = match frames::query(stream, Operation::MemorySizeQuery) {
        Some(Decoded::Integer(n)) => n,
        _ => 0,
    };
    responses.add_int32(KEY_MEMORY_SIZE, mem_size as i32);

    let queue_property = context
        .queue_properties()
        .get_string(QUEUE_PROPERTY_NAME)
        .unwrap_or_else(|| {
            debug!("Queue property {} not set", QUEUE_PROPERTY_NAME);
            String::new()
        });
    responses.add_string(KEY_QUEUE_PROPERTY, &queue_property);

    status
}

/// Reports the number of probe bytes the device accepted, not a device value
fn query_int_key(stream: &mut dyn PrinterStream, responses: &mut dyn SchemaResponses) {
    let written = frames::transmit(stream, frames::frame(Operation::IntKeyProbe), 0);
    responses.add_int32(KEY_INTEGER_VALUE, written as i32);
}

fn query_string_value(stream: &mut dyn PrinterStream, responses: &mut dyn SchemaResponses) {
    let value = match frames::query(stream, Operation::StringQuery) {
        Some(Decoded::Text(text)) => text,
        _ => String::new(),
    };
    responses.add_string(KEY_STRING_VALUE, &value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidi::host::{QueueContext, ResponseSet};
    use crate::device::MockPrinter;
    use bidi_protocol::SchemaValue;

    fn run(printer: &mut MockPrinter, keys: &[&str]) -> (ScriptStatus, ResponseSet) {
        let ctx = QueueContext::default().with_queue_property(QUEUE_PROPERTY_NAME, "front-desk");
        let mut responses = ResponseSet::new();
        let status = get_schemas(&ctx, printer, keys, &mut responses);
        (status, responses)
    }

    #[test]
    fn test_configuration_installed() {
        let mut printer = MockPrinter::new().respond(&[1]).respond(&[0x01, 0x02]);
        let (status, responses) = run(&mut printer, &["Configuration"]);

        assert_eq!(status, ScriptStatus::Success);
        assert_eq!(responses.len(), 3);
        assert_eq!(responses.get(KEY_DUPLEX_INSTALLED), Some(&SchemaValue::Bool(true)));
        assert_eq!(responses.get(KEY_MEMORY_SIZE), Some(&SchemaValue::Int32(258)));
        assert_eq!(
            responses.get(KEY_QUEUE_PROPERTY),
            Some(&SchemaValue::String("front-desk".into()))
        );
        assert!(responses.requery_keys.is_empty());
    }

    #[test]
    fn test_configuration_not_installed() {
        let mut printer = MockPrinter::new().respond(&[0]).respond(&[]);
        let (status, responses) = run(&mut printer, &["Configuration"]);

        assert_eq!(status, ScriptStatus::Success);
        assert_eq!(responses.get(KEY_DUPLEX_INSTALLED), Some(&SchemaValue::Bool(false)));
        assert_eq!(responses.get(KEY_MEMORY_SIZE), Some(&SchemaValue::Int32(0)));
    }

    #[test]
    fn test_configuration_not_ready_requeries() {
        let mut printer = MockPrinter::new().respond(&[2]).respond(&[0x10]);
        let (status, responses) = run(&mut printer, &["Configuration"]);

        assert_eq!(status, ScriptStatus::Retry);
        assert_eq!(responses.requery_keys, vec!["Configuration".to_string()]);
        assert_eq!(responses.get(KEY_DUPLEX_INSTALLED), None);
        assert_eq!(responses.get(KEY_MEMORY_SIZE), Some(&SchemaValue::Int32(16)));
        assert!(responses.get(KEY_QUEUE_PROPERTY).is_some());
    }

    #[test]
    fn test_configuration_wrong_length_duplex_is_false() {
        let mut printer = MockPrinter::new().respond(&[1, 1]).respond(&[]);
        let (status, responses) = run(&mut printer, &["Configuration"]);

        assert_eq!(status, ScriptStatus::Success);
        assert_eq!(responses.get(KEY_DUPLEX_INSTALLED), Some(&SchemaValue::Bool(false)));
    }

    #[test]
    fn test_configuration_short_writes() {
        let mut printer = MockPrinter::new().accept_at_most(4).respond(&[1]).respond(&[9]);
        let (status, responses) = run(&mut printer, &["Configuration"]);

        assert_eq!(status, ScriptStatus::Success);
        assert_eq!(responses.get(KEY_DUPLEX_INSTALLED), Some(&SchemaValue::Bool(false)));
        assert_eq!(responses.get(KEY_MEMORY_SIZE), Some(&SchemaValue::Int32(0)));
        // Nothing was read back
        assert_eq!(printer.pending_responses(), 2);
    }

    #[test]
    fn test_missing_queue_property_reports_empty() {
        let mut printer = MockPrinter::new().respond(&[1]).respond(&[]);
        let mut responses = ResponseSet::new();
        get_schemas(&QueueContext::default(), &mut printer, &["Configuration"], &mut responses);

        assert_eq!(
            responses.get(KEY_QUEUE_PROPERTY),
            Some(&SchemaValue::String(String::new()))
        );
    }

    #[test]
    fn test_int_key_reports_written_count() {
        let mut printer = MockPrinter::new();
        let (status, responses) = run(&mut printer, &["IntKey"]);

        assert_eq!(status, ScriptStatus::Success);
        assert_eq!(responses.len(), 1);
        assert_eq!(responses.get(KEY_INTEGER_VALUE), Some(&SchemaValue::Int32(7)));
        assert_eq!(printer.writes(), &[vec![0x0D, 0x0D, 0x04, 0xDE, 0xAD, 0xBE, 0xEF]]);
    }

    #[test]
    fn test_int_key_partial_write() {
        let mut printer = MockPrinter::new().accept_at_most(5);
        let (_, responses) = run(&mut printer, &["IntKey"]);
        assert_eq!(responses.get(KEY_INTEGER_VALUE), Some(&SchemaValue::Int32(5)));
    }

    #[test]
    fn test_string_value() {
        let mut printer = MockPrinter::new().respond(&[72, 105]);
        let (_, responses) = run(&mut printer, &["\\Printer.Extension:StringValue"]);
        assert_eq!(responses.get(KEY_STRING_VALUE), Some(&SchemaValue::String("Hi".into())));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut printer = MockPrinter::new();
        let (status, responses) = run(&mut printer, &["Bogus", "\\Printer.Extension:Other"]);

        assert_eq!(status, ScriptStatus::Success);
        assert!(responses.is_empty());
        assert!(printer.writes().is_empty());
    }

    #[test]
    fn test_duplicate_keys_answered_once() {
        let mut printer = MockPrinter::new();
        let (_, responses) = run(&mut printer, &["IntKey", "IntKey"]);
        assert_eq!(responses.len(), 1);
        assert_eq!(printer.writes().len(), 1);
    }
}
