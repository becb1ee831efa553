//! Translator integration tests against a scripted printer

use bidi_extension::bidi::{PollMode, QueueContext, StatusPoller};
use bidi_extension::device::MockPrinter;
use bidi_extension::{
    get_schemas, get_status, request_status, set_schema, BidiSchemaElement, ResponseSet,
    SchemaValue, ScriptStatus,
};
use bidi_protocol::{
    KEY_CHANGEABLE_DATA, KEY_DUPLEX_INSTALLED, KEY_INTEGER_VALUE, KEY_MEMORY_SIZE,
    KEY_QUEUE_PROPERTY, KEY_STATUS_VALUE, KEY_STRING_VALUE, QUEUE_PROPERTY_NAME,
};

fn context() -> QueueContext {
    QueueContext::default().with_queue_property(QUEUE_PROPERTY_NAME, "Accounting")
}

#[test]
fn test_int_key_end_to_end() {
    let mut printer = MockPrinter::new();
    let mut responses = ResponseSet::new();

    let status = get_schemas(&context(), &mut printer, &["IntKey"], &mut responses);

    assert_eq!(status, ScriptStatus::Success);
    assert_eq!(responses.responses.len(), 1);
    assert_eq!(responses.responses[0].key, KEY_INTEGER_VALUE);
    assert_eq!(responses.responses[0].value, SchemaValue::Int32(7));
}

#[test]
fn test_mixed_batch() {
    // Configuration: duplex, memory; then the string query
    let mut printer = MockPrinter::new()
        .respond(&[1])
        .respond(&[0x00, 0x40, 0x00])
        .respond(b"Model-X");
    let mut responses = ResponseSet::new();
    let keys = vec![
        "Unknown".to_string(),
        "Configuration".to_string(),
        "\\Printer.Extension:StringValue".to_string(),
    ];

    let status = get_schemas(&context(), &mut printer, &keys, &mut responses);

    assert_eq!(status, ScriptStatus::Success);
    assert_eq!(responses.get(KEY_DUPLEX_INSTALLED), Some(&SchemaValue::Bool(true)));
    assert_eq!(responses.get(KEY_MEMORY_SIZE), Some(&SchemaValue::Int32(0x4000)));
    assert_eq!(
        responses.get(KEY_QUEUE_PROPERTY),
        Some(&SchemaValue::String("Accounting".into()))
    );
    assert_eq!(
        responses.get(KEY_STRING_VALUE),
        Some(&SchemaValue::String("Model-X".into()))
    );
    assert_eq!(responses.responses.len(), 4);
    assert_eq!(printer.writes().len(), 3);
}

#[test]
fn test_not_ready_then_requery() {
    let ctx = context();
    let mut printer = MockPrinter::new().respond(&[2]).respond(&[0x01]);
    let mut first = ResponseSet::new();
    let status = get_schemas(&ctx, &mut printer, &["Configuration", "IntKey"], &mut first);

    assert_eq!(status, ScriptStatus::Retry);
    assert_eq!(first.requery_keys, vec!["Configuration".to_string()]);
    assert!(first.get(KEY_DUPLEX_INSTALLED).is_none());
    assert_eq!(first.get(KEY_INTEGER_VALUE), Some(&SchemaValue::Int32(7)));

    // The monitor calls again with the requery keys only
    printer.push_response(&[1]);
    printer.push_response(&[0x01]);
    let mut second = ResponseSet::new();
    let status = get_schemas(&ctx, &mut printer, &first.requery_keys, &mut second);

    assert_eq!(status, ScriptStatus::Success);
    assert!(second.requery_keys.is_empty());
    assert_eq!(second.get(KEY_DUPLEX_INSTALLED), Some(&SchemaValue::Bool(true)));
    assert_eq!(second.get(KEY_MEMORY_SIZE), Some(&SchemaValue::Int32(1)));
}

#[test]
fn test_set_changeable_data_retry_cycle() {
    let ctx = context();
    let element = BidiSchemaElement::new(KEY_CHANGEABLE_DATA, SchemaValue::Int32(9));
    let mut printer = MockPrinter::new()
        .respond(&[0x1D, 0x01])
        .respond(&[0x1D, 0x00]);

    assert_eq!(set_schema(&ctx, &mut printer, &element), ScriptStatus::Retry);
    assert_eq!(set_schema(&ctx, &mut printer, &element), ScriptStatus::Success);
    assert_eq!(printer.writes(), &[vec![0x0D, 0x0A, 0x09], vec![0x0D, 0x0A, 0x09]]);
}

#[test]
fn test_status_handlers_agree() {
    for data in [[0x1B, 0x07], [0x2B, 0x00], [0x00, 0x00]] {
        let mut unsolicited = MockPrinter::new().respond(&data);
        let mut solicited = MockPrinter::new().respond(&data);
        let mut a = ResponseSet::new();
        let mut b = ResponseSet::new();

        let status_a = get_status(&context(), &mut unsolicited, &mut a);
        let status_b = request_status(&context(), &mut solicited, &mut b);

        assert_eq!(status_a, status_b);
        assert_eq!(a, b);
        assert!(unsolicited.writes().is_empty());
        assert_eq!(solicited.writes(), &[vec![0x0C, 0x0C]]);
    }
}

#[test]
fn test_status_poll_lifecycle() {
    let ctx = context();
    let mut printer = MockPrinter::new()
        .respond(&[0x1B, 0x07])
        .respond(&[0x42])
        .respond(&[0x2B, 0x01]);
    let mut poller = StatusPoller::new(PollMode::Solicited);
    let mut values = Vec::new();

    while let Some(status) = {
        let mut responses = ResponseSet::new();
        let status = poller.poll(&ctx, &mut printer, &mut responses);
        values.extend(responses.get(KEY_STATUS_VALUE).cloned());
        status
    } {
        assert_ne!(status, ScriptStatus::Retry);
    }

    assert!(poller.is_exhausted());
    assert_eq!(values, vec![SchemaValue::Int32(7)]);
    assert_eq!(printer.writes().len(), 3);
}
