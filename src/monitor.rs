//! Status watch loop used by the CLI when it stands in for the print monitor
//!
//! Polls one status handler on a fixed interval until the device reports it
//! has no further status. Cancellation is the caller's: drop the future.

use crate::bidi::{PrinterStream, ResponseSet, ScriptContext, StatusPoller};
use bidi_protocol::ScriptStatus;
use std::time::Duration;
use tracing::debug;

/// Poll until exhausted, handing every non-empty report to `on_report`.
///
/// Returns the number of handler invocations.
pub async fn watch_status<F>(
    poller: &mut StatusPoller,
    context: &dyn ScriptContext,
    stream: &mut dyn PrinterStream,
    interval: Duration,
    mut on_report: F,
) -> usize
where
    F: FnMut(&ResponseSet),
{
    let mut polls = 0;
    loop {
        let mut responses = ResponseSet::new();
        let Some(status) = poller.poll(context, stream, &mut responses) else {
            break;
        };
        polls += 1;

        if !responses.is_empty() {
            on_report(&responses);
        }
        if status == ScriptStatus::StatusExhausted {
            debug!("Status stream exhausted after {} polls", polls);
            break;
        }

        tokio::time::sleep(interval).await;
    }
    polls
}
