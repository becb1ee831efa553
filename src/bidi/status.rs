//! Status path: status reports read while a job is printing
//!
//! `get_status` drains unsolicited reports from a read-only stream;
//! `request_status` solicits one with a poll trigger first. Both share the
//! same two-byte report grammar and the same terminal condition.

use super::frames::{self, Decoded, Operation, Tagged};
use super::host::{PrinterStream, SchemaResponses, ScriptContext};
use bidi_protocol::{ScriptStatus, KEY_STATUS_VALUE};
use tracing::{debug, info};

/// Read one unsolicited status report
pub fn get_status(
    _context: &dyn ScriptContext,
    stream: &mut dyn PrinterStream,
    responses: &mut dyn SchemaResponses,
) -> ScriptStatus {
    let spec = frames::frame(Operation::StatusPoll);
    let report = frames::read_response(stream, spec).and_then(|data| spec.decode_response(&data));
    report_status(report, responses)
}

/// Trigger and read one solicited status report
pub fn request_status(
    _context: &dyn ScriptContext,
    stream: &mut dyn PrinterStream,
    responses: &mut dyn SchemaResponses,
) -> ScriptStatus {
    let report = frames::query(stream, Operation::StatusPoll);
    report_status(report, responses)
}

fn report_status(report: Option<Decoded>, responses: &mut dyn SchemaResponses) -> ScriptStatus {
    match report {
        Some(Decoded::Tagged(Tagged::StatusValue(value))) => {
            debug!("Status value {}", value);
            responses.add_int32(KEY_STATUS_VALUE, i32::from(value));
            ScriptStatus::Success
        }
        Some(Decoded::Tagged(Tagged::StatusDone)) => {
            info!("Device reports no further status");
            ScriptStatus::StatusExhausted
        }
        _ => ScriptStatus::Success,
    }
}

/// Lifecycle of a status polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollState {
    #[default]
    Polling,
    /// Terminal; the handler must not be invoked again
    Exhausted,
}

impl PollState {
    pub fn next(self, status: ScriptStatus) -> Self {
        match (self, status) {
            (PollState::Polling, ScriptStatus::StatusExhausted) => PollState::Exhausted,
            (state, _) => state,
        }
    }
}

/// Which status handler a poller drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// `get_status` on a read-only stream
    Unsolicited,
    /// `request_status` on the alternate status interface
    Solicited,
}

/// Drives one status handler until the device reports it is done
#[derive(Debug, Clone)]
pub struct StatusPoller {
    mode: PollMode,
    state: PollState,
}

impl StatusPoller {
    pub fn new(mode: PollMode) -> Self {
        Self {
            mode,
            state: PollState::Polling,
        }
    }

    pub fn mode(&self) -> PollMode {
        self.mode
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == PollState::Exhausted
    }

    /// Invoke the handler once; `None` once the poller is exhausted
    pub fn poll(
        &mut self,
        context: &dyn ScriptContext,
        stream: &mut dyn PrinterStream,
        responses: &mut dyn SchemaResponses,
    ) -> Option<ScriptStatus> {
        if self.is_exhausted() {
            return None;
        }
        let status = match self.mode {
            PollMode::Unsolicited => get_status(context, stream, responses),
            PollMode::Solicited => request_status(context, stream, responses),
        };
        self.state = self.state.next(status);
        Some(status)
    }
}
