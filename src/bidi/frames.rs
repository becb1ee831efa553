//! Printer command frames and response decoding
//!
//! Every device operation has a fixed command layout:
//! - Command bytes are literal, optionally followed by one operand byte
//! - A write only counts when the device accepts the whole frame
//! - Responses are interpreted only when their length matches the operation

use super::host::PrinterStream;
use tracing::{debug, trace};

/// Maximum number of bytes requested from the device per read
pub const READ_LIMIT: usize = 64;

/// Device operations known to the extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Is the duplexing unit installed
    DuplexQuery,
    /// Installed memory size
    MemorySizeQuery,
    /// Probe whose only result is the accepted byte count
    IntKeyProbe,
    /// Device string value
    StringQuery,
    /// Device action, enabled
    DeviceActionOn,
    /// Device action, disabled
    DeviceActionOff,
    /// Set the changeable data byte
    ChangeableData,
    /// Solicit a status report
    StatusPoll,
}

/// Expected response size for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Nothing is read back
    None,
    /// Response must be exactly this many bytes
    Exact(usize),
    /// Any number of bytes, including zero
    Any,
}

/// How response bytes become a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decode {
    None,
    Flag,
    BigEndian,
    Text,
    Tagged,
}

/// Wire layout of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpec {
    pub operation: Operation,
    /// Literal command bytes
    pub command: &'static [u8],
    /// Whether one operand byte follows the command bytes
    pub operand: bool,
    pub response: ResponseShape,
    pub decode: Decode,
}

impl FrameSpec {
    /// Total number of bytes the device must accept
    pub fn frame_len(&self) -> usize {
        self.command.len() + usize::from(self.operand)
    }

    /// Build the outgoing frame; the operand is ignored for fixed frames
    pub fn encode(&self, operand: u8) -> Vec<u8> {
        let mut frame = Vec::with_capacity(self.frame_len());
        frame.extend_from_slice(self.command);
        if self.operand {
            frame.push(operand);
        }
        frame
    }
}

/// Command table
pub const FRAMES: &[FrameSpec] = &[
    FrameSpec {
        operation: Operation::DuplexQuery,
        command: &[0x0D, 0x0D, 0x02, 0xCA, 0xFE],
        operand: false,
        response: ResponseShape::Exact(1),
        decode: Decode::Flag,
    },
    FrameSpec {
        operation: Operation::MemorySizeQuery,
        command: &[0x0D, 0x0D, 0x02, 0xAB, 0xCD],
        operand: false,
        response: ResponseShape::Any,
        decode: Decode::BigEndian,
    },
    FrameSpec {
        operation: Operation::IntKeyProbe,
        command: &[0x0D, 0x0D, 0x04, 0xDE, 0xAD, 0xBE, 0xEF],
        operand: false,
        response: ResponseShape::None,
        decode: Decode::None,
    },
    FrameSpec {
        operation: Operation::StringQuery,
        command: &[0x0D, 0x0D, 0x01, 0xAA],
        operand: false,
        response: ResponseShape::Any,
        decode: Decode::Text,
    },
    FrameSpec {
        operation: Operation::DeviceActionOn,
        command: &[0x65, 0x24, 0x0A],
        operand: false,
        response: ResponseShape::None,
        decode: Decode::None,
    },
    FrameSpec {
        operation: Operation::DeviceActionOff,
        command: &[0x65, 0x24, 0x0B],
        operand: false,
        response: ResponseShape::None,
        decode: Decode::None,
    },
    FrameSpec {
        operation: Operation::ChangeableData,
        command: &[0x0D, 0x0A],
        operand: true,
        response: ResponseShape::Exact(2),
        decode: Decode::Tagged,
    },
    FrameSpec {
        operation: Operation::StatusPoll,
        command: &[0x0C, 0x0C],
        operand: false,
        response: ResponseShape::Exact(2),
        decode: Decode::Tagged,
    },
];

/// Look up the frame layout of an operation
pub fn frame(operation: Operation) -> &'static FrameSpec {
    FRAMES
        .iter()
        .find(|spec| spec.operation == operation)
        .unwrap_or_else(|| unreachable!("no frame for {:?}", operation))
}

/// Write one operation's frame; returns the accepted byte count
pub fn transmit(stream: &mut dyn PrinterStream, spec: &FrameSpec, operand: u8) -> usize {
    let bytes = spec.encode(operand);
    trace!("{:?} -> {:02X?}", spec.operation, bytes);
    let written = stream.write(&bytes);
    if written != bytes.len() {
        debug!(
            "{:?}: device accepted {} of {} bytes",
            spec.operation,
            written,
            bytes.len()
        );
    }
    written
}

/// Write a frame and, when fully accepted, read the response.
///
/// Returns `None` when the write was short or the operation has no response.
/// Length checking is left to the decoder.
pub fn exchange(stream: &mut dyn PrinterStream, spec: &FrameSpec, operand: u8) -> Option<Vec<u8>> {
    if transmit(stream, spec, operand) != spec.frame_len() {
        return None;
    }
    read_response(stream, spec)
}

/// Run a fixed-frame operation and decode its response
pub fn query(stream: &mut dyn PrinterStream, operation: Operation) -> Option<Decoded> {
    let spec = frame(operation);
    let data = exchange(stream, spec, 0)?;
    spec.decode_response(&data)
}

/// Read the response of an operation whose frame was already sent (or needs none)
pub fn read_response(stream: &mut dyn PrinterStream, spec: &FrameSpec) -> Option<Vec<u8>> {
    if spec.response == ResponseShape::None {
        return None;
    }
    let data = stream.read(READ_LIMIT);
    trace!("{:?} <- {:02X?}", spec.operation, data);
    Some(data)
}

/// A response decoded according to its operation's rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Flag(FlagByte),
    Integer(u32),
    Text(String),
    Tagged(Tagged),
}

impl FrameSpec {
    /// Decode a response; `None` if its length does not fit the operation
    pub fn decode_response(&self, data: &[u8]) -> Option<Decoded> {
        if let ResponseShape::Exact(len) = self.response {
            if data.len() != len {
                debug!(
                    "{:?}: expected {} response bytes, got {}",
                    self.operation,
                    len,
                    data.len()
                );
                return None;
            }
        }
        match self.decode {
            Decode::None => None,
            Decode::Flag => decode_flag(data).map(Decoded::Flag),
            Decode::BigEndian => Some(Decoded::Integer(decode_big_endian(data))),
            Decode::Text => Some(Decoded::Text(decode_text(data))),
            Decode::Tagged => decode_tagged(data).map(Decoded::Tagged),
        }
    }
}

// ── Decoders ───────────────────────────────────────────────────────

/// Single-byte flag response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagByte {
    Set,
    Clear,
    NotReady,
}

pub fn decode_flag(data: &[u8]) -> Option<FlagByte> {
    match data {
        [1] => Some(FlagByte::Set),
        [2] => Some(FlagByte::NotReady),
        [_] => Some(FlagByte::Clear),
        _ => None,
    }
}

/// Most significant byte first; wraps past 32 bits
pub fn decode_big_endian(data: &[u8]) -> u32 {
    data.iter()
        .fold(0u32, |acc, &b| acc.wrapping_mul(256).wrapping_add(u32::from(b)))
}

/// One character per byte, in read order
pub fn decode_text(data: &[u8]) -> String {
    data.iter().map(|&b| char::from(b)).collect()
}

/// Discriminator byte of a two-byte tagged response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseTag {
    /// Status value follows
    StatusValue = 0x1B,
    /// Changeable data acknowledgement; payload 0x01 means not applied yet
    ChangeableDataAck = 0x1D,
    /// No more status will be produced
    StatusDone = 0x2B,
}

impl ResponseTag {
    pub fn as_byte(&self) -> u8 {
        *self as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x1B => Some(ResponseTag::StatusValue),
            0x1D => Some(ResponseTag::ChangeableDataAck),
            0x2B => Some(ResponseTag::StatusDone),
            _ => None,
        }
    }
}

/// Decoded two-byte response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tagged {
    StatusValue(u8),
    ChangeableDataAck { pending: bool },
    StatusDone,
    Unknown,
}

pub fn decode_tagged(data: &[u8]) -> Option<Tagged> {
    let &[tag, payload] = data else {
        return None;
    };
    Some(match ResponseTag::from_byte(tag) {
        Some(ResponseTag::StatusValue) => Tagged::StatusValue(payload),
        Some(ResponseTag::ChangeableDataAck) => Tagged::ChangeableDataAck {
            pending: payload == 0x01,
        },
        Some(ResponseTag::StatusDone) => Tagged::StatusDone,
        None => Tagged::Unknown,
    })
}
