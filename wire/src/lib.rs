//! Shared command vocabulary and protobuf codec for the ordered channel.
//!
//! This crate owns the wire representation consumed by every replica: the
//! page/participant identifiers, the `Segment` drawing primitive, and the
//! `Command` set delivered in total order by the transport. Commands carry a
//! serde JSON form (used by logs, tooling, and the JSONL replica binary) and
//! encode over protobuf for compact binary transport.

use prost::Message;
use serde::{Deserialize, Serialize};

/// Identifier of one drawing page.
pub type PageKey = u64;

/// Opaque identifier of one connected participant.
pub type ParticipantId = String;

/// Reserved color value meaning "erase" rather than paint.
pub const ERASE_COLOR: &str = "#00000000";

/// Error returned by [`decode_command`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The raw bytes could not be decoded as a protobuf `WireCommand`.
    #[error("failed to decode protobuf command: {0}")]
    Decode(#[from] prost::DecodeError),
    /// The `kind` integer on the wire does not map to a known command.
    #[error("invalid command kind: {0}")]
    InvalidKind(i32),
    /// A field required by the decoded kind is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

/// One immutable line primitive within a stroke.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start point, page coordinates.
    pub x0: f64,
    pub y0: f64,
    /// End point, page coordinates.
    pub x1: f64,
    pub y1: f64,
    /// CSS color; [`ERASE_COLOR`] means erase.
    pub color: String,
    /// Stroke width, positive.
    pub nib: f64,
    /// Composite behind existing ink instead of on top.
    pub under: bool,
    /// Participant who drew this segment.
    pub author: ParticipantId,
}

/// A command as delivered, in total order, to every replica.
///
/// JSON form uses a `cmd` tag with camelCase names matching the channel's
/// framing, e.g. `{"cmd":"undo","participantId":"v1"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    /// A new independent stroke is about to begin; invalidates local gesture
    /// bookkeeping only, never mutates the replicated document.
    StartLine { page_key: PageKey },
    /// Append one segment; opens a new stroke when `is_new_stroke`.
    AddSegment {
        page_key: PageKey,
        participant_id: ParticipantId,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        color: String,
        nib: f64,
        under: bool,
        is_new_stroke: bool,
    },
    /// Hide the participant's most recent live stroke.
    Undo { participant_id: ParticipantId },
    /// Restore the participant's most recently undone stroke.
    Redo { participant_id: ParticipantId },
    /// Erase the active page entirely. Not an undo target.
    Clear,
    /// The participant left; drops their undo history, never their ink.
    ParticipantDeparted { participant_id: ParticipantId },
    /// Bind the rendering surface to a page, creating it if absent.
    PageSwitch { page_key: PageKey, width: u32, height: u32 },
    /// Delete a page and all of its history.
    PageRemoved { page_key: PageKey },
}

impl Command {
    /// Build the [`Segment`] carried by an `AddSegment` command, if any.
    #[must_use]
    pub fn segment(&self) -> Option<Segment> {
        let Self::AddSegment { participant_id, x0, y0, x1, y1, color, nib, under, .. } = self
        else {
            return None;
        };
        Some(Segment {
            x0: *x0,
            y0: *y0,
            x1: *x1,
            y1: *y1,
            color: color.clone(),
            nib: *nib,
            under: *under,
            author: participant_id.clone(),
        })
    }
}

/// Encode a command into protobuf bytes.
///
/// # Panics
///
/// Never panics in practice; writing to `Vec<u8>` is infallible.
#[must_use]
pub fn encode_command(command: &Command) -> Vec<u8> {
    let wire = command_to_wire(command);

    let mut out = Vec::with_capacity(wire.encoded_len());
    // Safety: encoding into a Vec<u8> is infallible; the only error prost
    // returns here is `BufferTooSmall`, which cannot occur with a growable Vec.
    wire.encode(&mut out).unwrap_or_default();
    out
}

/// Decode protobuf bytes into a command.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed bytes,
/// [`CodecError::InvalidKind`] for out-of-range kind values, and
/// [`CodecError::MissingField`] when a kind's required field is absent.
pub fn decode_command(bytes: &[u8]) -> Result<Command, CodecError> {
    let wire = WireCommand::decode(bytes)?;
    wire_to_command(wire)
}

fn command_to_wire(command: &Command) -> WireCommand {
    let mut wire = WireCommand { kind: command_kind(command) as i32, ..WireCommand::default() };

    match command {
        Command::StartLine { page_key } | Command::PageRemoved { page_key } => {
            wire.page_key = Some(*page_key);
        }
        Command::AddSegment {
            page_key,
            participant_id,
            x0,
            y0,
            x1,
            y1,
            color,
            nib,
            under,
            is_new_stroke,
        } => {
            wire.page_key = Some(*page_key);
            wire.participant_id = Some(participant_id.clone());
            wire.x0 = Some(*x0);
            wire.y0 = Some(*y0);
            wire.x1 = Some(*x1);
            wire.y1 = Some(*y1);
            wire.color = Some(color.clone());
            wire.nib = Some(*nib);
            wire.under = Some(*under);
            wire.is_new_stroke = Some(*is_new_stroke);
        }
        Command::Undo { participant_id }
        | Command::Redo { participant_id }
        | Command::ParticipantDeparted { participant_id } => {
            wire.participant_id = Some(participant_id.clone());
        }
        Command::Clear => {}
        Command::PageSwitch { page_key, width, height } => {
            wire.page_key = Some(*page_key);
            wire.width = Some(*width);
            wire.height = Some(*height);
        }
    }

    wire
}

fn wire_to_command(wire: WireCommand) -> Result<Command, CodecError> {
    let kind =
        WireCommandKind::try_from(wire.kind).map_err(|_| CodecError::InvalidKind(wire.kind))?;

    match kind {
        WireCommandKind::StartLine => {
            Ok(Command::StartLine { page_key: require(wire.page_key, "pageKey")? })
        }
        WireCommandKind::AddSegment => Ok(Command::AddSegment {
            page_key: require(wire.page_key, "pageKey")?,
            participant_id: require(wire.participant_id, "participantId")?,
            x0: require(wire.x0, "x0")?,
            y0: require(wire.y0, "y0")?,
            x1: require(wire.x1, "x1")?,
            y1: require(wire.y1, "y1")?,
            color: require(wire.color, "color")?,
            nib: require(wire.nib, "nib")?,
            under: require(wire.under, "under")?,
            is_new_stroke: require(wire.is_new_stroke, "isNewStroke")?,
        }),
        WireCommandKind::Undo => {
            Ok(Command::Undo { participant_id: require(wire.participant_id, "participantId")? })
        }
        WireCommandKind::Redo => {
            Ok(Command::Redo { participant_id: require(wire.participant_id, "participantId")? })
        }
        WireCommandKind::Clear => Ok(Command::Clear),
        WireCommandKind::ParticipantDeparted => Ok(Command::ParticipantDeparted {
            participant_id: require(wire.participant_id, "participantId")?,
        }),
        WireCommandKind::PageSwitch => Ok(Command::PageSwitch {
            page_key: require(wire.page_key, "pageKey")?,
            width: require(wire.width, "width")?,
            height: require(wire.height, "height")?,
        }),
        WireCommandKind::PageRemoved => {
            Ok(Command::PageRemoved { page_key: require(wire.page_key, "pageKey")? })
        }
    }
}

fn command_kind(command: &Command) -> WireCommandKind {
    match command {
        Command::StartLine { .. } => WireCommandKind::StartLine,
        Command::AddSegment { .. } => WireCommandKind::AddSegment,
        Command::Undo { .. } => WireCommandKind::Undo,
        Command::Redo { .. } => WireCommandKind::Redo,
        Command::Clear => WireCommandKind::Clear,
        Command::ParticipantDeparted { .. } => WireCommandKind::ParticipantDeparted,
        Command::PageSwitch { .. } => WireCommandKind::PageSwitch,
        Command::PageRemoved { .. } => WireCommandKind::PageRemoved,
    }
}

fn require<T>(value: Option<T>, name: &'static str) -> Result<T, CodecError> {
    value.ok_or(CodecError::MissingField(name))
}

#[derive(Clone, PartialEq, Message)]
struct WireCommand {
    #[prost(enumeration = "WireCommandKind", tag = "1")]
    kind: i32,
    #[prost(uint64, optional, tag = "2")]
    page_key: Option<u64>,
    #[prost(string, optional, tag = "3")]
    participant_id: Option<String>,
    #[prost(double, optional, tag = "4")]
    x0: Option<f64>,
    #[prost(double, optional, tag = "5")]
    y0: Option<f64>,
    #[prost(double, optional, tag = "6")]
    x1: Option<f64>,
    #[prost(double, optional, tag = "7")]
    y1: Option<f64>,
    #[prost(string, optional, tag = "8")]
    color: Option<String>,
    #[prost(double, optional, tag = "9")]
    nib: Option<f64>,
    #[prost(bool, optional, tag = "10")]
    under: Option<bool>,
    #[prost(bool, optional, tag = "11")]
    is_new_stroke: Option<bool>,
    #[prost(uint32, optional, tag = "12")]
    width: Option<u32>,
    #[prost(uint32, optional, tag = "13")]
    height: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
enum WireCommandKind {
    StartLine = 0,
    AddSegment = 1,
    Undo = 2,
    Redo = 3,
    Clear = 4,
    ParticipantDeparted = 5,
    PageSwitch = 6,
    PageRemoved = 7,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
