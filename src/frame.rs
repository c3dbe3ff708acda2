/*!
 # Command frames

 Every command the strip understands is a fixed 9-byte packet:

 ```text
 offset 0: 0x7E            start marker
 offset 1: 0x00            reserved
 offset 2: command id
 offset 3..7: 5 argument bytes
 offset 8: 0xEF            end marker
 ```
*/

use std::fmt;

use crate::{Error, Result};

/// Total length of a command frame in bytes
pub const FRAME_LEN: usize = 9;

/// Number of argument bytes carried by a frame
pub const ARG_COUNT: usize = 5;

/// First byte of every frame
pub const START_MARKER: u8 = 0x7e;

/// Last byte of every frame
pub const END_MARKER: u8 = 0xef;

/// Command identifiers understood by the strip controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandId {
    /// Brightness level (0-100)
    Brightness = 0x01,
    /// Speed of the running effect (0-100)
    EffectSpeed = 0x02,
    /// Effect mode selector
    Effect = 0x03,
    /// Power on/off
    Power = 0x04,
    /// Static color
    Color = 0x05,
    /// Scheduled on/off timer
    Schedule = 0x82,
    /// Clock synchronization
    Time = 0x83,
}

impl CommandId {
    /// Raw id byte as written at offset 2
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for CommandId {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x01 => Ok(CommandId::Brightness),
            0x02 => Ok(CommandId::EffectSpeed),
            0x03 => Ok(CommandId::Effect),
            0x04 => Ok(CommandId::Power),
            0x05 => Ok(CommandId::Color),
            0x82 => Ok(CommandId::Schedule),
            0x83 => Ok(CommandId::Time),
            other => Err(Error::InvalidFrame(format!(
                "unknown command id {other:#04x}"
            ))),
        }
    }
}

/// An immutable, always well-formed 9-byte command frame
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandFrame {
    bytes: [u8; FRAME_LEN],
    id: CommandId,
}

impl CommandFrame {
    /// Builds a frame from a command id and its five argument bytes
    pub const fn new(id: CommandId, args: [u8; ARG_COUNT]) -> Self {
        CommandFrame {
            bytes: [
                START_MARKER,
                0x00,
                id as u8,
                args[0],
                args[1],
                args[2],
                args[3],
                args[4],
                END_MARKER,
            ],
            id,
        }
    }

    /// Parses a captured byte sequence, checking length, markers and command id
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; FRAME_LEN] = bytes.try_into().map_err(|_| {
            Error::InvalidFrame(format!(
                "expected {FRAME_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;

        if raw[0] != START_MARKER || raw[FRAME_LEN - 1] != END_MARKER {
            return Err(Error::InvalidFrame(format!(
                "bad framing markers {:#04x}..{:#04x}",
                raw[0],
                raw[FRAME_LEN - 1]
            )));
        }
        if raw[1] != 0x00 {
            return Err(Error::InvalidFrame(format!(
                "reserved byte is {:#04x}, expected 0x00",
                raw[1]
            )));
        }
        let id = CommandId::try_from(raw[2])?;

        Ok(CommandFrame { bytes: raw, id })
    }

    /// The command id at offset 2
    pub fn command_id(&self) -> CommandId {
        self.id
    }

    /// The five argument bytes at offsets 3..8
    pub fn args(&self) -> [u8; ARG_COUNT] {
        let b = &self.bytes;
        [b[3], b[4], b[5], b[6], b[7]]
    }

    /// The frame as it goes on the wire
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<CommandFrame> for [u8; FRAME_LEN] {
    fn from(frame: CommandFrame) -> Self {
        frame.bytes
    }
}

impl TryFrom<&[u8]> for CommandFrame {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        CommandFrame::from_bytes(bytes)
    }
}

impl fmt::Debug for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandFrame[")?;
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_places_markers_and_args() {
        let frame = CommandFrame::new(CommandId::Color, [0x03, 1, 2, 3, 0]);
        assert_eq!(
            frame.as_bytes(),
            &[0x7e, 0x00, 0x05, 0x03, 1, 2, 3, 0x00, 0xef]
        );
        assert_eq!(frame.command_id(), CommandId::Color);
        assert_eq!(frame.args(), [0x03, 1, 2, 3, 0]);
    }

    #[test]
    fn from_bytes_rejects_wrong_length() {
        let err = CommandFrame::from_bytes(&[0x7e, 0x00, 0x01, 0xef]).unwrap_err();
        assert!(matches!(err, Error::InvalidFrame(_)));
    }

    #[test]
    fn from_bytes_rejects_bad_markers() {
        let bytes = [0x7f, 0x00, 0x01, 50, 0, 0, 0, 0, 0xef];
        assert!(matches!(
            CommandFrame::from_bytes(&bytes),
            Err(Error::InvalidFrame(_))
        ));

        let bytes = [0x7e, 0x00, 0x01, 50, 0, 0, 0, 0, 0xee];
        assert!(matches!(
            CommandFrame::from_bytes(&bytes),
            Err(Error::InvalidFrame(_))
        ));
    }

    #[test]
    fn from_bytes_rejects_nonzero_reserved_byte() {
        let bytes = [0x7e, 0x01, 0x01, 50, 0, 0, 0, 0, 0xef];
        let err = CommandFrame::from_bytes(&bytes).unwrap_err();
        assert!(matches!(&err, Error::InvalidFrame(msg) if msg.contains("reserved")));
    }

    #[test]
    fn from_bytes_rejects_unknown_command() {
        let bytes = [0x7e, 0x00, 0x42, 0, 0, 0, 0, 0, 0xef];
        assert!(matches!(
            CommandFrame::from_bytes(&bytes),
            Err(Error::InvalidFrame(_))
        ));
    }

    #[test]
    fn from_bytes_accepts_captured_power_on() {
        let bytes = [0x7e, 0x00, 0x04, 0xf0, 0x00, 0x01, 0xff, 0x00, 0xef];
        let frame = CommandFrame::from_bytes(&bytes).unwrap();
        assert_eq!(frame.command_id(), CommandId::Power);
        assert_eq!(frame.args(), [0xf0, 0x00, 0x01, 0xff, 0x00]);
    }

    #[test]
    fn debug_prints_hex() {
        let frame = CommandFrame::new(CommandId::Brightness, [100, 0, 0, 0, 0]);
        assert_eq!(
            format!("{frame:?}"),
            "CommandFrame[7e 00 01 64 00 00 00 00 ef]"
        );
    }
}
