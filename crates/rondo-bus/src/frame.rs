use crate::error::BusError;

/// Hard upper bound on a frame, sender id prefix included.
///
/// Matches the maximum packet length admitted by the flood layer under the
/// bus scheduler.
pub const MAX_FRAME_LEN: usize = 127;

/// Size of the sender-identity prefix at the front of every frame.
pub const ID_PREFIX_LEN: usize = 2;

/// The unit of communication on the bus.
///
/// Fixed byte layout: bytes `[0..2]` carry the originating node's identity
/// as a little-endian `u16`; the remainder is opaque payload. The embedded
/// sender identity always equals the node that produced the frame — the
/// reporter role relies on this to recognize its own frames coming back as
/// acknowledgments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    sender: u16,
    payload: Vec<u8>,
}

impl Frame {
    /// Create a frame carrying `payload` from node `sender`.
    pub fn new(sender: u16, payload: &[u8]) -> Result<Self, BusError> {
        let len = ID_PREFIX_LEN + payload.len();
        if len > MAX_FRAME_LEN {
            return Err(BusError::FrameTooLarge {
                len,
                max: MAX_FRAME_LEN,
            });
        }
        Ok(Self {
            sender,
            payload: payload.to_vec(),
        })
    }

    /// The fixed marker frame an event source emits: sender id, no payload.
    pub fn event(sender: u16) -> Self {
        Self {
            sender,
            payload: Vec::new(),
        }
    }

    /// Parse a frame from raw bus bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, BusError> {
        if bytes.len() < ID_PREFIX_LEN {
            return Err(BusError::FrameTooShort {
                len: bytes.len(),
                min: ID_PREFIX_LEN,
            });
        }
        if bytes.len() > MAX_FRAME_LEN {
            return Err(BusError::FrameTooLarge {
                len: bytes.len(),
                max: MAX_FRAME_LEN,
            });
        }
        let sender = u16::from_le_bytes([bytes[0], bytes[1]]);
        Ok(Self {
            sender,
            payload: bytes[ID_PREFIX_LEN..].to_vec(),
        })
    }

    /// Identity of the node that produced this frame.
    pub fn sender(&self) -> u16 {
        self.sender
    }

    /// Opaque payload bytes (may be empty).
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Total wire length, prefix included.
    pub fn wire_len(&self) -> usize {
        ID_PREFIX_LEN + self.payload.len()
    }

    /// Serialize to wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.wire_len());
        bytes.extend_from_slice(&self.sender.to_le_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes
    }
}
