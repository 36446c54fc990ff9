//! Explicit little-endian byte codec for packet payloads.
//!
//! Payloads are flat field sequences with no padding and no self-describing
//! metadata: each packet writes its fields in declared order through
//! [`WireWriter`] and reads them back in the same order through
//! [`WireReader`]. Strings carry a `u32` length prefix followed by UTF-8
//! bytes; lists carry a `u32` element count followed by the elements.

use glam::{Quat, Vec2, Vec3};

use crate::identity::{Identity, IdentityKind};

/// Errors produced while decoding a payload.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The payload ended before a field could be read in full.
    #[error("unexpected end of payload: needed {needed} more bytes, {remaining} left")]
    UnexpectedEnd {
        /// Bytes the current field still required.
        needed: usize,
        /// Bytes left in the payload.
        remaining: usize,
    },

    /// A string field did not contain valid UTF-8.
    #[error("invalid UTF-8 in string field: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// An enum field carried an out-of-range discriminant.
    #[error("invalid {what} discriminant {value}")]
    InvalidDiscriminant {
        /// Name of the enum being decoded.
        what: &'static str,
        /// The offending raw value.
        value: u8,
    },

    /// Bytes were left over after the whole payload was decoded.
    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),
}

// ---------------------------------------------------------------------------
// WireWriter
// ---------------------------------------------------------------------------

/// Append-only payload builder. Field writers never fail.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Consumes the writer and returns the finished payload.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single raw byte.
    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Writes a boolean as one byte (0 or 1).
    pub fn put_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    /// Writes a signed 32-bit integer, little-endian.
    pub fn put_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes an unsigned 32-bit integer, little-endian.
    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a 32-bit float, little-endian.
    pub fn put_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a string as a `u32` byte length followed by UTF-8 bytes.
    pub fn put_str(&mut self, value: &str) {
        self.put_u32(value.len() as u32);
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Writes a 2D vector as two `f32` fields (x, y).
    pub fn put_vec2(&mut self, value: Vec2) {
        self.put_f32(value.x);
        self.put_f32(value.y);
    }

    /// Writes a 3D vector as three `f32` fields (x, y, z).
    pub fn put_vec3(&mut self, value: Vec3) {
        self.put_f32(value.x);
        self.put_f32(value.y);
        self.put_f32(value.z);
    }

    /// Writes a quaternion as four `f32` fields (x, y, z, w).
    pub fn put_quat(&mut self, value: Quat) {
        self.put_f32(value.x);
        self.put_f32(value.y);
        self.put_f32(value.z);
        self.put_f32(value.w);
    }

    /// Writes an identity as its kind byte followed by the `i32` id.
    pub fn put_identity(&mut self, value: Identity) {
        self.put_u8(value.kind as u8);
        self.put_i32(value.id);
    }
}

// ---------------------------------------------------------------------------
// WireReader
// ---------------------------------------------------------------------------

/// Cursor over a received payload. Field readers consume bytes in order and
/// fail with [`WireError::UnexpectedEnd`] on truncated input.
#[derive(Debug)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Creates a reader over `data` positioned at the start.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Fails with [`WireError::TrailingBytes`] if the payload was not fully
    /// consumed. Callers that tolerate suffix data simply skip this check.
    pub fn finish(self) -> Result<(), WireError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(WireError::TrailingBytes(n)),
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < n {
            return Err(WireError::UnexpectedEnd {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Reads a single raw byte.
    pub fn get_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    /// Reads a boolean; any nonzero byte is `true`.
    pub fn get_bool(&mut self) -> Result<bool, WireError> {
        Ok(self.get_u8()? != 0)
    }

    /// Reads a signed 32-bit integer, little-endian.
    pub fn get_i32(&mut self) -> Result<i32, WireError> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads an unsigned 32-bit integer, little-endian.
    pub fn get_u32(&mut self) -> Result<u32, WireError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a 32-bit float, little-endian.
    pub fn get_f32(&mut self) -> Result<f32, WireError> {
        let bytes = self.take(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn get_str(&mut self) -> Result<String, WireError> {
        let len = self.get_u32()? as usize;
        let bytes = self.take(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Reads a 2D vector (x, y).
    pub fn get_vec2(&mut self) -> Result<Vec2, WireError> {
        Ok(Vec2::new(self.get_f32()?, self.get_f32()?))
    }

    /// Reads a 3D vector (x, y, z).
    pub fn get_vec3(&mut self) -> Result<Vec3, WireError> {
        Ok(Vec3::new(self.get_f32()?, self.get_f32()?, self.get_f32()?))
    }

    /// Reads a quaternion (x, y, z, w).
    pub fn get_quat(&mut self) -> Result<Quat, WireError> {
        Ok(Quat::from_xyzw(
            self.get_f32()?,
            self.get_f32()?,
            self.get_f32()?,
            self.get_f32()?,
        ))
    }

    /// Reads an identity (kind byte + `i32` id).
    pub fn get_identity(&mut self) -> Result<Identity, WireError> {
        let raw = self.get_u8()?;
        let kind = IdentityKind::from_tag(raw).ok_or(WireError::InvalidDiscriminant {
            what: "IdentityKind",
            value: raw,
        })?;
        let id = self.get_i32()?;
        Ok(Identity { kind, id })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
