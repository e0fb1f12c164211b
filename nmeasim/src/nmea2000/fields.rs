//! Little-endian field packing with NMEA 2000 resolutions.
//!
//! Unavailable values are written as all ones in the field's width (the
//! largest positive value for signed fields), reserved bits as ones.

use bytes::{BufMut, BytesMut};

use crate::error::{finite, EncodeError};

/// Resolution of angles in radians.
pub const ANGLE_RESOLUTION: f64 = 1e-4;

/// Resolution of speeds in meters per second.
pub const SPEED_RESOLUTION: f64 = 0.01;

/// Resolution of latitude and longitude in 32-bit fields.
pub const POSITION_RESOLUTION: f64 = 1e-7;

/// Resolution of latitude and longitude in 64-bit fields.
pub const POSITION_RESOLUTION_64: f64 = 1e-16;

/// Resolution of rate of turn in 16-bit AIS fields, radians per second.
pub const ROT_RESOLUTION: f64 = 3.125e-5;

/// Accumulates a PGN payload.
#[derive(Debug, Default)]
pub struct FieldWriter {
    buf: BytesMut,
}

impl FieldWriter {
    pub fn with_capacity(len: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(len),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.put_u8(value);
        self
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.buf.put_u16_le(value);
        self
    }

    pub fn i16(&mut self, value: i16) -> &mut Self {
        self.buf.put_i16_le(value);
        self
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.put_u32_le(value);
        self
    }

    pub fn i32(&mut self, value: i32) -> &mut Self {
        self.buf.put_i32_le(value);
        self
    }

    pub fn i64(&mut self, value: i64) -> &mut Self {
        self.buf.put_i64_le(value);
        self
    }

    /// `count` bytes of 0xFF.
    pub fn reserved(&mut self, count: usize) -> &mut Self {
        self.buf.put_bytes(0xFF, count);
        self
    }

    /// Fixed-width ASCII, upper-cased and padded with `@`.
    pub fn text(
        &mut self,
        field: &'static str,
        text: &str,
        width: usize,
    ) -> Result<&mut Self, EncodeError> {
        if text.len() > width {
            return Err(EncodeError::TextTooLong {
                field,
                value: text.to_string(),
                max: width,
            });
        }
        if let Some(ch) = text.chars().find(|c| !c.is_ascii()) {
            return Err(EncodeError::InvalidCharacter { field, ch });
        }
        self.buf.put_slice(text.to_ascii_uppercase().as_bytes());
        self.buf.put_bytes(b'@', width - text.len());
        Ok(self)
    }

    /// Pad with 0xFF up to `len` bytes.
    pub fn pad_to(&mut self, len: usize) -> &mut Self {
        if self.buf.len() < len {
            let missing = len - self.buf.len();
            self.buf.put_bytes(0xFF, missing);
        }
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

/// Scale `value` by `resolution` into an unsigned 16-bit field.
///
/// `0xFFFF` is reserved for "not available", so the largest encodable
/// value is `0xFFFD`.
pub fn scaled_u16(field: &'static str, value: f64, resolution: f64) -> Result<u16, EncodeError> {
    let raw = (finite(field, value)? / resolution).round();
    if !(0.0..=f64::from(0xFFFDu16)).contains(&raw) {
        return Err(EncodeError::OutOfRange {
            field,
            value,
            reason: "does not fit in 16 bits",
        });
    }
    Ok(raw as u16)
}

pub fn scaled_i16(field: &'static str, value: f64, resolution: f64) -> Result<i16, EncodeError> {
    let raw = (finite(field, value)? / resolution).round();
    if !(f64::from(i16::MIN)..=f64::from(0x7FFDi16)).contains(&raw) {
        return Err(EncodeError::OutOfRange {
            field,
            value,
            reason: "does not fit in 16 bits",
        });
    }
    Ok(raw as i16)
}

pub fn scaled_u32(field: &'static str, value: f64, resolution: f64) -> Result<u32, EncodeError> {
    let raw = (finite(field, value)? / resolution).round();
    if !(0.0..=f64::from(0xFFFF_FFFDu32)).contains(&raw) {
        return Err(EncodeError::OutOfRange {
            field,
            value,
            reason: "does not fit in 32 bits",
        });
    }
    Ok(raw as u32)
}

pub fn scaled_i32(field: &'static str, value: f64, resolution: f64) -> Result<i32, EncodeError> {
    let raw = (finite(field, value)? / resolution).round();
    if !(f64::from(i32::MIN)..=f64::from(0x7FFF_FFFDi32)).contains(&raw) {
        return Err(EncodeError::OutOfRange {
            field,
            value,
            reason: "does not fit in 32 bits",
        });
    }
    Ok(raw as i32)
}

pub fn scaled_i64(field: &'static str, value: f64, resolution: f64) -> Result<i64, EncodeError> {
    let raw = (finite(field, value)? / resolution).round();
    // f64 cannot represent i64::MAX exactly; stay well inside the range
    if raw.abs() >= 9.0e18 {
        return Err(EncodeError::OutOfRange {
            field,
            value,
            reason: "does not fit in 64 bits",
        });
    }
    Ok(raw as i64)
}

/// Angle in degrees to an unsigned 1e-4 radian field in [0, 2π).
pub fn angle_u16(field: &'static str, degrees: f64) -> Result<u16, EncodeError> {
    let radians = finite(field, degrees)?.rem_euclid(360.0).to_radians();
    // 2π / 1e-4 = 62832, which still fits below 0xFFFD
    scaled_u16(field, radians, ANGLE_RESOLUTION)
}

/// Signed angle in degrees to a 1e-4 radian field.
pub fn angle_i16(field: &'static str, degrees: f64) -> Result<i16, EncodeError> {
    scaled_i16(field, finite(field, degrees)?.to_radians(), ANGLE_RESOLUTION)
}

/// Knots to a 0.01 m/s field.
pub fn speed_u16(field: &'static str, knots: f64) -> Result<u16, EncodeError> {
    scaled_u16(field, finite(field, knots)? * crate::vessel::KNOTS_TO_MPS, SPEED_RESOLUTION)
}
