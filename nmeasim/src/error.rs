//! Encoding errors shared by the sentence, AIS and NMEA 2000 encoders.
//!
//! An encoding failure is local to one sentence: the simulation logs it and
//! carries on with the rest of the tick.

use thiserror::Error;

/// A value could not be represented in the target wire format.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    /// Numeric field is NaN or infinite
    #[error("Field {field} is not a finite number")]
    NotFinite { field: &'static str },

    /// Numeric field outside what the protocol can express
    #[error("Field {field} = {value} is out of range ({reason})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Text field longer than its fixed width
    #[error("Field {field} '{value}' exceeds {max} characters")]
    TextTooLong {
        field: &'static str,
        value: String,
        max: usize,
    },

    /// Character outside the protocol's character set
    #[error("Field {field} contains unsupported character {ch:?}")]
    InvalidCharacter { field: &'static str, ch: char },

    /// Finished sentence longer than the protocol maximum
    #[error("Sentence is {len} characters, longer than the {max} allowed")]
    SentenceTooLong { len: usize, max: usize },

    /// Binary payload too large for its transport
    #[error("Payload of {len} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { len: usize, max: usize },
}

/// Reject NaN and infinities.
pub(crate) fn finite(field: &'static str, value: f64) -> Result<f64, EncodeError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EncodeError::NotFinite { field })
    }
}
