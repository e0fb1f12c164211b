//! MSB-first bit packing for AIS payloads.

use crate::error::EncodeError;

/// A growable bit string, packed most significant bit first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bits {
    bytes: Vec<u8>,
    len: usize,
}

impl Bits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            len: 0,
        }
    }

    /// Number of bits written.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bit at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| self.bytes[index / 8] & (0x80 >> (index % 8)) != 0)
    }

    pub fn push_bit(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 0x80 >> (self.len % 8);
        }
        self.len += 1;
    }

    /// Append the low `width` bits of `value`.
    pub fn push_unsigned(&mut self, value: u64, width: u32) {
        debug_assert!(width <= 64);
        for shift in (0..width).rev() {
            self.push_bit((value >> shift) & 1 == 1);
        }
    }

    /// Append `value` as a `width`-bit two's complement integer.
    pub fn push_signed(&mut self, value: i64, width: u32) {
        let mask = if width >= 64 {
            u64::MAX
        } else {
            (1u64 << width) - 1
        };
        self.push_unsigned(value as u64 & mask, width);
    }

    /// Append `text` as `chars` six-bit characters, padded with `@`.
    ///
    /// Lower-case letters are upper-cased.
    ///
    /// # Errors
    ///
    /// Fails if the text is longer than `chars` or contains a character
    /// outside the six-bit set.
    pub fn push_text(
        &mut self,
        field: &'static str,
        text: &str,
        chars: usize,
    ) -> Result<(), EncodeError> {
        if text.chars().count() > chars {
            return Err(EncodeError::TextTooLong {
                field,
                value: text.to_string(),
                max: chars,
            });
        }
        for ch in text.chars() {
            let code = sixbit_code(ch.to_ascii_uppercase())
                .ok_or(EncodeError::InvalidCharacter { field, ch })?;
            self.push_unsigned(u64::from(code), 6);
        }
        for _ in text.chars().count()..chars {
            self.push_unsigned(0, 6);
        }
        Ok(())
    }

    /// Pad with zero bits to a multiple of `boundary`, returning the count
    /// added.
    pub fn pad_to(&mut self, boundary: usize) -> usize {
        let fill = (boundary - self.len % boundary) % boundary;
        for _ in 0..fill {
            self.push_bit(false);
        }
        fill
    }

    /// Drop bits past `len`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.len = len;
        self.bytes.truncate(len.div_ceil(8));
        if len % 8 != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= 0xFFu8 << (8 - len % 8);
            }
        }
    }

    /// Append every bit of `other`.
    pub fn extend(&mut self, other: &Bits) {
        for i in 0..other.len {
            self.push_bit(other.bytes[i / 8] & (0x80 >> (i % 8)) != 0);
        }
    }

    /// Reader positioned at the first bit.
    pub fn reader(&self) -> BitReader<'_> {
        BitReader {
            bits: self,
            position: 0,
        }
    }
}

/// Six-bit code for an ASCII character: `@`..`_` map to 0..31, space..`?`
/// map to 32..63.
fn sixbit_code(ch: char) -> Option<u8> {
    match ch {
        '@'..='_' => Some(ch as u8 - 64),
        ' '..='?' => Some(ch as u8),
        _ => None,
    }
}

fn sixbit_char(code: u8) -> char {
    if code < 32 {
        (code + 64) as char
    } else {
        code as char
    }
}

/// Sequential reader over [`Bits`].
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bits: &'a Bits,
    position: usize,
}

impl BitReader<'_> {
    /// Bits not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bits.len - self.position
    }

    pub fn skip(&mut self, width: usize) -> Option<()> {
        (width <= self.remaining()).then(|| self.position += width)
    }

    pub fn read_bit(&mut self) -> Option<bool> {
        let bit = self.bits.get(self.position)?;
        self.position += 1;
        Some(bit)
    }

    pub fn read_unsigned(&mut self, width: u32) -> Option<u64> {
        if width as usize > self.remaining() {
            return None;
        }
        let mut value = 0u64;
        for _ in 0..width {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Some(value)
    }

    /// Sign-extended two's complement field.
    pub fn read_signed(&mut self, width: u32) -> Option<i64> {
        let raw = self.read_unsigned(width)?;
        if width == 0 || width >= 64 {
            return Some(raw as i64);
        }
        let sign = 1u64 << (width - 1);
        Some(if raw & sign != 0 {
            (raw | !((1u64 << width) - 1)) as i64
        } else {
            raw as i64
        })
    }

    /// `chars` six-bit characters with `@` padding and trailing spaces
    /// removed.
    pub fn read_text(&mut self, chars: usize) -> Option<String> {
        let mut text = String::with_capacity(chars);
        for _ in 0..chars {
            text.push(sixbit_char(self.read_unsigned(6)? as u8));
        }
        let end = text.find('@').unwrap_or(text.len());
        text.truncate(end);
        Some(text.trim_end().to_string())
    }
}
