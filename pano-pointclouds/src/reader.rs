use crate::{DecodeError, DecodeResult};

/// Reads big-endian primitives out of a byte buffer, front to back.
///
/// Every read either consumes exactly its width or fails with [`DecodeError::Truncated`]
/// without moving the cursor.
#[derive(Debug, Clone)]
pub struct StreamReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> StreamReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fails unless at least `wanted` more bytes are available.
    ///
    /// Used before allocating for element counts read from the stream.
    pub fn ensure_remaining(&self, wanted: usize) -> DecodeResult<()> {
        if wanted > self.remaining() {
            Err(self.truncated(wanted))
        } else {
            Ok(())
        }
    }

    fn truncated(&self, wanted: usize) -> DecodeError {
        DecodeError::Truncated {
            offset: self.offset,
            wanted,
            len: self.buffer.len(),
        }
    }

    fn take<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let bytes = self
            .buffer
            .get(self.offset..self.offset + N)
            .ok_or_else(|| self.truncated(N))?;
        self.offset += N;
        let mut out = [0; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_byte(&mut self) -> DecodeResult<u8> {
        let [byte] = self.take::<1>()?;
        Ok(byte)
    }

    pub fn read_u16_be(&mut self) -> DecodeResult<u16> {
        self.take::<2>().map(u16::from_be_bytes)
    }

    pub fn read_f32_be(&mut self) -> DecodeResult<f32> {
        self.take::<4>().map(f32::from_be_bytes)
    }

    /// Reads a variable length unsigned integer.
    ///
    /// Each byte contributes its low 7 bits, most significant group first. The varint ends with
    /// the first byte whose top bit is **set**, which is the opposite of LEB128: `300` is
    /// written `[0x02, 0xAC]`.
    ///
    /// On failure the cursor is left where the varint started.
    pub fn read_var_int(&mut self) -> DecodeResult<u64> {
        let start = self.offset;
        let mut value: u64 = 0;
        loop {
            let byte = match self.read_byte() {
                Ok(byte) => byte,
                Err(e) => {
                    self.offset = start;
                    return Err(e);
                }
            };
            if value > u64::MAX >> 7 {
                self.offset = start;
                return Err(DecodeError::VarIntOverflow { offset: start });
            }
            value = (value << 7) | u64::from(byte & 0x7F);
            if byte & 0x80 != 0 {
                return Ok(value);
            }
        }
    }

    /// Reads a varint that is used as a count or index.
    pub fn read_var_usize(&mut self) -> DecodeResult<usize> {
        let start = self.offset;
        let value = self.read_var_int()?;
        usize::try_from(value).map_err(|_| {
            self.offset = start;
            DecodeError::VarIntOverflow { offset: start }
        })
    }
}
