use std::io::Cursor;

use bitstream_io::{BigEndian, BitRead, BitReader};
use num::ToPrimitive;

use crate::{
    errors::{BitstreamError, BitstreamResult},
    exp_golomb,
};

/// Forward-only bit cursor over an RBSP buffer.
///
/// Every read checks the remaining length before touching the underlying
/// reader, so running off the end of a unit surfaces as
/// [`BitstreamError::Underrun`] and the cursor is left where it was.
/// Positions are taken from the underlying reader, reads made through
/// [`Self::reader_mut`] are accounted for.
pub struct BitstreamReader<'a> {
    reader: BitReader<Cursor<&'a [u8]>, BigEndian>,
    buf: &'a [u8],
}

impl<'a> BitstreamReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            reader: BitReader::endian(Cursor::new(buf), BigEndian),
            buf,
        }
    }

    pub fn reader(&self) -> &BitReader<Cursor<&'a [u8]>, BigEndian> {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut BitReader<Cursor<&'a [u8]>, BigEndian> {
        &mut self.reader
    }

    pub fn position_in_bits(&mut self) -> usize {
        // an in-memory cursor always knows its position, a failure reads as
        // an exhausted buffer
        self.reader
            .position_in_bits()
            .ok()
            .and_then(|v| v.to_usize())
            .unwrap_or(self.buf.len().saturating_mul(8))
    }

    pub fn remaining_bits(&mut self) -> usize {
        self.buf
            .len()
            .saturating_mul(8)
            .saturating_sub(self.position_in_bits())
    }

    pub fn more_bits(&mut self) -> bool {
        self.remaining_bits() > 0
    }

    pub fn is_byte_aligned(&self) -> bool {
        self.reader.byte_aligned()
    }

    /// True while the cursor sits before the rbsp_stop_one_bit, i.e. the last
    /// set bit of the buffer.
    pub fn more_rbsp_data(&mut self) -> bool {
        let Some(last) = self.buf.iter().rposition(|b| *b != 0) else {
            return false;
        };
        let stop_bit = last * 8 + (7 - self.buf[last].trailing_zeros() as usize);
        self.position_in_bits() < stop_bit
    }

    fn ensure_available(&mut self, requested: usize) -> BitstreamResult<()> {
        let available = self.remaining_bits();
        if requested > available {
            return Err(BitstreamError::Underrun {
                requested,
                available,
            });
        }
        Ok(())
    }

    /// u(1)
    pub fn read_flag(&mut self) -> BitstreamResult<bool> {
        self.ensure_available(1)?;
        Ok(self.reader.read_bit()?)
    }

    /// u(n), MSB first, n <= 32
    pub fn read_bits(&mut self, bits: u32) -> BitstreamResult<u32> {
        if bits > 32 {
            return Err(BitstreamError::TooManyBits(bits));
        }
        if bits == 0 {
            return Ok(0);
        }
        let requested = bits.to_usize().ok_or(BitstreamError::TooManyBits(bits))?;
        self.ensure_available(requested)?;
        Ok(self.reader.read_var::<u32>(bits)?)
    }

    /// Saturating u(n): reads at most `bits`, fewer when the buffer runs out,
    /// and never fails on a short buffer. Callers must opt in explicitly.
    pub fn read_bits_lenient(&mut self, bits: u32) -> BitstreamResult<u32> {
        if bits > 32 {
            return Err(BitstreamError::TooManyBits(bits));
        }
        let available = self
            .remaining_bits()
            .min(bits as usize)
            .to_u32()
            .unwrap_or(0);
        if available < bits {
            tracing::trace!(
                "lenient read of {} bits saturated to {} bits",
                bits,
                available
            );
        }
        self.read_bits(available)
    }

    /// i(n), two's complement
    pub fn read_signed_bits(&mut self, bits: u32) -> BitstreamResult<i32> {
        let value = self.read_bits(bits)?;
        if bits == 0 || bits == 32 {
            return Ok(value as i32);
        }
        let sign = 1_u32 << (bits - 1);
        if value & sign == 0 {
            Ok(value as i32)
        } else {
            Ok((i64::from(value) - (1_i64 << bits)) as i32)
        }
    }

    /// ue(v)
    pub fn read_ue(&mut self) -> BitstreamResult<u32> {
        exp_golomb::read_ue(self)
    }

    /// se(v)
    pub fn read_se(&mut self) -> BitstreamResult<i32> {
        exp_golomb::read_se(self)
    }

    pub fn skip_bits(&mut self, bits: u32) -> BitstreamResult<()> {
        if bits == 0 {
            return Ok(());
        }
        let requested = bits.to_usize().ok_or(BitstreamError::TooManyBits(bits))?;
        self.ensure_available(requested)?;
        Ok(self.reader.skip(bits)?)
    }

    pub fn byte_align(&mut self) -> BitstreamResult<()> {
        let padding = (8 - self.position_in_bits() % 8) % 8;
        self.skip_bits(padding as u32)
    }
}
