use std::io;

use bitstream_io::BitWrite;
use num::ToPrimitive;

use crate::{
    errors::{BitstreamError, BitstreamResult},
    reader::BitstreamReader,
};

const MAX_LEADING_ZERO_BITS: u32 = 31;

fn read_code_num(reader: &mut BitstreamReader) -> BitstreamResult<u32> {
    let start = reader.position_in_bits();
    let mut leading_zero_bits = 0_u32;
    while !reader.read_flag()? {
        leading_zero_bits += 1;
        if leading_zero_bits > MAX_LEADING_ZERO_BITS {
            return Err(BitstreamError::InvalidExpGolombCode(format!(
                "got more than {} leading zero bits at bit {}",
                MAX_LEADING_ZERO_BITS, start
            )));
        }
    }

    let remaining = reader.read_bits(leading_zero_bits)?;
    // 2^k - 1 + remaining, at most 2^32 - 2 for k <= 31
    ((1_u64 << leading_zero_bits) - 1 + u64::from(remaining))
        .to_u32()
        .ok_or_else(|| {
            BitstreamError::InvalidExpGolombCode(format!(
                "code num overflow at bit {}",
                start
            ))
        })
}

pub fn read_ue(reader: &mut BitstreamReader) -> BitstreamResult<u32> {
    read_code_num(reader)
}

/// (-1)^(k+1) * ceil(k / 2)
pub fn read_se(reader: &mut BitstreamReader) -> BitstreamResult<i32> {
    let code_num = i64::from(read_code_num(reader)?);
    let magnitude = (code_num + 1) / 2;
    let value = if code_num & 0b1 == 0b1 {
        magnitude
    } else {
        -magnitude
    };
    value.to_i32().ok_or_else(|| {
        BitstreamError::InvalidExpGolombCode(format!("se(v) out of range: {}", value))
    })
}

pub fn ue_bits_count(value: u32) -> u32 {
    let code = u64::from(value) + 1;
    let leading_zero_bits = 63 - code.leading_zeros();
    leading_zero_bits * 2 + 1
}

pub fn write_ue<W: BitWrite>(writer: &mut W, value: u32) -> io::Result<()> {
    let code = u64::from(value) + 1;
    let leading_zero_bits = 63 - code.leading_zeros();
    for _ in 0..leading_zero_bits {
        writer.write_bit(false)?;
    }
    // the top bit of `code` is the marker 1
    writer.write_var(leading_zero_bits + 1, code)
}

pub fn write_se<W: BitWrite>(writer: &mut W, value: i32) -> io::Result<()> {
    let magnitude = u64::from(value.unsigned_abs());
    let code_num = if value > 0 {
        magnitude * 2 - 1
    } else {
        magnitude * 2
    };
    let code_num = code_num.to_u32().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("se(v) value too large to encode: {}", value),
        )
    })?;
    write_ue(writer, code_num)
}
