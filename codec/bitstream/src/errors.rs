use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BitstreamError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("bitstream underrun: requested {requested} bits, {available} available")]
    Underrun { requested: usize, available: usize },
    #[error("invalid Exp-Golomb code: {0}")]
    InvalidExpGolombCode(String),
    #[error("cannot read {0} bits into a 32 bit value")]
    TooManyBits(u32),
    #[error("unit too short: {length} bytes, header needs {header_length}")]
    TruncatedUnit { length: usize, header_length: usize },
}

pub type BitstreamResult<T> = Result<T, BitstreamError>;
