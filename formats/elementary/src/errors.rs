use codec_bitstream::errors::BitstreamError;
use codec_h264::errors::H264CodecError;
use codec_hevc::errors::HevcCodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FramingError {
    #[error("stream does not start with a unit marker, got {byte:#04x} at offset {offset}")]
    MissingInitialMarker { byte: u8, offset: usize },
    #[error("stream ended before the first unit marker, {0} bytes seen")]
    TruncatedInitialMarker(usize),
    #[error("stream ended inside a length prefixed unit: expect {expected} bytes, got {got}")]
    TruncatedLengthPrefixedUnit { expected: usize, got: usize },
    #[error("unit too large: {size} bytes, max {max}")]
    UnitTooLarge { size: usize, max: usize },
}

pub type FramingResult<T> = Result<T, FramingError>;

#[derive(Debug, Error)]
pub enum ElementaryError {
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),
    #[error("bitstream error: {0}")]
    Bitstream(#[from] BitstreamError),
    #[error("h264 codec error: {0}")]
    H264CodecError(#[from] H264CodecError),
    #[error("hevc codec error: {0}")]
    HevcCodecError(#[from] HevcCodecError),
    #[error("invalid stream config: {0}")]
    InvalidConfig(String),
}

pub type ElementaryResult<T> = Result<T, ElementaryError>;
