use codec_bitstream::errors::BitstreamError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum H264CodecError {
    #[error("bitstream error: {0}")]
    Bitstream(#[from] BitstreamError),
    #[error("unknown nalu type: {0}")]
    UnknownNaluType(u8),
    #[error("syntax error: {0}")]
    SyntaxError(String),
    #[error("invalid {field}: {value}")]
    InvalidFieldValue { field: &'static str, value: u64 },
    #[error("unknown video format: {0}")]
    UnknownVideoFormat(u8),
}

pub type H264CodecResult<T> = Result<T, H264CodecError>;
