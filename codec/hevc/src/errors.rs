use codec_bitstream::errors::BitstreamError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HevcCodecError {
    #[error("bitstream error: {0}")]
    Bitstream(#[from] BitstreamError),
    #[error("nalu too short: {length} bytes, expect at least {expected}")]
    TruncatedHeader { length: usize, expected: usize },
}

pub type HevcCodecResult<T> = Result<T, HevcCodecError>;
