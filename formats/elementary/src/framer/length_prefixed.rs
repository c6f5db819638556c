use byteorder::{BigEndian, ByteOrder};
use num::ToPrimitive;
use tokio_util::bytes::BytesMut;
use utils::bytes::HexPreview;

use crate::{
    errors::{FramingError, FramingResult},
    unit::FramedUnit,
};

use super::UnitFramer;

const LOG_PREVIEW_BYTES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Length { seen: usize, value: u64 },
    Payload { remaining: usize },
}

impl Default for State {
    fn default() -> Self {
        Self::Length { seen: 0, value: 0 }
    }
}

/// Units preceded by a big endian length of 1, 2 or 4 bytes, as in
/// `AVCDecoderConfigurationRecord` based streams.
#[derive(Debug)]
pub struct LengthPrefixedFramer {
    length_size: usize,
    max_unit_size: usize,
    state: State,
    current: BytesMut,
    current_timestamp: Option<i64>,
}

impl LengthPrefixedFramer {
    pub fn new(length_size: u8, max_unit_size: usize) -> Self {
        Self {
            length_size: usize::from(length_size),
            max_unit_size,
            state: State::default(),
            current: BytesMut::new(),
            current_timestamp: None,
        }
    }

    fn begin_unit(&mut self, length: u64, timestamp: Option<i64>) -> FramingResult<()> {
        if length == 0 {
            tracing::trace!("zero length unit skipped");
            self.state = State::default();
            return Ok(());
        }
        let length = length
            .to_usize()
            .filter(|v| *v <= self.max_unit_size)
            .ok_or(FramingError::UnitTooLarge {
                size: length.to_usize().unwrap_or(usize::MAX),
                max: self.max_unit_size,
            })?;
        self.current = BytesMut::with_capacity(length);
        self.current_timestamp = timestamp;
        self.state = State::Payload { remaining: length };
        Ok(())
    }
}

impl UnitFramer for LengthPrefixedFramer {
    fn feed(&mut self, chunk: &[u8], timestamp: Option<i64>) -> FramingResult<Vec<FramedUnit>> {
        let mut out = Vec::new();
        let mut pos = 0;
        while pos < chunk.len() {
            match self.state {
                State::Length { seen: 0, .. } if chunk.len() - pos >= self.length_size => {
                    let length = BigEndian::read_uint(&chunk[pos..], self.length_size);
                    pos += self.length_size;
                    self.begin_unit(length, timestamp)?;
                }
                State::Length {
                    mut seen,
                    mut value,
                } => {
                    while seen < self.length_size && pos < chunk.len() {
                        value = (value << 8) | u64::from(chunk[pos]);
                        seen += 1;
                        pos += 1;
                    }
                    if seen == self.length_size {
                        self.begin_unit(value, timestamp)?;
                    } else {
                        self.state = State::Length { seen, value };
                    }
                }
                State::Payload { remaining } => {
                    let take = remaining.min(chunk.len() - pos);
                    self.current.extend_from_slice(&chunk[pos..pos + take]);
                    pos += take;
                    if take < remaining {
                        self.state = State::Payload {
                            remaining: remaining - take,
                        };
                        continue;
                    }
                    let payload = self.current.split().freeze();
                    tracing::trace!(
                        "unit framed, {} bytes: {}",
                        payload.len(),
                        HexPreview::new(&payload, LOG_PREVIEW_BYTES)
                    );
                    out.push(FramedUnit {
                        payload,
                        timestamp: self.current_timestamp,
                    });
                    self.state = State::default();
                }
            }
        }
        Ok(out)
    }

    fn finish(&mut self) -> FramingResult<Vec<FramedUnit>> {
        let state = std::mem::take(&mut self.state);
        let got = self.current.len();
        self.current.clear();
        match state {
            State::Length { seen: 0, .. } => Ok(Vec::new()),
            State::Length { seen, .. } => Err(FramingError::TruncatedLengthPrefixedUnit {
                expected: self.length_size,
                got: seen,
            }),
            State::Payload { remaining } => Err(FramingError::TruncatedLengthPrefixedUnit {
                expected: got + remaining,
                got,
            }),
        }
    }

    fn flush(&mut self) {
        tracing::debug!(
            "length prefixed framer flushed, dropping {} buffered bytes",
            self.current.len()
        );
        self.state = State::default();
        self.current.clear();
        self.current_timestamp = None;
    }
}
