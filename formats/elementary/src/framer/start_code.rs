use std::mem;

use tokio_util::bytes::{Buf, BytesMut};
use utils::bytes::HexPreview;

use crate::{
    config::StartCodeFamily,
    errors::{FramingError, FramingResult},
    unit::FramedUnit,
};

use super::UnitFramer;

const MAX_MARKER_LENGTH: usize = 4;
const LOG_PREVIEW_BYTES: usize = 8;

/// Marks a unit that must not be closed at the next marker: the next unit
/// is appended to it instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    None,
    /// checked against the byte right after the marker
    FollowingByte { mask: u8, value: u8 },
    /// checked against the last marker byte
    MarkerByte { mask: u8, value: u8 },
}

/// A masked start code: `byte & mask == pattern & mask` at every position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartCodePattern {
    pub pattern: [u8; MAX_MARKER_LENGTH],
    pub mask: [u8; MAX_MARKER_LENGTH],
    /// 3 or 4
    pub length: usize,
    /// leading marker bytes dropped from the unit, the rest are kept as its
    /// first bytes
    pub prefix_length: usize,
    pub continuation: Continuation,
    /// zero bytes are allowed ahead of the first marker
    pub allow_leading_zeros: bool,
    /// trailing zero bytes belong to the next marker, not to the unit
    pub trim_trailing_zeros: bool,
}

impl StartCodePattern {
    fn matches_at(&self, index: usize, byte: u8) -> bool {
        byte & self.mask[index] == self.pattern[index] & self.mask[index]
    }

    fn is_prefix(&self, bytes: &[u8]) -> bool {
        bytes
            .iter()
            .enumerate()
            .all(|(index, byte)| self.matches_at(index, *byte))
    }
}

impl From<StartCodeFamily> for StartCodePattern {
    fn from(value: StartCodeFamily) -> Self {
        let (pattern, mask, length, prefix_length, continuation) = match value {
            StartCodeFamily::AnnexB => (
                [0x00, 0x00, 0x01, 0x00],
                [0xFF, 0xFF, 0xFF, 0x00],
                3,
                3,
                Continuation::None,
            ),
            // VOP start code
            StartCodeFamily::Mpeg4 => (
                [0x00, 0x00, 0x01, 0xB6],
                [0xFF; 4],
                4,
                3,
                Continuation::None,
            ),
            // packed bitstreams put a second VOP behind the first one
            StartCodeFamily::DivX => (
                [0x00, 0x00, 0x01, 0xB6],
                [0xFF; 4],
                4,
                3,
                Continuation::FollowingByte {
                    mask: 0xF0,
                    value: 0x80,
                },
            ),
            // picture start code, 22 bits
            StartCodeFamily::H263 => (
                [0x00, 0x00, 0x80, 0x00],
                [0xFF, 0xFF, 0xFC, 0x00],
                3,
                2,
                Continuation::None,
            ),
            // field, frame, entry point and sequence header start codes, the
            // last two are glued to the frame that follows them
            StartCodeFamily::Vc1 => (
                [0x00, 0x00, 0x01, 0x0C],
                [0xFF, 0xFF, 0xFF, 0xFC],
                4,
                3,
                Continuation::MarkerByte {
                    mask: 0xFE,
                    value: 0x0E,
                },
            ),
            // picture start code
            StartCodeFamily::Mpeg2 => (
                [0x00, 0x00, 0x01, 0x00],
                [0xFF; 4],
                4,
                3,
                Continuation::None,
            ),
        };
        let annex_b = value == StartCodeFamily::AnnexB;
        Self {
            pattern,
            mask,
            length,
            prefix_length,
            continuation,
            allow_leading_zeros: annex_b,
            trim_trailing_zeros: annex_b,
        }
    }
}

#[derive(Debug)]
pub struct StartCodeFramer {
    pattern: StartCodePattern,
    max_unit_size: usize,
    /// the first `matched` bytes are the marker prefix seen so far
    window: [u8; MAX_MARKER_LENGTH],
    matched: usize,
    marker_last_byte: u8,
    awaiting_following_byte: bool,
    skip_boundary: bool,
    /// bytes of the stream's leading marker prefix checked so far
    validated: usize,
    seen_marker: bool,
    bytes_seen: usize,
    current: BytesMut,
    current_timestamp: Option<i64>,
}

impl StartCodeFramer {
    pub fn new(pattern: StartCodePattern, max_unit_size: usize) -> Self {
        Self {
            pattern,
            max_unit_size,
            window: [0; MAX_MARKER_LENGTH],
            matched: 0,
            marker_last_byte: 0,
            awaiting_following_byte: false,
            skip_boundary: false,
            validated: 0,
            seen_marker: false,
            bytes_seen: 0,
            current: BytesMut::new(),
            current_timestamp: None,
        }
    }

    fn validate(&mut self, byte: u8) -> FramingResult<()> {
        let last = self.pattern.prefix_length - 1;
        if self.pattern.allow_leading_zeros && byte == 0 && self.validated <= last {
            self.validated = (self.validated + 1).min(last);
            return Ok(());
        }
        if !self.pattern.matches_at(self.validated, byte) {
            return Err(FramingError::MissingInitialMarker {
                byte,
                offset: self.bytes_seen,
            });
        }
        self.validated += 1;
        Ok(())
    }

    /// Returns true when `byte` completes a marker.
    fn advance_match(&mut self, byte: u8) -> bool {
        if self.pattern.matches_at(self.matched, byte) {
            self.window[self.matched] = byte;
            self.matched += 1;
            if self.matched < self.pattern.length {
                return false;
            }
            // markers never overlap
            self.marker_last_byte = byte;
            self.matched = 0;
            return true;
        }
        let mut candidate = [0_u8; MAX_MARKER_LENGTH];
        let len = self.matched + 1;
        candidate[..self.matched].copy_from_slice(&self.window[..self.matched]);
        candidate[self.matched] = byte;
        self.fall_back(&candidate[..len]);
        false
    }

    /// Keeps the longest proper suffix of `bytes` that is still a marker prefix.
    fn fall_back(&mut self, bytes: &[u8]) {
        self.matched = 0;
        for k in (1..bytes.len()).rev() {
            let suffix = &bytes[bytes.len() - k..];
            if self.pattern.is_prefix(suffix) {
                self.window[..k].copy_from_slice(suffix);
                self.matched = k;
                return;
            }
        }
    }

    /// `current` ends with a complete marker.
    fn on_marker(
        &mut self,
        continues: bool,
        timestamp: Option<i64>,
        out: &mut Vec<FramedUnit>,
    ) -> FramingResult<()> {
        let marker_start = self.current.len().saturating_sub(self.pattern.length);
        let skip = mem::take(&mut self.skip_boundary);
        if !self.seen_marker {
            self.seen_marker = true;
            let mut leading = self.current.split_to(marker_start);
            if !self.pattern.allow_leading_zeros {
                // headers ahead of the first marker make up a unit of their own
                leading.advance(self.pattern.prefix_length.min(leading.len()));
                self.emit(leading, self.current_timestamp, out)?;
            }
            self.start_unit(timestamp);
        } else if skip {
            tracing::trace!(
                "marker at stream offset {} kept inside the unit",
                self.bytes_seen
            );
        } else {
            let unit = self.current.split_to(marker_start);
            self.emit(unit, self.current_timestamp, out)?;
            self.start_unit(timestamp);
        }
        self.skip_boundary = continues;
        Ok(())
    }

    fn start_unit(&mut self, timestamp: Option<i64>) {
        self.current
            .advance(self.pattern.prefix_length.min(self.current.len()));
        self.current_timestamp = timestamp;
    }

    fn emit(
        &self,
        mut unit: BytesMut,
        timestamp: Option<i64>,
        out: &mut Vec<FramedUnit>,
    ) -> FramingResult<()> {
        if self.pattern.trim_trailing_zeros {
            let trimmed = unit.iter().rposition(|b| *b != 0).map_or(0, |pos| pos + 1);
            unit.truncate(trimmed);
        }
        if unit.is_empty() {
            tracing::trace!("empty unit skipped");
            return Ok(());
        }
        if unit.len() > self.max_unit_size {
            return Err(FramingError::UnitTooLarge {
                size: unit.len(),
                max: self.max_unit_size,
            });
        }
        tracing::trace!(
            "unit framed, {} bytes: {}",
            unit.len(),
            HexPreview::new(&unit, LOG_PREVIEW_BYTES)
        );
        out.push(FramedUnit {
            payload: unit.freeze(),
            timestamp,
        });
        Ok(())
    }

    fn continues_after_marker(&self) -> bool {
        match self.pattern.continuation {
            Continuation::MarkerByte { mask, value } => self.marker_last_byte & mask == value,
            _ => false,
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.pattern, self.max_unit_size);
    }
}

impl UnitFramer for StartCodeFramer {
    fn feed(&mut self, chunk: &[u8], timestamp: Option<i64>) -> FramingResult<Vec<FramedUnit>> {
        let mut out = Vec::new();
        // bytes of `chunk` before this index are already in `current`
        let mut appended = 0;
        for (pos, &byte) in chunk.iter().enumerate() {
            if self.bytes_seen == 0 {
                self.current_timestamp = timestamp;
            }
            if self.validated < self.pattern.prefix_length {
                self.validate(byte)?;
            }
            self.bytes_seen += 1;

            if self.awaiting_following_byte {
                self.awaiting_following_byte = false;
                self.current.extend_from_slice(&chunk[appended..pos]);
                appended = pos;
                let continues = match self.pattern.continuation {
                    Continuation::FollowingByte { mask, value } => byte & mask == value,
                    _ => false,
                };
                self.on_marker(continues, timestamp, &mut out)?;
            }

            if self.advance_match(byte) {
                if matches!(
                    self.pattern.continuation,
                    Continuation::FollowingByte { .. }
                ) {
                    self.awaiting_following_byte = true;
                } else {
                    self.current.extend_from_slice(&chunk[appended..=pos]);
                    appended = pos + 1;
                    self.on_marker(self.continues_after_marker(), timestamp, &mut out)?;
                }
            }
        }
        self.current.extend_from_slice(&chunk[appended..]);
        if self.current.len() > self.max_unit_size {
            return Err(FramingError::UnitTooLarge {
                size: self.current.len(),
                max: self.max_unit_size,
            });
        }
        Ok(out)
    }

    fn finish(&mut self) -> FramingResult<Vec<FramedUnit>> {
        if self.validated < self.pattern.prefix_length {
            let bytes_seen = self.bytes_seen;
            self.reset();
            if bytes_seen == 0 {
                return Ok(Vec::new());
            }
            return Err(FramingError::TruncatedInitialMarker(bytes_seen));
        }
        let mut out = Vec::new();
        if self.awaiting_following_byte {
            self.awaiting_following_byte = false;
            self.on_marker(false, self.current_timestamp, &mut out)?;
        }
        let mut rest = mem::take(&mut self.current);
        if !self.seen_marker {
            rest.advance(self.pattern.prefix_length.min(rest.len()));
        }
        let result = self.emit(rest, self.current_timestamp, &mut out);
        self.reset();
        result.map(|_| out)
    }

    fn flush(&mut self) {
        tracing::debug!(
            "start code framer flushed, dropping {} buffered bytes",
            self.current.len()
        );
        self.reset();
    }
}
