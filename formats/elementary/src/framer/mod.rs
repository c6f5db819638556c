use length_prefixed::LengthPrefixedFramer;
use start_code::{StartCodeFramer, StartCodePattern};

use crate::{config::FramingMode, errors::FramingResult, unit::FramedUnit};

pub mod length_prefixed;
pub mod start_code;

/// Splits a chunked elementary stream into units.
///
/// Units are only handed out once their end is known, so a unit may be
/// returned by a later `feed` than the one that carried its first byte.
pub trait UnitFramer {
    fn feed(&mut self, chunk: &[u8], timestamp: Option<i64>) -> FramingResult<Vec<FramedUnit>>;
    /// End of stream, returns the units still being assembled.
    fn finish(&mut self) -> FramingResult<Vec<FramedUnit>>;
    /// Drops all partial state, the next byte is treated as a stream start.
    fn flush(&mut self);
}

pub fn new_framer(mode: FramingMode, max_unit_size: usize) -> Box<dyn UnitFramer + Send> {
    match mode {
        FramingMode::StartCode(family) => Box::new(StartCodeFramer::new(
            StartCodePattern::from(family),
            max_unit_size,
        )),
        FramingMode::LengthPrefixed { length_size } => {
            Box::new(LengthPrefixedFramer::new(length_size, max_unit_size))
        }
    }
}
