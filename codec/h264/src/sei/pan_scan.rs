use codec_bitstream::reader::BitstreamReader;
use utils::traits::reader::BitwiseReadFrom;

use crate::errors::H264CodecError;

pub const MAX_PAN_SCAN_RECT: usize = 3;
const MAX_PAN_SCAN_RECT_ID: u32 = 0xFF;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanScanOffsets {
    pub left: i32,   // se(v)
    pub right: i32,  // se(v)
    pub top: i32,    // se(v)
    pub bottom: i32, // se(v)
}

/// @see: Section D.1.4 Pan-scan rectangle SEI message syntax
///
/// `rect_id` is `None` for a cancelled rectangle. The repetition period is
/// kept doubled when greater than one: each displayed frame uses up two
/// units of it, see [`PanScanRect::decay`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanScanRect {
    pub rect_id: Option<u8>, // ue(v), in [0, 255]
    /// empty if pan_scan_rect_cancel_flag
    pub offsets: Vec<PanScanOffsets>,
    pub repetition_period: u32, // ue(v)
}

impl PanScanRect {
    /// The record stored in place of a cancelled or malformed rectangle.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.rect_id.is_none()
    }

    /// Uses up one display of the rectangle, returns false once it should
    /// no longer be shown.
    pub fn decay(&mut self) -> bool {
        if self.repetition_period <= 2 {
            self.repetition_period = 0;
            return false;
        }
        self.repetition_period -= 2;
        true
    }
}

impl<'a> BitwiseReadFrom<BitstreamReader<'a>> for PanScanRect {
    type Error = H264CodecError;
    fn read_from(reader: &mut BitstreamReader<'a>) -> Result<Self, Self::Error> {
        let rect_id = reader.read_ue()?;
        if rect_id > MAX_PAN_SCAN_RECT_ID {
            return Err(H264CodecError::InvalidFieldValue {
                field: "pan_scan_rect_id",
                value: u64::from(rect_id),
            });
        }
        // pan_scan_rect_cancel_flag
        if reader.read_flag()? {
            return Ok(Self::none());
        }
        let count = u64::from(reader.read_ue()?) + 1;
        if count > MAX_PAN_SCAN_RECT as u64 {
            return Err(H264CodecError::InvalidFieldValue {
                field: "pan_scan_cnt",
                value: count,
            });
        }
        let offsets = (0..count)
            .map(|_| {
                Ok::<_, H264CodecError>(PanScanOffsets {
                    left: reader.read_se()?,
                    right: reader.read_se()?,
                    top: reader.read_se()?,
                    bottom: reader.read_se()?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut repetition_period = reader.read_ue()?;
        if repetition_period > 1 {
            repetition_period = repetition_period.saturating_mul(2);
        }
        Ok(Self {
            rect_id: Some(rect_id as u8),
            offsets,
            repetition_period,
        })
    }
}
