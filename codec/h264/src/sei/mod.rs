use buffering_period::SeiBufferingPeriod;
use codec_bitstream::reader::BitstreamReader;
use frame_packing::FramePackingArrangement;
use pan_scan::PanScanRect;
use pic_timing::SeiPicTiming;
use utils::traits::reader::{BitwiseReadFrom, BitwiseReadWithContext};

use crate::{errors::H264CodecResult, vui::VuiParameters};

pub mod buffering_period;
pub mod frame_packing;
pub mod pan_scan;
pub mod pic_timing;

/// @see: Annex D.1.1 General SEI message syntax, payloadType values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeiPayloadType {
    BufferingPeriod,
    PicTiming,
    PanScanRect,
    FramePackingArrangement,
    Other(u32),
}

impl From<u32> for SeiPayloadType {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::BufferingPeriod,
            1 => Self::PicTiming,
            2 => Self::PanScanRect,
            45 => Self::FramePackingArrangement,
            v => Self::Other(v),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SeiMessage<'a> {
    pub payload_type: SeiPayloadType,
    pub payload_size: usize,
    /// may be shorter than `payload_size` when the unit is cut short
    pub payload: &'a [u8],
}

#[derive(Debug, Clone)]
pub enum SeiPayload {
    BufferingPeriod(SeiBufferingPeriod),
    PicTiming(SeiPicTiming),
    PanScanRect(PanScanRect),
    FramePackingArrangement(FramePackingArrangement),
}

/// ff_byte extended value used for payloadType and payloadSize
fn read_extended_byte_value(reader: &mut BitstreamReader) -> H264CodecResult<usize> {
    let mut value = 0_usize;
    loop {
        // lenient: a torn header byte reads short and the message is clamped
        // to what is left of the unit
        let byte = reader.read_bits_lenient(8)?;
        value += byte as usize;
        if byte != 0xFF {
            return Ok(value);
        }
    }
}

/// Splits an SEI RBSP (NAL header already stripped) into its messages.
pub fn split_sei_messages(rbsp: &[u8]) -> H264CodecResult<Vec<SeiMessage<'_>>> {
    let mut messages = Vec::new();
    let mut offset = 0;
    loop {
        let mut reader = BitstreamReader::new(&rbsp[offset..]);
        // a message needs at least its type byte, its size byte and a payload byte
        if !reader.more_rbsp_data() || reader.remaining_bits() <= 16 {
            break;
        }
        let payload_type = SeiPayloadType::from(read_extended_byte_value(&mut reader)? as u32);
        let payload_size = read_extended_byte_value(&mut reader)?;
        let start = (offset + reader.position_in_bits().div_ceil(8)).min(rbsp.len());
        let end = start.saturating_add(payload_size).min(rbsp.len());
        if end - start < payload_size {
            tracing::warn!(
                "sei payload {:?} truncated: {} of {} bytes present",
                payload_type,
                end - start,
                payload_size
            );
        }
        messages.push(SeiMessage {
            payload_type,
            payload_size,
            payload: &rbsp[start..end],
        });
        offset = end;
    }
    Ok(messages)
}

impl SeiMessage<'_> {
    /// Parses the payload if its type is one we understand. Field widths of
    /// timing payloads come from `vui`.
    pub fn parse(&self, vui: Option<&VuiParameters>) -> H264CodecResult<Option<SeiPayload>> {
        if self.payload_size == 0 {
            return Ok(None);
        }
        let mut reader = BitstreamReader::new(self.payload);
        let payload = match self.payload_type {
            SeiPayloadType::BufferingPeriod => SeiPayload::BufferingPeriod(
                SeiBufferingPeriod::read_with_context(vui, &mut reader)?,
            ),
            SeiPayloadType::PicTiming => {
                SeiPayload::PicTiming(SeiPicTiming::read_with_context(vui, &mut reader)?)
            }
            SeiPayloadType::PanScanRect => {
                SeiPayload::PanScanRect(PanScanRect::read_from(&mut reader)?)
            }
            SeiPayloadType::FramePackingArrangement => SeiPayload::FramePackingArrangement(
                FramePackingArrangement::read_from(&mut reader)?,
            ),
            SeiPayloadType::Other(payload_type) => {
                tracing::trace!(
                    "sei payload type {} not handled, size {}",
                    payload_type,
                    self.payload_size
                );
                return Ok(None);
            }
        };
        tracing::debug!("parsed sei payload: {:?}", payload);
        Ok(Some(payload))
    }
}
