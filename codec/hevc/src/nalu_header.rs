use codec_bitstream::reader::BitstreamReader;

use crate::{
    errors::{HevcCodecError, HevcCodecResult},
    nalu_type::{HEVC_NALU_TYPE_U8_MASK, NALUType},
};

/// @see: Section 7.3.1.2 NAL unit header syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NaluHeader {
    // 1 bit
    pub forbidden_zero_bit: bool,
    // 6 bits
    pub nal_unit_type: NALUType,
    // 6 bits
    pub nuh_layer_id: u8,
    // 3 bits
    pub nuh_temporal_id_plus1: u8,
}

impl NaluHeader {
    pub const BYTES_COUNT: usize = 2;

    pub fn parse(payload: &[u8]) -> HevcCodecResult<Self> {
        if payload.len() < Self::BYTES_COUNT {
            return Err(HevcCodecError::TruncatedHeader {
                length: payload.len(),
                expected: Self::BYTES_COUNT,
            });
        }
        Ok(Self::from([payload[0], payload[1]]))
    }
}

impl From<[u8; 2]> for NaluHeader {
    fn from(value: [u8; 2]) -> Self {
        let forbidden_zero_bit = ((value[0] >> 7) & 0b1) == 0b1;
        if forbidden_zero_bit {
            tracing::warn!(
                "hevc nalu header with forbidden_zero_bit set: {:#06x}",
                u16::from_be_bytes(value)
            );
        }
        Self {
            forbidden_zero_bit,
            nal_unit_type: NALUType::from((value[0] >> 1) & HEVC_NALU_TYPE_U8_MASK),
            nuh_layer_id: ((value[0] & 0b1) << 5) | (value[1] >> 3),
            nuh_temporal_id_plus1: value[1] & 0b111,
        }
    }
}

/// Reads `first_slice_segment_in_pic_flag`, the first bit after the header
/// of a slice segment unit.
pub fn first_slice_segment_in_pic_flag(payload: &[u8]) -> HevcCodecResult<bool> {
    let body = payload.get(NaluHeader::BYTES_COUNT..).unwrap_or_default();
    let mut reader = BitstreamReader::new(body);
    Ok(reader.read_flag()?)
}

#[cfg(test)]
mod test {
    use codec_bitstream::errors::BitstreamError;

    use crate::{errors::HevcCodecError, nalu_type::NALUType};

    use super::{NaluHeader, first_slice_segment_in_pic_flag};

    #[test]
    fn test_parse_header() {
        // IDR_W_RADL, layer 0, tid 1
        let header = NaluHeader::parse(&[0x26, 0x01, 0xAF]).unwrap();
        assert!(!header.forbidden_zero_bit);
        assert_eq!(header.nal_unit_type, NALUType::Vcl(19));
        assert_eq!(header.nuh_layer_id, 0);
        assert_eq!(header.nuh_temporal_id_plus1, 1);

        let header = NaluHeader::parse(&[0x40, 0x01]).unwrap();
        assert_eq!(header.nal_unit_type, NALUType::VPS);

        let header = NaluHeader::from([0x01, 0xF9]);
        assert_eq!(header.nuh_layer_id, 0x3F);
        assert_eq!(header.nuh_temporal_id_plus1, 1);
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(
            NaluHeader::parse(&[0x26]),
            Err(HevcCodecError::TruncatedHeader {
                length: 1,
                expected: 2
            })
        ));
    }

    #[test]
    fn test_first_slice_segment_flag() {
        assert!(first_slice_segment_in_pic_flag(&[0x26, 0x01, 0xAF]).unwrap());
        assert!(!first_slice_segment_in_pic_flag(&[0x02, 0x01, 0x2F]).unwrap());
        assert!(matches!(
            first_slice_segment_in_pic_flag(&[0x02, 0x01]),
            Err(HevcCodecError::Bitstream(BitstreamError::Underrun { .. }))
        ));
    }
}
