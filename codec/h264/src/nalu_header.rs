use crate::{
    errors::H264CodecError,
    nalu_type::{H264_NALU_TYPE_U8_MASK, NALUType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NaluHeader {
    // 1 bit
    pub forbidden_zero_bit: bool,
    // 2 bits
    pub nal_ref_idc: u8,
    // 5 bits
    pub nal_unit_type: NALUType,
}

impl NaluHeader {
    pub const BYTES_COUNT: usize = 1;

    pub fn is_reference(&self) -> bool {
        self.nal_ref_idc != 0
    }
}

impl TryFrom<u8> for NaluHeader {
    type Error = H264CodecError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let forbidden_zero_bit = ((value >> 7) & 0b1) == 0b1;
        if forbidden_zero_bit {
            tracing::warn!("h264 nalu header with forbidden_zero_bit set: {:#04x}", value);
        }
        let nal_ref_idc = (value >> 5) & 0b11;
        let nal_unit_type: NALUType = (value & H264_NALU_TYPE_U8_MASK).try_into()?;
        Ok(Self {
            forbidden_zero_bit,
            nal_ref_idc,
            nal_unit_type,
        })
    }
}

#[cfg(test)]
mod test {
    use crate::nalu_type::NALUType;

    use super::NaluHeader;

    #[test]
    fn test_parse_header() {
        let header = NaluHeader::try_from(0x65).unwrap();
        assert!(!header.forbidden_zero_bit);
        assert_eq!(header.nal_ref_idc, 3);
        assert_eq!(header.nal_unit_type, NALUType::IDRSlice);

        let header = NaluHeader::try_from(0x01).unwrap();
        assert!(!header.is_reference());
        assert_eq!(header.nal_unit_type, NALUType::NonIDRSlice);
    }
}
