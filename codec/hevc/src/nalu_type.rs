pub const HEVC_NALU_TYPE_U8_MASK: u8 = 0b11_1111;

/// @see: Recommendation ITU-T H.265 (V10) (07/2024) – High efficiency video coding
/// Table 7-1 – NAL unit type codes and NAL unit type classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NALUType {
    /// TRAIL_N ..= RSV_IRAP_VCL23, the value is kept for IRAP checks
    Vcl(u8),
    ReservedVcl(u8),
    VPS,
    SPS,
    PPS,
    AccessUnitDelimiter,
    EndOfSequence,
    EndOfBitstream,
    FillerData,
    PrefixSEI,
    SuffixSEI,
    ReservedNonVcl(u8),
    Unspecified(u8),
}

impl NALUType {
    /// Coded slice segments, the units that carry
    /// `first_slice_segment_in_pic_flag` right after the header.
    pub fn is_slice(&self) -> bool {
        matches!(self, Self::Vcl(_))
    }

    /// BLA, IDR and CRA pictures
    pub fn is_irap(&self) -> bool {
        matches!(self, Self::Vcl(16..=21))
    }

    /// Units that may only precede the slices of the access unit they belong to.
    pub fn is_parameter_set_or_sei(&self) -> bool {
        matches!(self, Self::VPS | Self::SPS | Self::PPS | Self::PrefixSEI)
    }
}

impl From<u8> for NALUType {
    fn from(value: u8) -> Self {
        match value & HEVC_NALU_TYPE_U8_MASK {
            v @ 0..=21 => Self::Vcl(v),
            v @ 22..=31 => Self::ReservedVcl(v),
            32 => Self::VPS,
            33 => Self::SPS,
            34 => Self::PPS,
            35 => Self::AccessUnitDelimiter,
            36 => Self::EndOfSequence,
            37 => Self::EndOfBitstream,
            38 => Self::FillerData,
            39 => Self::PrefixSEI,
            40 => Self::SuffixSEI,
            v @ 41..=47 => Self::ReservedNonVcl(v),
            v => Self::Unspecified(v),
        }
    }
}

impl From<NALUType> for u8 {
    fn from(value: NALUType) -> Self {
        match value {
            NALUType::Vcl(v)
            | NALUType::ReservedVcl(v)
            | NALUType::ReservedNonVcl(v)
            | NALUType::Unspecified(v) => v,
            NALUType::VPS => 32,
            NALUType::SPS => 33,
            NALUType::PPS => 34,
            NALUType::AccessUnitDelimiter => 35,
            NALUType::EndOfSequence => 36,
            NALUType::EndOfBitstream => 37,
            NALUType::FillerData => 38,
            NALUType::PrefixSEI => 39,
            NALUType::SuffixSEI => 40,
        }
    }
}

#[cfg(test)]
mod test {
    use super::NALUType;

    #[test]
    fn test_nalu_type_mapping() {
        for value in 0..64_u8 {
            assert_eq!(u8::from(NALUType::from(value)), value);
        }
        assert!(NALUType::from(19).is_irap());
        assert!(NALUType::from(1).is_slice());
        assert!(!NALUType::from(1).is_irap());
        assert!(!NALUType::from(22).is_slice());
        assert!(NALUType::from(32).is_parameter_set_or_sei());
        assert!(NALUType::from(39).is_parameter_set_or_sei());
        assert!(!NALUType::from(40).is_parameter_set_or_sei());
        assert!(!NALUType::from(35).is_parameter_set_or_sei());
    }
}
