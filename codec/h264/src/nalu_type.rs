use crate::errors::H264CodecError;

pub const H264_NALU_TYPE_U8_MASK: u8 = 0b11111;

/// @see: Recommendation  ITU-T H.264 (V15) (08/2024)   – Coding of moving video
/// Table 7-1 – NAL unit type codes, syntax element categories, and NAL unit type classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NALUType {
    NonIDRSlice,
    DataPartitionASlice,
    DataPartitionBSlice,
    DataPartitionCSlice,
    IDRSlice,
    SEI,
    SPS,
    PPS,
    AccessUnitDelimiter,
    EndOfSequence,
    EndOfStream,
    FillerData,
    SPSExtension,
    PrefixNALU,
    SubsetSPS,
    DPS,
    SliceWithoutPartitioning,
    SliceExtension,
    SliceExtensionForDepthViewOr3DAVCTextureView,
    Unspecified(u8),
    Reserved(u8),
}

const NALU_TYPE_TABLE: [(u8, NALUType); 19] = [
    (1, NALUType::NonIDRSlice),
    (2, NALUType::DataPartitionASlice),
    (3, NALUType::DataPartitionBSlice),
    (4, NALUType::DataPartitionCSlice),
    (5, NALUType::IDRSlice),
    (6, NALUType::SEI),
    (7, NALUType::SPS),
    (8, NALUType::PPS),
    (9, NALUType::AccessUnitDelimiter),
    (10, NALUType::EndOfSequence),
    (11, NALUType::EndOfStream),
    (12, NALUType::FillerData),
    (13, NALUType::SPSExtension),
    (14, NALUType::PrefixNALU),
    (15, NALUType::SubsetSPS),
    (16, NALUType::DPS),
    (19, NALUType::SliceWithoutPartitioning),
    (20, NALUType::SliceExtension),
    (21, NALUType::SliceExtensionForDepthViewOr3DAVCTextureView),
];

impl NALUType {
    /// Coded slices that open or continue a primary coded picture and carry
    /// `first_mb_in_slice` right after the header.
    pub fn is_picture_slice(&self) -> bool {
        matches!(self, Self::NonIDRSlice | Self::IDRSlice)
    }

    pub fn is_idr(&self) -> bool {
        matches!(self, Self::IDRSlice)
    }

    /// Units that may only precede the slices of the access unit they belong to.
    pub fn is_parameter_set_or_sei(&self) -> bool {
        matches!(self, Self::SPS | Self::PPS | Self::SEI)
    }
}

impl From<NALUType> for u8 {
    fn from(value: NALUType) -> Self {
        match value {
            NALUType::Unspecified(v) | NALUType::Reserved(v) => v,
            known => NALU_TYPE_TABLE
                .iter()
                .find(|(_, t)| *t == known)
                .map_or(0, |(v, _)| *v),
        }
    }
}

impl TryFrom<u8> for NALUType {
    type Error = H264CodecError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let value = value & H264_NALU_TYPE_U8_MASK;
        if let Some((_, t)) = NALU_TYPE_TABLE.iter().find(|(v, _)| *v == value) {
            return Ok(*t);
        }
        match value {
            0 | 24..=31 => Ok(Self::Unspecified(value)),
            17 | 18 | 22 | 23 => Ok(Self::Reserved(value)),
            v => Err(H264CodecError::UnknownNaluType(v)),
        }
    }
}
