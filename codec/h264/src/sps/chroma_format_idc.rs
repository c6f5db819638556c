use crate::errors::H264CodecError;

/// @see: Table 6-1 – SubWidthC, and SubHeightC values derived from
/// chroma_format_idc and separate_colour_plane_flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromaFormatIdc {
    Monochrome,
    #[default]
    Chroma420,
    Chroma422,
    Chroma444,
}

impl ChromaFormatIdc {
    /// (SubWidthC, SubHeightC), `None` when there is no chroma array.
    pub fn subsampling(&self) -> Option<(u32, u32)> {
        match self {
            Self::Monochrome => None,
            Self::Chroma420 => Some((2, 2)),
            Self::Chroma422 => Some((2, 1)),
            Self::Chroma444 => Some((1, 1)),
        }
    }
}

impl TryFrom<u32> for ChromaFormatIdc {
    type Error = H264CodecError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Monochrome),
            1 => Ok(Self::Chroma420),
            2 => Ok(Self::Chroma422),
            3 => Ok(Self::Chroma444),
            _ => Err(H264CodecError::InvalidFieldValue {
                field: "chroma_format_idc",
                value: u64::from(value),
            }),
        }
    }
}
