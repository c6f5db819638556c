use crate::errors::{ElementaryError, ElementaryResult};

pub const DEFAULT_PAN_SCAN_POOL_SIZE: usize = 10;
pub const DEFAULT_MAX_UNIT_SIZE: usize = 8 * 1024 * 1024;

/// Start code flavours of the elementary streams we can frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StartCodeFamily {
    /// H.264 and HEVC byte streams
    AnnexB,
    Mpeg4,
    DivX,
    H263,
    Vc1,
    Mpeg2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FramingMode {
    StartCode(StartCodeFamily),
    /// big endian unit length ahead of every unit, `length_size` is 1, 2 or 4
    LengthPrefixed { length_size: u8 },
}

/// Selects the access unit rules applied to framed units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CodecFamily {
    H264,
    Hevc,
    /// every framed unit is a picture on its own
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub framing: FramingMode,
    pub codec: CodecFamily,
    pub pan_scan_pool_size: usize,
    pub max_unit_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            framing: FramingMode::StartCode(StartCodeFamily::AnnexB),
            codec: CodecFamily::H264,
            pan_scan_pool_size: DEFAULT_PAN_SCAN_POOL_SIZE,
            max_unit_size: DEFAULT_MAX_UNIT_SIZE,
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> ElementaryResult<()> {
        match self.framing {
            FramingMode::LengthPrefixed { length_size } if ![1, 2, 4].contains(&length_size) => {
                return Err(ElementaryError::InvalidConfig(format!(
                    "length prefix must be 1, 2 or 4 bytes, got {}",
                    length_size
                )));
            }
            FramingMode::StartCode(family)
                if family != StartCodeFamily::AnnexB && self.codec != CodecFamily::Legacy =>
            {
                return Err(ElementaryError::InvalidConfig(format!(
                    "{:?} start codes can only carry legacy codecs, got {:?}",
                    family, self.codec
                )));
            }
            _ => {}
        }
        if self.pan_scan_pool_size == 0 {
            return Err(ElementaryError::InvalidConfig(
                "pan scan pool must hold at least one record".to_owned(),
            ));
        }
        if self.max_unit_size == 0 {
            return Err(ElementaryError::InvalidConfig(
                "max unit size must not be zero".to_owned(),
            ));
        }
        Ok(())
    }
}
