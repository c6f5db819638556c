use hrd_parameters::HrdParameters;

use crate::errors::H264CodecError;

pub mod hrd_parameters;
pub mod reader;
#[cfg(test)]
mod test_vui;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct AspectRatioInfoExtendedSAR {
    pub sar_width: u16,  // u(16)
    pub sar_height: u16, // u(16)
}

/// @see: Table E-1 – Meaning of sample aspect ratio indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatioIdc {
    Unspecified,
    /// indices 1..=16 of Table E-1
    Predefined(u8),
    Reserved(u8),
    ExtendedSAR,
}

/// sample aspect ratios of Table E-1, indexed by aspect_ratio_idc - 1
const PREDEFINED_SAR: [(u16, u16); 16] = [
    (1, 1),
    (12, 11),
    (10, 11),
    (16, 11),
    (40, 33),
    (24, 11),
    (20, 11),
    (32, 11),
    (80, 33),
    (18, 11),
    (15, 11),
    (64, 33),
    (160, 99),
    (4, 3),
    (3, 2),
    (2, 1),
];

impl From<u8> for AspectRatioIdc {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Unspecified,
            1..=16 => Self::Predefined(value),
            255 => Self::ExtendedSAR,
            reserved => Self::Reserved(reserved),
        }
    }
}

impl From<AspectRatioIdc> for u8 {
    fn from(value: AspectRatioIdc) -> Self {
        match value {
            AspectRatioIdc::Unspecified => 0,
            AspectRatioIdc::Predefined(v) | AspectRatioIdc::Reserved(v) => v,
            AspectRatioIdc::ExtendedSAR => 255,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatioInfo {
    pub aspect_ratio_idc: AspectRatioIdc, // u(8), see: Table E-1 – Meaning of sample aspect ratio indicator
    /// if aspect_ratio_idc == Extended_SAR {
    pub aspect_ratio_info_extended_sar: Option<AspectRatioInfoExtendedSAR>, // }
}

impl AspectRatioInfo {
    /// Resolved sample aspect ratio, `None` for unspecified or reserved indices.
    pub fn sample_aspect_ratio(&self) -> Option<AspectRatioInfoExtendedSAR> {
        match self.aspect_ratio_idc {
            AspectRatioIdc::Predefined(idc) => {
                let (sar_width, sar_height) = PREDEFINED_SAR[usize::from(idc - 1)];
                Some(AspectRatioInfoExtendedSAR {
                    sar_width,
                    sar_height,
                })
            }
            AspectRatioIdc::ExtendedSAR => self.aspect_ratio_info_extended_sar,
            AspectRatioIdc::Unspecified | AspectRatioIdc::Reserved(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColourDescription {
    pub colour_primaries: u8, // u(8), see: Table E-3 – Colour primaries interpretation using colour_primaries syntax element
    pub transfer_characteristics: u8, // u(8), see: Table E-4 – Transfer characteristics interpretation using transfer_characteristics syntax element
    pub matrix_coefficients: u8, // u(8), see: Table E-5 – Matrix coefficients interpretation using the matrix_coefficients syntax element
}

/// @see: Table E-2 – Meaning of video_format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    Component,
    PAL,
    NTSC,
    SECAM,
    MAC,
    Unspecified,
    Reserved(u8),
}

impl TryFrom<u8> for VideoFormat {
    type Error = H264CodecError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VideoFormat::Component),
            1 => Ok(VideoFormat::PAL),
            2 => Ok(VideoFormat::NTSC),
            3 => Ok(VideoFormat::SECAM),
            4 => Ok(VideoFormat::MAC),
            5 => Ok(VideoFormat::Unspecified),
            6 | 7 => Ok(VideoFormat::Reserved(value)),
            _ => Err(H264CodecError::UnknownVideoFormat(value)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VideoSignalType {
    pub video_format: VideoFormat, // u(3), see: Table E-2 – Meaning of video_format
    pub video_full_range_flag: bool, // u(1)
    /// if colour_description_present_flag {
    pub colour_description: Option<ColourDescription>,
    // }
}

#[derive(Debug, Clone, Copy)]
pub struct ChromaLocInfo {
    pub chroma_sample_loc_type_top_field: u32, // ue(v), in [0, 5]
    pub chroma_sample_loc_type_bottom_field: u32, // ue(v), in [0, 5]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingInfo {
    pub num_units_in_tick: u32,      // u(32), in (0, )
    pub time_scale: u32,             // u(32), in (0, )
    pub fixed_frame_rate_flag: bool, // u(1)
}

impl TimingInfo {
    /// Frames per second, one frame being two field ticks.
    pub fn frame_rate(&self) -> Option<f64> {
        if self.num_units_in_tick == 0 || self.time_scale == 0 {
            return None;
        }
        Some(f64::from(self.time_scale) / (2.0 * f64::from(self.num_units_in_tick)))
    }
}

/// @see: Recommendation  ITU-T H.264 (V15) (08/2024)   – Coding of moving video
/// Section E.1.1 VUI parameters syntax
///
/// bitstream_restriction fields are consumed but not kept.
#[derive(Debug, Clone, Default)]
pub struct VuiParameters {
    /// if aspect_ratio_info_present_flag {
    pub aspect_ratio_info: Option<AspectRatioInfo>,
    /// }
    /// if overscan_info_present_flag {
    pub overscan_appropriate_flag: Option<bool>, // u(1)
    /// }
    // if video_signal_type_present_flag {
    pub video_signal_type: Option<VideoSignalType>,
    // }
    /// if chroma_loc_info_present_flag {
    pub chroma_loc_info: Option<ChromaLocInfo>,
    /// }
    /// if timing_info_present_flag {
    pub timing_info: Option<TimingInfo>,
    /// }
    /// if nal_hrd_parameters_present_flag {
    pub nal_hrd_parameters: Option<HrdParameters>,
    /// }
    /// if vcl_hrd_parameters_present_flag {
    pub vcl_hrd_parameters: Option<HrdParameters>,
    /// }
    /// if nal_hrd_parameters_present_flag || vcl_hrd_parameters_present_flag {
    pub low_delay_hrd_flag: Option<bool>, // u(1)
    /// }
    pub pic_struct_present_flag: bool,    // u(1)
    pub bitstream_restriction_flag: bool, // u(1)
}

impl VuiParameters {
    /// NAL HRD parameters take precedence over VCL ones wherever an SEI field
    /// width depends on the HRD.
    pub fn preferred_hrd(&self) -> Option<&HrdParameters> {
        self.nal_hrd_parameters
            .as_ref()
            .or(self.vcl_hrd_parameters.as_ref())
    }

    pub fn frame_rate(&self) -> Option<f64> {
        self.timing_info.as_ref().and_then(TimingInfo::frame_rate)
    }
}
