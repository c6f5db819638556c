use chroma_format_idc::ChromaFormatIdc;

use crate::vui::VuiParameters;

pub mod chroma_format_idc;
pub mod reader;

/// profile_idc values whose SPS carries chroma format, bit depth and
/// scaling matrices
pub const HIGH_PROFILE_IDCS: [u8; 13] = [100, 110, 122, 244, 44, 83, 86, 118, 128, 138, 139, 134, 135];

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCropping {
    pub frame_crop_left_offset: u32,   // ue(v)
    pub frame_crop_right_offset: u32,  // ue(v)
    pub frame_crop_top_offset: u32,    // ue(v)
    pub frame_crop_bottom_offset: u32, // ue(v)
}

/// @see: Section 7.3.2.1.1 Sequence parameter set data syntax
///
/// Only the fields needed to reach the VUI and to describe the picture are
/// kept; scaling lists and picture order count details are consumed.
#[derive(Debug, Clone, Default)]
pub struct Sps {
    pub profile_idc: u8,          // u(8)
    pub constraint_set_flags: u8, // u(6), constraint_set0_flag in the msb
    pub level_idc: u8,            // u(8)
    pub seq_parameter_set_id: u32, // ue(v), in [0, 31]
    /// if profile_idc in HIGH_PROFILE_IDCS {
    pub chroma_format_idc: ChromaFormatIdc, // ue(v)
    pub separate_colour_plane_flag: bool, // u(1), only if chroma_format_idc == 3
    pub bit_depth_luma_minus8: u32,       // ue(v)
    pub bit_depth_chroma_minus8: u32,     // ue(v)
    /// }
    pub log2_max_frame_num_minus4: u32, // ue(v)
    pub pic_order_cnt_type: u32,        // ue(v)
    pub max_num_ref_frames: u32,        // ue(v)
    pub gaps_in_frame_num_value_allowed_flag: bool, // u(1)
    pub pic_width_in_mbs_minus1: u32,   // ue(v)
    pub pic_height_in_map_units_minus1: u32, // ue(v)
    pub frame_mbs_only_flag: bool,      // u(1)
    /// if !frame_mbs_only_flag {
    pub mb_adaptive_frame_field_flag: Option<bool>, // u(1)
    /// }
    pub direct_8x8_inference_flag: bool, // u(1)
    /// if frame_cropping_flag {
    pub frame_cropping: Option<FrameCropping>,
    /// }
    /// if vui_parameters_present_flag
    pub vui_parameters: Option<VuiParameters>,
}

impl Sps {
    pub fn is_mbaff(&self) -> bool {
        self.mb_adaptive_frame_field_flag.unwrap_or(false)
    }

    /// (CropUnitX, CropUnitY), equations 7-19 to 7-22
    fn crop_units(&self) -> (u64, u64) {
        let field_factor = if self.frame_mbs_only_flag { 1 } else { 2 };
        match self.chroma_format_idc.subsampling() {
            Some((sub_width, sub_height)) if !self.separate_colour_plane_flag => (
                u64::from(sub_width),
                u64::from(sub_height) * field_factor,
            ),
            _ => (1, field_factor),
        }
    }

    pub fn get_video_width(&self) -> u64 {
        let (crop_unit_x, _) = self.crop_units();
        let full = (u64::from(self.pic_width_in_mbs_minus1) + 1) * 16;
        let crop = self.frame_cropping.map_or(0, |v| {
            (u64::from(v.frame_crop_left_offset) + u64::from(v.frame_crop_right_offset))
                * crop_unit_x
        });
        full.saturating_sub(crop)
    }

    pub fn get_video_height(&self) -> u64 {
        let (_, crop_unit_y) = self.crop_units();
        let field_factor = if self.frame_mbs_only_flag { 1 } else { 2 };
        let full = (u64::from(self.pic_height_in_map_units_minus1) + 1) * 16 * field_factor;
        let crop = self.frame_cropping.map_or(0, |v| {
            (u64::from(v.frame_crop_top_offset) + u64::from(v.frame_crop_bottom_offset))
                * crop_unit_y
        });
        full.saturating_sub(crop)
    }
}
