use codec_bitstream::reader::BitstreamReader;
use utils::traits::reader::BitwiseReadFrom;

use crate::errors::H264CodecError;

/// frame_packing_arrangement_type of temporal interleaving, which carries no
/// grid positions
pub const FRAME_PACKING_TEMPORAL_INTERLEAVING: u8 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct FrameGridPositions {
    pub frame0_grid_position_x: u8, // u(4)
    pub frame0_grid_position_y: u8, // u(4)
    pub frame1_grid_position_x: u8, // u(4)
    pub frame1_grid_position_y: u8, // u(4)
}

/// @see: Section D.1.26 Frame packing arrangement SEI message syntax
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FramePackingArrangement {
    pub frame_packing_arrangement_id: u32, // ue(v)
    pub frame_packing_arrangement_cancel_flag: bool, // u(1)
    /// if !frame_packing_arrangement_cancel_flag {
    pub frame_packing_arrangement_type: u8, // u(7)
    pub quincunx_sampling_flag: bool,      // u(1)
    pub content_interpretation_type: u8,   // u(6)
    pub spatial_flipping_flag: bool,       // u(1)
    pub frame0_flipped_flag: bool,         // u(1)
    pub field_views_flag: bool,            // u(1)
    pub current_frame_is_frame0_flag: bool, // u(1)
    pub frame0_self_contained_flag: bool,  // u(1)
    pub frame1_self_contained_flag: bool,  // u(1)
    /// if !quincunx_sampling_flag && frame_packing_arrangement_type != 5 {
    pub grid_positions: Option<FrameGridPositions>,
    /// }
    pub frame_packing_arrangement_reserved_byte: u8, // u(8)
    pub frame_packing_arrangement_repetition_period: u32, // ue(v)
    /// }
    pub frame_packing_arrangement_extension_flag: bool, // u(1)
}

impl Default for FramePackingArrangement {
    fn default() -> Self {
        Self {
            frame_packing_arrangement_id: 0,
            frame_packing_arrangement_cancel_flag: true,
            frame_packing_arrangement_type: 0,
            quincunx_sampling_flag: false,
            content_interpretation_type: 0,
            spatial_flipping_flag: false,
            frame0_flipped_flag: false,
            field_views_flag: false,
            current_frame_is_frame0_flag: false,
            frame0_self_contained_flag: false,
            frame1_self_contained_flag: false,
            grid_positions: None,
            frame_packing_arrangement_reserved_byte: 0,
            frame_packing_arrangement_repetition_period: 0,
            frame_packing_arrangement_extension_flag: false,
        }
    }
}

impl<'a> BitwiseReadFrom<BitstreamReader<'a>> for FramePackingArrangement {
    type Error = H264CodecError;
    fn read_from(reader: &mut BitstreamReader<'a>) -> Result<Self, Self::Error> {
        let mut result = Self {
            frame_packing_arrangement_id: reader.read_ue()?,
            frame_packing_arrangement_cancel_flag: reader.read_flag()?,
            ..Default::default()
        };
        if !result.frame_packing_arrangement_cancel_flag {
            result.frame_packing_arrangement_type = reader.read_bits(7)? as u8;
            result.quincunx_sampling_flag = reader.read_flag()?;
            result.content_interpretation_type = reader.read_bits(6)? as u8;
            result.spatial_flipping_flag = reader.read_flag()?;
            result.frame0_flipped_flag = reader.read_flag()?;
            result.field_views_flag = reader.read_flag()?;
            result.current_frame_is_frame0_flag = reader.read_flag()?;
            result.frame0_self_contained_flag = reader.read_flag()?;
            result.frame1_self_contained_flag = reader.read_flag()?;
            if !result.quincunx_sampling_flag
                && result.frame_packing_arrangement_type != FRAME_PACKING_TEMPORAL_INTERLEAVING
            {
                result.grid_positions = Some(FrameGridPositions {
                    frame0_grid_position_x: reader.read_bits(4)? as u8,
                    frame0_grid_position_y: reader.read_bits(4)? as u8,
                    frame1_grid_position_x: reader.read_bits(4)? as u8,
                    frame1_grid_position_y: reader.read_bits(4)? as u8,
                });
            }
            result.frame_packing_arrangement_reserved_byte = reader.read_bits(8)? as u8;
            result.frame_packing_arrangement_repetition_period = reader.read_ue()?;
        }
        result.frame_packing_arrangement_extension_flag = reader.read_flag()?;
        Ok(result)
    }
}
