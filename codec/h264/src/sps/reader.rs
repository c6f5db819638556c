use codec_bitstream::reader::BitstreamReader;
use utils::traits::reader::BitwiseReadFrom;

use crate::{
    errors::{H264CodecError, H264CodecResult},
    vui::VuiParameters,
};

use super::{FrameCropping, HIGH_PROFILE_IDCS, Sps, chroma_format_idc::ChromaFormatIdc};

/// Consumes one scaling_list( ) of `size` entries, 7.3.2.1.1.1
fn skip_scaling_list(reader: &mut BitstreamReader, size: usize) -> H264CodecResult<()> {
    let mut last_scale: i64 = 8;
    let mut next_scale: i64 = 8;
    for _ in 0..size {
        if next_scale != 0 {
            let delta_scale = i64::from(reader.read_se()?);
            next_scale = (last_scale + delta_scale + 256).rem_euclid(256);
        }
        if next_scale != 0 {
            last_scale = next_scale;
        }
    }
    Ok(())
}

impl<'a> BitwiseReadFrom<BitstreamReader<'a>> for FrameCropping {
    type Error = H264CodecError;
    fn read_from(reader: &mut BitstreamReader<'a>) -> Result<Self, Self::Error> {
        Ok(Self {
            frame_crop_left_offset: reader.read_ue()?,
            frame_crop_right_offset: reader.read_ue()?,
            frame_crop_top_offset: reader.read_ue()?,
            frame_crop_bottom_offset: reader.read_ue()?,
        })
    }
}

impl<'a> BitwiseReadFrom<BitstreamReader<'a>> for Sps {
    type Error = H264CodecError;
    fn read_from(reader: &mut BitstreamReader<'a>) -> Result<Self, Self::Error> {
        let mut sps = Sps {
            profile_idc: reader.read_bits(8)? as u8,
            ..Default::default()
        };
        let constraint_set_flags = reader.read_bits(8)? as u8;
        let reserved_zero_2bits = constraint_set_flags & 0b11;
        if reserved_zero_2bits != 0 {
            return Err(H264CodecError::SyntaxError(format!(
                "reserved_zero_2bits in sps should be 0: {}",
                reserved_zero_2bits
            )));
        }
        sps.constraint_set_flags = constraint_set_flags >> 2;
        sps.level_idc = reader.read_bits(8)? as u8;
        sps.seq_parameter_set_id = reader.read_ue()?;
        if sps.seq_parameter_set_id > 31 {
            return Err(H264CodecError::InvalidFieldValue {
                field: "seq_parameter_set_id",
                value: u64::from(sps.seq_parameter_set_id),
            });
        }

        if HIGH_PROFILE_IDCS.contains(&sps.profile_idc) {
            sps.chroma_format_idc = ChromaFormatIdc::try_from(reader.read_ue()?)?;
            if sps.chroma_format_idc == ChromaFormatIdc::Chroma444 {
                sps.separate_colour_plane_flag = reader.read_flag()?;
            }
            sps.bit_depth_luma_minus8 = reader.read_ue()?;
            sps.bit_depth_chroma_minus8 = reader.read_ue()?;
            // qpprime_y_zero_transform_bypass_flag
            reader.skip_bits(1)?;
            let seq_scaling_matrix_present_flag = reader.read_flag()?;
            if seq_scaling_matrix_present_flag {
                let count = if sps.chroma_format_idc == ChromaFormatIdc::Chroma444 {
                    12
                } else {
                    8
                };
                for i in 0..count {
                    if reader.read_flag()? {
                        skip_scaling_list(reader, if i < 6 { 16 } else { 64 })?;
                    }
                }
            }
        }

        sps.log2_max_frame_num_minus4 = reader.read_ue()?;
        sps.pic_order_cnt_type = reader.read_ue()?;
        match sps.pic_order_cnt_type {
            0 => {
                // log2_max_pic_order_cnt_lsb_minus4
                reader.read_ue()?;
            }
            1 => {
                // delta_pic_order_always_zero_flag
                reader.skip_bits(1)?;
                // offset_for_non_ref_pic, offset_for_top_to_bottom_field
                reader.read_se()?;
                reader.read_se()?;
                let num_ref_frames_in_pic_order_cnt_cycle = reader.read_ue()?;
                if num_ref_frames_in_pic_order_cnt_cycle > 255 {
                    return Err(H264CodecError::InvalidFieldValue {
                        field: "num_ref_frames_in_pic_order_cnt_cycle",
                        value: u64::from(num_ref_frames_in_pic_order_cnt_cycle),
                    });
                }
                for _ in 0..num_ref_frames_in_pic_order_cnt_cycle {
                    reader.read_se()?;
                }
            }
            _ => {}
        }
        sps.max_num_ref_frames = reader.read_ue()?;
        sps.gaps_in_frame_num_value_allowed_flag = reader.read_flag()?;
        sps.pic_width_in_mbs_minus1 = reader.read_ue()?;
        sps.pic_height_in_map_units_minus1 = reader.read_ue()?;
        sps.frame_mbs_only_flag = reader.read_flag()?;
        if !sps.frame_mbs_only_flag {
            sps.mb_adaptive_frame_field_flag = Some(reader.read_flag()?);
        }
        sps.direct_8x8_inference_flag = reader.read_flag()?;
        if reader.read_flag()? {
            sps.frame_cropping = Some(FrameCropping::read_from(reader)?);
        }
        if reader.read_flag()? {
            // a broken VUI costs only the VUI
            sps.vui_parameters = VuiParameters::read_from(reader)
                .inspect_err(|err| tracing::warn!("vui dropped, sps kept: {}", err))
                .ok();
        }
        tracing::debug!(
            "parsed sps: profile {}, level {}, {}x{}, mbaff {}",
            sps.profile_idc,
            sps.level_idc,
            sps.get_video_width(),
            sps.get_video_height(),
            sps.is_mbaff()
        );
        Ok(sps)
    }
}
