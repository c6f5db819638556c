use codec_bitstream::reader::BitstreamReader;
use num::ToPrimitive;
use utils::traits::reader::BitwiseReadFrom;

use crate::errors::{H264CodecError, H264CodecResult};

use super::{
    AspectRatioIdc, AspectRatioInfo, AspectRatioInfoExtendedSAR, ChromaLocInfo,
    ColourDescription, TimingInfo, VideoFormat, VideoSignalType, VuiParameters,
    hrd_parameters::{HrdParameters, MAX_CPB_COUNT, SchedSel},
};

impl<'a> BitwiseReadFrom<BitstreamReader<'a>> for SchedSel {
    type Error = H264CodecError;
    fn read_from(reader: &mut BitstreamReader<'a>) -> Result<Self, Self::Error> {
        let bit_rate_value_minus1 = reader.read_ue()?;
        let cpb_size_value_minus1 = reader.read_ue()?;
        let cbr_flag = reader.read_flag()?;
        Ok(Self {
            bit_rate_value_minus1,
            cpb_size_value_minus1,
            cbr_flag,
        })
    }
}

impl<'a> BitwiseReadFrom<BitstreamReader<'a>> for HrdParameters {
    type Error = H264CodecError;
    fn read_from(reader: &mut BitstreamReader<'a>) -> Result<Self, Self::Error> {
        let cpb_cnt_minus1 = reader.read_ue()?;
        let cpb_cnt_minus1 = cpb_cnt_minus1
            .to_u8()
            .filter(|v| usize::from(*v) < MAX_CPB_COUNT)
            .ok_or(H264CodecError::InvalidFieldValue {
                field: "cpb_cnt_minus1",
                value: u64::from(cpb_cnt_minus1),
            })?;

        let bit_rate_scale = reader.read_bits(4)? as u8;
        let cpb_size_scale = reader.read_bits(4)? as u8;
        let sched_sels = (0..=cpb_cnt_minus1)
            .map(|_| SchedSel::read_from(reader))
            .collect::<H264CodecResult<Vec<_>>>()?;
        let initial_cpb_removal_delay_length_minus1 = reader.read_bits(5)? as u8;
        let cpb_removal_delay_length_minus1 = reader.read_bits(5)? as u8;
        let dpb_output_delay_length_minus1 = reader.read_bits(5)? as u8;
        let time_offset_length = reader.read_bits(5)? as u8;
        Ok(Self {
            cpb_cnt_minus1,
            bit_rate_scale,
            cpb_size_scale,
            sched_sels,
            initial_cpb_removal_delay_length_minus1,
            cpb_removal_delay_length_minus1,
            dpb_output_delay_length_minus1,
            time_offset_length,
        })
    }
}

impl<'a> BitwiseReadFrom<BitstreamReader<'a>> for AspectRatioInfo {
    type Error = H264CodecError;
    fn read_from(reader: &mut BitstreamReader<'a>) -> Result<Self, Self::Error> {
        let aspect_ratio_idc = AspectRatioIdc::from(reader.read_bits(8)? as u8);
        let aspect_ratio_info_extended_sar =
            if matches!(aspect_ratio_idc, AspectRatioIdc::ExtendedSAR) {
                let sar_width = reader.read_bits(16)? as u16;
                let sar_height = reader.read_bits(16)? as u16;
                Some(AspectRatioInfoExtendedSAR {
                    sar_width,
                    sar_height,
                })
            } else {
                None
            };
        Ok(Self {
            aspect_ratio_idc,
            aspect_ratio_info_extended_sar,
        })
    }
}

impl<'a> BitwiseReadFrom<BitstreamReader<'a>> for VideoSignalType {
    type Error = H264CodecError;
    fn read_from(reader: &mut BitstreamReader<'a>) -> Result<Self, Self::Error> {
        let video_format: VideoFormat = (reader.read_bits(3)? as u8).try_into()?;
        let video_full_range_flag = reader.read_flag()?;
        let colour_description_present_flag = reader.read_flag()?;
        let colour_description = if colour_description_present_flag {
            Some(ColourDescription {
                colour_primaries: reader.read_bits(8)? as u8,
                transfer_characteristics: reader.read_bits(8)? as u8,
                matrix_coefficients: reader.read_bits(8)? as u8,
            })
        } else {
            None
        };
        Ok(Self {
            video_format,
            video_full_range_flag,
            colour_description,
        })
    }
}

impl<'a> BitwiseReadFrom<BitstreamReader<'a>> for TimingInfo {
    type Error = H264CodecError;
    fn read_from(reader: &mut BitstreamReader<'a>) -> Result<Self, Self::Error> {
        let num_units_in_tick = reader.read_bits(32)?;
        let time_scale = reader.read_bits(32)?;
        let fixed_frame_rate_flag = reader.read_flag()?;
        Ok(Self {
            num_units_in_tick,
            time_scale,
            fixed_frame_rate_flag,
        })
    }
}

fn skip_bitstream_restriction(reader: &mut BitstreamReader) -> H264CodecResult<()> {
    // motion_vectors_over_pic_boundaries_flag
    reader.skip_bits(1)?;
    // max_bytes_per_pic_denom, max_bits_per_mb_denom,
    // log2_max_mv_length_horizontal, log2_max_mv_length_vertical,
    // max_num_reorder_frames, max_dec_frame_buffering
    for _ in 0..6 {
        reader.read_ue()?;
    }
    Ok(())
}

impl<'a> BitwiseReadFrom<BitstreamReader<'a>> for VuiParameters {
    type Error = H264CodecError;
    fn read_from(reader: &mut BitstreamReader<'a>) -> Result<Self, Self::Error> {
        let aspect_ratio_info = if reader.read_flag()? {
            Some(AspectRatioInfo::read_from(reader)?)
        } else {
            None
        };
        let overscan_appropriate_flag = if reader.read_flag()? {
            Some(reader.read_flag()?)
        } else {
            None
        };
        let video_signal_type = if reader.read_flag()? {
            Some(VideoSignalType::read_from(reader)?)
        } else {
            None
        };
        let chroma_loc_info = if reader.read_flag()? {
            Some(ChromaLocInfo {
                chroma_sample_loc_type_top_field: reader.read_ue()?,
                chroma_sample_loc_type_bottom_field: reader.read_ue()?,
            })
        } else {
            None
        };
        let timing_info = if reader.read_flag()? {
            Some(TimingInfo::read_from(reader)?)
        } else {
            None
        };
        let nal_hrd_parameters = if reader.read_flag()? {
            Some(HrdParameters::read_from(reader)?)
        } else {
            None
        };
        let vcl_hrd_parameters = if reader.read_flag()? {
            Some(HrdParameters::read_from(reader)?)
        } else {
            None
        };
        let low_delay_hrd_flag = if nal_hrd_parameters.is_some() || vcl_hrd_parameters.is_some()
        {
            Some(reader.read_flag()?)
        } else {
            None
        };
        let pic_struct_present_flag = reader.read_flag()?;
        let bitstream_restriction_flag = reader.read_flag()?;
        if bitstream_restriction_flag {
            skip_bitstream_restriction(reader)?;
        }
        let vui = Self {
            aspect_ratio_info,
            overscan_appropriate_flag,
            video_signal_type,
            chroma_loc_info,
            timing_info,
            nal_hrd_parameters,
            vcl_hrd_parameters,
            low_delay_hrd_flag,
            pic_struct_present_flag,
            bitstream_restriction_flag,
        };
        tracing::debug!("parsed vui: {:?}", vui);
        Ok(vui)
    }
}

impl VuiParameters {
    /// VUI carried out of band, e.g. in container extradata: zero bits up to
    /// and including the VUI enable flag are discarded first. Returns `None`
    /// when no enable flag is found.
    pub fn read_from_extradata(reader: &mut BitstreamReader) -> H264CodecResult<Option<Self>> {
        while reader.more_bits() {
            if reader.read_flag()? {
                return Self::read_from(reader).map(Some);
            }
        }
        Ok(None)
    }
}
