use codec_bitstream::reader::BitstreamReader;
use utils::traits::reader::BitwiseReadWithContext;

use crate::{errors::H264CodecError, vui::VuiParameters};

/// delay widths used when the sequence carries no HRD parameters
pub const DEFAULT_DELAY_LENGTH: u32 = 24;

/// @see: Table D-1 Interpretation of pic_struct
pub fn num_clock_ts(pic_struct: u8) -> Option<usize> {
    match pic_struct {
        0..=2 => Some(1),
        3 | 4 | 7 => Some(2),
        5 | 6 | 8 => Some(3),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockTimestamp {
    pub ct_type: u8,                 // u(2)
    pub nuit_field_based_flag: bool, // u(1)
    pub counting_type: u8,           // u(5)
    pub full_timestamp_flag: bool,   // u(1)
    pub discontinuity_flag: bool,    // u(1)
    pub cnt_dropped_flag: bool,      // u(1)
    pub n_frames: u8,                // u(8)
    /// absent fields of a partial timestamp are zero
    pub seconds_value: u8, // u(6), in [0, 59]
    pub minutes_value: u8, // u(6), in [0, 59]
    pub hours_value: u8, // u(5), in [0, 23]
    pub time_offset: i32, // i(v)
}

/// @see: Section D.1.3 Picture timing SEI message syntax
#[derive(Debug, Clone, Default)]
pub struct SeiPicTiming {
    pub cpb_removal_delay: u32, // u(v)
    pub dpb_output_delay: u32,  // u(v)
    /// if pic_struct_present_flag {
    pub pic_struct: Option<u8>, // u(4)
    /// for( i = 0; i < NumClockTS; i++ ), `None` when clock_timestamp_flag is 0
    pub clock_timestamps: Vec<Option<ClockTimestamp>>,
}

impl SeiPicTiming {
    pub fn last_clock_timestamp(&self) -> Option<&ClockTimestamp> {
        self.clock_timestamps.last().and_then(Option::as_ref)
    }
}

fn read_clock_timestamp(
    time_offset_length: u32,
    reader: &mut BitstreamReader,
) -> Result<ClockTimestamp, H264CodecError> {
    let mut timestamp = ClockTimestamp {
        ct_type: reader.read_bits(2)? as u8,
        nuit_field_based_flag: reader.read_flag()?,
        counting_type: reader.read_bits(5)? as u8,
        full_timestamp_flag: reader.read_flag()?,
        discontinuity_flag: reader.read_flag()?,
        cnt_dropped_flag: reader.read_flag()?,
        n_frames: reader.read_bits(8)? as u8,
        ..Default::default()
    };
    if timestamp.full_timestamp_flag {
        timestamp.seconds_value = reader.read_bits(6)? as u8;
        timestamp.minutes_value = reader.read_bits(6)? as u8;
        timestamp.hours_value = reader.read_bits(5)? as u8;
    } else if reader.read_flag()? {
        // seconds_flag
        timestamp.seconds_value = reader.read_bits(6)? as u8;
        // minutes_flag
        if reader.read_flag()? {
            timestamp.minutes_value = reader.read_bits(6)? as u8;
            // hours_flag
            if reader.read_flag()? {
                timestamp.hours_value = reader.read_bits(5)? as u8;
            }
        }
    }
    if time_offset_length > 0 {
        timestamp.time_offset = reader.read_signed_bits(time_offset_length)?;
    }
    Ok(timestamp)
}

impl<'a> BitwiseReadWithContext<Option<&VuiParameters>, BitstreamReader<'a>> for SeiPicTiming {
    type Error = H264CodecError;
    fn read_with_context(
        vui: Option<&VuiParameters>,
        reader: &mut BitstreamReader<'a>,
    ) -> Result<Self, Self::Error> {
        let hrd = vui.and_then(VuiParameters::preferred_hrd);
        let (cpb_removal_delay_length, dpb_output_delay_length, time_offset_length) = hrd
            .map(|hrd| {
                (
                    hrd.cpb_removal_delay_length(),
                    hrd.dpb_output_delay_length(),
                    u32::from(hrd.time_offset_length),
                )
            })
            .unwrap_or((DEFAULT_DELAY_LENGTH, DEFAULT_DELAY_LENGTH, 0));

        let cpb_removal_delay = reader.read_bits(cpb_removal_delay_length)?;
        let dpb_output_delay = reader.read_bits(dpb_output_delay_length)?;

        let pic_struct_present = vui.is_some_and(|vui| vui.pic_struct_present_flag);
        if !pic_struct_present {
            return Ok(Self {
                cpb_removal_delay,
                dpb_output_delay,
                ..Default::default()
            });
        }

        let pic_struct = reader.read_bits(4)? as u8;
        let clock_ts_count = num_clock_ts(pic_struct).unwrap_or_else(|| {
            tracing::warn!("invalid pic_struct {}, no clock timestamps read", pic_struct);
            0
        });
        let mut clock_timestamps = Vec::with_capacity(clock_ts_count);
        for _ in 0..clock_ts_count {
            if !reader.more_bits() {
                break;
            }
            // clock_timestamp_flag
            if reader.read_flag()? {
                clock_timestamps.push(Some(read_clock_timestamp(time_offset_length, reader)?));
            } else {
                clock_timestamps.push(None);
            }
        }
        Ok(Self {
            cpb_removal_delay,
            dpb_output_delay,
            pic_struct: Some(pic_struct),
            clock_timestamps,
        })
    }
}
