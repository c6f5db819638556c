use codec_bitstream::reader::BitstreamReader;
use utils::traits::reader::BitwiseReadWithContext;

use crate::{
    errors::{H264CodecError, H264CodecResult},
    vui::{VuiParameters, hrd_parameters::HrdParameters},
};

const MAX_SEQ_PARAMETER_SET_ID: u32 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialCpbRemoval {
    pub initial_cpb_removal_delay: u32,        // u(v)
    pub initial_cpb_removal_delay_offset: u32, // u(v)
}

/// @see: Section D.1.2 Buffering period SEI message syntax
#[derive(Debug, Clone, Default)]
pub struct SeiBufferingPeriod {
    pub seq_parameter_set_id: u8, // ue(v), in [0, 31]
    /// if NalHrdBpPresentFlag {
    pub nal_initial_cpb_removals: Vec<InitialCpbRemoval>,
    /// }
    /// if VclHrdBpPresentFlag {
    pub vcl_initial_cpb_removals: Vec<InitialCpbRemoval>,
}

impl SeiBufferingPeriod {
    /// A buffering period without any HRD carries no timing information.
    pub fn is_valid(&self) -> bool {
        !self.nal_initial_cpb_removals.is_empty() || !self.vcl_initial_cpb_removals.is_empty()
    }
}

fn read_initial_cpb_removals(
    hrd: Option<&HrdParameters>,
    reader: &mut BitstreamReader,
) -> H264CodecResult<Vec<InitialCpbRemoval>> {
    let Some(hrd) = hrd else {
        return Ok(Vec::new());
    };
    let length = hrd.initial_cpb_removal_delay_length();
    (0..hrd.cpb_cnt())
        .map(|_| {
            Ok::<_, H264CodecError>(InitialCpbRemoval {
                initial_cpb_removal_delay: reader.read_bits(length)?,
                initial_cpb_removal_delay_offset: reader.read_bits(length)?,
            })
        })
        .collect()
}

impl<'a> BitwiseReadWithContext<Option<&VuiParameters>, BitstreamReader<'a>>
    for SeiBufferingPeriod
{
    type Error = H264CodecError;
    fn read_with_context(
        vui: Option<&VuiParameters>,
        reader: &mut BitstreamReader<'a>,
    ) -> Result<Self, Self::Error> {
        let seq_parameter_set_id = reader.read_ue()?;
        if seq_parameter_set_id > MAX_SEQ_PARAMETER_SET_ID {
            return Err(H264CodecError::InvalidFieldValue {
                field: "seq_parameter_set_id",
                value: u64::from(seq_parameter_set_id),
            });
        }
        let nal_initial_cpb_removals = read_initial_cpb_removals(
            vui.and_then(|vui| vui.nal_hrd_parameters.as_ref()),
            reader,
        )?;
        let vcl_initial_cpb_removals = read_initial_cpb_removals(
            vui.and_then(|vui| vui.vcl_hrd_parameters.as_ref()),
            reader,
        )?;
        Ok(Self {
            seq_parameter_set_id: seq_parameter_set_id as u8,
            nal_initial_cpb_removals,
            vcl_initial_cpb_removals,
        })
    }
}
