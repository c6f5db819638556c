use codec_h264::nalu_header::NaluHeader as H264NaluHeader;
use codec_hevc::nalu_header::NaluHeader as HevcNaluHeader;
use tokio_util::bytes::Bytes;

use crate::{config::CodecFamily, errors::ElementaryResult};

/// Raw framer output: one unit without its start code or length prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedUnit {
    pub payload: Bytes,
    /// container timestamp of the chunk the unit began in, in microseconds
    pub timestamp: Option<i64>,
}

/// A framed unit with its header classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodedUnit {
    pub payload: Bytes,
    pub unit_type: u8,
    /// H.264 only
    pub nal_ref_idc: Option<u8>,
}

impl CodedUnit {
    pub fn classify(codec: CodecFamily, payload: Bytes) -> ElementaryResult<Self> {
        let (unit_type, nal_ref_idc) = match codec {
            CodecFamily::H264 => {
                let first = payload.first().copied().unwrap_or_default();
                let header = H264NaluHeader::try_from(first)?;
                (u8::from(header.nal_unit_type), Some(header.nal_ref_idc))
            }
            CodecFamily::Hevc => {
                let header = HevcNaluHeader::parse(&payload)?;
                (u8::from(header.nal_unit_type), None)
            }
            // the start code value byte, e.g. 0xB6 for an MPEG-4 VOP
            CodecFamily::Legacy => (payload.first().copied().unwrap_or_default(), None),
        };
        Ok(Self {
            payload,
            unit_type,
            nal_ref_idc,
        })
    }
}
