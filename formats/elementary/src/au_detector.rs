use std::mem;

use codec_bitstream::{rbsp::extract_rbsp, reader::BitstreamReader};
use codec_h264::{nalu_header::NaluHeader as H264NaluHeader, nalu_type::NALUType as H264NaluType};
use codec_hevc::{nalu_header::first_slice_segment_in_pic_flag, nalu_type::NALUType as HevcNaluType};

use crate::{config::CodecFamily, errors::ElementaryResult, unit::CodedUnit};

/// `first_mb_in_slice` is the first ue(v) after the header, a short prefix
/// of the slice is enough to reach it.
const SLICE_HEADER_PREFIX_BYTES: usize = 32;

/// Decides, one unit at a time, whether a unit opens a new access unit.
pub trait FrameBoundaryDetector {
    /// An error means the slice header could not be read, the detector state
    /// is updated anyway.
    fn detect(&mut self, unit: &CodedUnit) -> ElementaryResult<bool>;
    fn reset(&mut self);
}

pub fn new_detector(codec: CodecFamily) -> Box<dyn FrameBoundaryDetector + Send> {
    match codec {
        CodecFamily::H264 => Box::new(H264FrameBoundaryDetector::default()),
        CodecFamily::Hevc => Box::new(HevcFrameBoundaryDetector::default()),
        CodecFamily::Legacy => Box::new(LegacyFrameBoundaryDetector),
    }
}

/// Starts zeroed, so the first slice is compared against type 0 with
/// nal_ref_idc 0.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AUDetectorState {
    pub previous_type: u8,
    pub previous_ref_idc: u8,
    /// a parameter set or SEI was seen, the next slice joins its access unit
    pub force_stitch: bool,
    /// a slice was seen since the last parameter set or SEI
    pub au_data_seen: bool,
}

impl AUDetectorState {
    fn on_header_unit(&mut self) -> bool {
        self.force_stitch = true;
        mem::take(&mut self.au_data_seen)
    }

    fn on_slice(&mut self) {
        self.au_data_seen = true;
        self.force_stitch = false;
    }

    fn remember(&mut self, unit: &CodedUnit) {
        self.previous_type = unit.unit_type;
        self.previous_ref_idc = unit.nal_ref_idc.unwrap_or_default();
    }
}

fn read_first_mb_in_slice(payload: &[u8]) -> ElementaryResult<u32> {
    let prefix = &payload[..payload.len().min(SLICE_HEADER_PREFIX_BYTES)];
    let rbsp = extract_rbsp(prefix, H264NaluHeader::BYTES_COUNT, true)?;
    let mut reader = BitstreamReader::new(&rbsp);
    Ok(reader.read_ue()?)
}

fn is_idr_type(unit_type: u8) -> bool {
    H264NaluType::try_from(unit_type).is_ok_and(|nalu_type| nalu_type.is_idr())
}

#[derive(Debug, Default)]
pub struct H264FrameBoundaryDetector {
    state: AUDetectorState,
}

impl H264FrameBoundaryDetector {
    pub fn state(&self) -> &AUDetectorState {
        &self.state
    }

    fn slice_starts_frame(&self, unit: &CodedUnit) -> ElementaryResult<bool> {
        if read_first_mb_in_slice(&unit.payload)? == 0 {
            return Ok(true);
        }
        let ref_idc = unit.nal_ref_idc.unwrap_or_default();
        let ref_changed = (self.state.previous_ref_idc == 0) != (ref_idc == 0);
        let previous = self.state.previous_type;
        let idr_changed =
            previous != unit.unit_type && (is_idr_type(previous) || is_idr_type(unit.unit_type));
        Ok(ref_changed || idr_changed)
    }
}

impl FrameBoundaryDetector for H264FrameBoundaryDetector {
    fn detect(&mut self, unit: &CodedUnit) -> ElementaryResult<bool> {
        let nalu_type = H264NaluType::try_from(unit.unit_type)?;
        let result = if nalu_type.is_picture_slice() {
            let result = if self.state.force_stitch {
                Ok(false)
            } else {
                self.slice_starts_frame(unit)
            };
            self.state.on_slice();
            result
        } else if nalu_type.is_parameter_set_or_sei() {
            Ok(self.state.on_header_unit())
        } else {
            Ok(false)
        };
        self.state.remember(unit);
        result
    }

    fn reset(&mut self) {
        self.state = AUDetectorState::default();
    }
}

#[derive(Debug, Default)]
pub struct HevcFrameBoundaryDetector {
    state: AUDetectorState,
}

impl FrameBoundaryDetector for HevcFrameBoundaryDetector {
    fn detect(&mut self, unit: &CodedUnit) -> ElementaryResult<bool> {
        let nalu_type = HevcNaluType::from(unit.unit_type);
        let result = if nalu_type.is_slice() {
            let result = if self.state.force_stitch {
                Ok(false)
            } else {
                first_slice_segment_in_pic_flag(&unit.payload).map_err(Into::into)
            };
            self.state.on_slice();
            result
        } else if nalu_type.is_parameter_set_or_sei() {
            Ok(self.state.on_header_unit())
        } else {
            Ok(false)
        };
        self.state.remember(unit);
        result
    }

    fn reset(&mut self) {
        self.state = AUDetectorState::default();
    }
}

/// Every unit of a legacy stream is a picture.
#[derive(Debug, Default)]
pub struct LegacyFrameBoundaryDetector;

impl FrameBoundaryDetector for LegacyFrameBoundaryDetector {
    fn detect(&mut self, _unit: &CodedUnit) -> ElementaryResult<bool> {
        Ok(true)
    }

    fn reset(&mut self) {}
}
