use codec_bitstream::{rbsp::extract_rbsp, reader::BitstreamReader};
use codec_h264::{
    nalu_header::NaluHeader,
    nalu_type::NALUType,
    sei::{
        SeiPayload, SeiPayloadType, frame_packing::FramePackingArrangement,
        pic_timing::SeiPicTiming, split_sei_messages,
    },
    sps::Sps,
    vui::{AspectRatioInfoExtendedSAR, VuiParameters},
};
use pan_scan::PanScanSchedule;
use timestamp::TimestampReconciler;
use utils::traits::reader::BitwiseReadFrom;

use crate::{errors::ElementaryResult, unit::CodedUnit};

pub mod pan_scan;
pub mod timestamp;

/// Pan-scan rectangle offsets in 1/16 sample units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PanScanWindow {
    pub x: i32,
    pub y: i32,
    pub dx: i32,
    pub dy: i32,
}

/// Display hints attached to an access unit.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct FrameMetadata {
    pub aspect_ratio: Option<AspectRatioInfoExtendedSAR>,
    /// at most three windows
    pub pan_scan_windows: Vec<PanScanWindow>,
    pub frame_packing: Option<FramePackingArrangement>,
    pub frame_rate: Option<f64>,
}

/// Sequence and picture level side information of an H.264 stream.
#[derive(Debug)]
pub struct AuxMetadataParser {
    sps: Option<Sps>,
    vui: Option<VuiParameters>,
    /// consumed by the next access unit
    pic_timing: Option<SeiPicTiming>,
    frame_packing: Option<FramePackingArrangement>,
    pan_scan: PanScanSchedule,
    reconciler: TimestampReconciler,
}

impl AuxMetadataParser {
    pub fn new(pan_scan_pool_size: usize) -> Self {
        Self {
            sps: None,
            vui: None,
            pic_timing: None,
            frame_packing: None,
            pan_scan: PanScanSchedule::new(pan_scan_pool_size),
            reconciler: TimestampReconciler::default(),
        }
    }

    pub fn sps(&self) -> Option<&Sps> {
        self.sps.as_ref()
    }

    pub fn vui(&self) -> Option<&VuiParameters> {
        self.vui.as_ref()
    }

    /// Picks up SPS and SEI units, other units are ignored. A record that
    /// fails to parse is logged and dropped.
    pub fn parse_nal(&mut self, unit: &CodedUnit) -> ElementaryResult<()> {
        match NALUType::try_from(unit.unit_type)? {
            NALUType::SPS => self.parse_sps(&unit.payload),
            NALUType::SEI => self.parse_sei(&unit.payload),
            _ => Ok(()),
        }
    }

    fn parse_sps(&mut self, payload: &[u8]) -> ElementaryResult<()> {
        let rbsp = extract_rbsp(payload, NaluHeader::BYTES_COUNT, false)?;
        let mut reader = BitstreamReader::new(&rbsp);
        match Sps::read_from(&mut reader) {
            Ok(sps) => {
                self.vui = sps.vui_parameters.clone();
                self.sps = Some(sps);
            }
            Err(err) => {
                tracing::warn!("sps dropped, keeping the previous one: {}", err);
            }
        }
        // a new sequence starts without a pan-scan rectangle
        self.pan_scan.get_free();
        Ok(())
    }

    fn parse_sei(&mut self, payload: &[u8]) -> ElementaryResult<()> {
        let rbsp = extract_rbsp(payload, NaluHeader::BYTES_COUNT, false)?;
        let messages = match split_sei_messages(&rbsp) {
            Ok(messages) => messages,
            Err(err) => {
                tracing::warn!("sei unit dropped: {}", err);
                return Ok(());
            }
        };
        for message in messages {
            match message.parse(self.vui.as_ref()) {
                Ok(Some(SeiPayload::BufferingPeriod(buffering_period))) => {
                    self.reconciler.on_buffering_period(&buffering_period);
                }
                Ok(Some(SeiPayload::PicTiming(pic_timing))) => {
                    self.pic_timing = Some(pic_timing);
                }
                Ok(Some(SeiPayload::PanScanRect(rect))) => {
                    if let Some(slot) = self.pan_scan.get_free() {
                        *slot = rect;
                    }
                }
                Ok(Some(SeiPayload::FramePackingArrangement(frame_packing))) => {
                    self.frame_packing = Some(frame_packing);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(
                        "sei payload {:?} dropped: {}",
                        message.payload_type,
                        err
                    );
                    if message.payload_type == SeiPayloadType::PanScanRect {
                        // a broken rectangle still ends the current one
                        self.pan_scan.get_free();
                    }
                }
            }
        }
        Ok(())
    }

    /// VUI handed over out of band by the container. Returns whether one
    /// was found.
    pub fn parse_extradata_vui(&mut self, data: &[u8]) -> bool {
        let mut reader = BitstreamReader::new(data);
        match VuiParameters::read_from_extradata(&mut reader) {
            Ok(Some(vui)) => {
                self.vui = Some(vui);
                true
            }
            Ok(None) => {
                tracing::debug!("no vui in {} bytes of extradata", data.len());
                false
            }
            Err(err) => {
                tracing::warn!("extradata vui dropped: {}", err);
                false
            }
        }
    }

    pub fn fill_aspect_ratio_info(&self) -> Option<AspectRatioInfoExtendedSAR> {
        self.vui
            .as_ref()?
            .aspect_ratio_info
            .as_ref()?
            .sample_aspect_ratio()
    }

    pub fn fill_pan_scan_data(&mut self, ts: Option<i64>) -> Vec<PanScanWindow> {
        self.pan_scan
            .get_populated(ts)
            .map(|rect| {
                rect.offsets
                    .iter()
                    .map(|offsets| PanScanWindow {
                        x: offsets.left,
                        y: offsets.top,
                        dx: offsets.right,
                        dy: offsets.bottom,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The last arrangement, unless it was cancelled.
    pub fn frame_packing(&self) -> Option<&FramePackingArrangement> {
        self.frame_packing
            .as_ref()
            .filter(|v| !v.frame_packing_arrangement_cancel_flag)
    }

    pub fn frame_rate(&self) -> Option<f64> {
        self.vui.as_ref().and_then(VuiParameters::frame_rate)
    }

    pub fn is_mbaff(&self) -> bool {
        self.sps.as_ref().is_some_and(Sps::is_mbaff)
    }

    /// Timestamp of the access unit being completed, the picture timing SEI
    /// seen since the previous one is used up.
    pub fn process_timestamp(&mut self, ts: Option<i64>) -> Option<i64> {
        let pic_timing = self.pic_timing.take();
        self.reconciler
            .reconcile(ts, self.vui.as_ref(), pic_timing.as_ref())
    }

    pub fn update_pan_scan(&mut self, ts: Option<i64>) {
        self.pan_scan.update_last(ts);
    }

    pub fn frame_metadata(&mut self, ts: Option<i64>) -> FrameMetadata {
        FrameMetadata {
            aspect_ratio: self.fill_aspect_ratio_info(),
            pan_scan_windows: self.fill_pan_scan_data(ts),
            frame_packing: self.frame_packing().cloned(),
            frame_rate: self.frame_rate(),
        }
    }

    /// Forgets the position in the stream, the SPS and VUI are kept.
    pub fn flush(&mut self) {
        self.pic_timing = None;
        self.pan_scan.reset();
        self.reconciler.reset();
    }
}
