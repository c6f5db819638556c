use codec_h264::nalu_type::NALUType as H264NaluType;
use codec_hevc::nalu_type::NALUType as HevcNaluType;
use utils::{bytes::HexPreview, traits::buffer::GenericFragmentComposer};

use crate::{
    au_detector::{FrameBoundaryDetector, new_detector},
    config::{CodecFamily, StreamConfig},
    errors::{ElementaryError, ElementaryResult},
    framer::{UnitFramer, new_framer},
    metadata::{AuxMetadataParser, FrameMetadata},
    unit::{CodedUnit, FramedUnit},
};

const LOG_PREVIEW_BYTES: usize = 8;

/// One coded picture with its side information.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessUnit {
    pub units: Vec<CodedUnit>,
    /// presentation time in microseconds
    pub timestamp: Option<i64>,
    pub metadata: FrameMetadata,
    pub is_keyframe: bool,
    /// opened because a slice header could not be read
    pub boundary_assumed: bool,
}

#[derive(Debug)]
pub struct ClassifiedUnit {
    pub unit: CodedUnit,
    pub timestamp: Option<i64>,
    pub is_slice: bool,
    pub is_new_frame: bool,
    pub boundary_assumed: bool,
}

#[derive(Debug, Default)]
pub struct PendingAccessUnit {
    units: Vec<CodedUnit>,
    slice_timestamp: Option<i64>,
    first_timestamp: Option<i64>,
    boundary_assumed: bool,
}

impl PendingAccessUnit {
    fn push(&mut self, item: ClassifiedUnit) {
        if item.is_slice {
            self.slice_timestamp = self.slice_timestamp.or(item.timestamp);
        }
        self.first_timestamp = self.first_timestamp.or(item.timestamp);
        self.boundary_assumed |= item.boundary_assumed;
        self.units.push(item.unit);
    }

    /// The timestamp of the first slice that has one, parameter sets and SEI
    /// may come from an earlier chunk.
    fn timestamp(&self) -> Option<i64> {
        self.slice_timestamp.or(self.first_timestamp)
    }
}

impl From<ClassifiedUnit> for PendingAccessUnit {
    fn from(value: ClassifiedUnit) -> Self {
        let mut pending = Self::default();
        pending.push(value);
        pending
    }
}

/// Collects units until one opens the next access unit.
#[derive(Debug, Default)]
pub struct AccessUnitAssembler {
    pending: Option<PendingAccessUnit>,
}

impl AccessUnitAssembler {
    pub fn take(&mut self) -> Option<PendingAccessUnit> {
        self.pending.take()
    }
}

impl GenericFragmentComposer for AccessUnitAssembler {
    type In = ClassifiedUnit;
    type Out = PendingAccessUnit;
    type Error = ElementaryError;
    fn enqueue(&mut self, packet: Self::In) -> Result<Option<Self::Out>, Self::Error> {
        match self.pending.as_mut() {
            Some(pending) if !packet.is_new_frame => {
                pending.push(packet);
                Ok(None)
            }
            _ => Ok(self.pending.replace(PendingAccessUnit::from(packet))),
        }
    }
}

/// Turns a chunked elementary stream into access units.
pub struct ElementaryStreamDemuxer {
    config: StreamConfig,
    framer: Box<dyn UnitFramer + Send>,
    detector: Box<dyn FrameBoundaryDetector + Send>,
    assembler: AccessUnitAssembler,
    metadata: AuxMetadataParser,
}

impl ElementaryStreamDemuxer {
    pub fn new(config: StreamConfig) -> ElementaryResult<Self> {
        config.validate()?;
        tracing::debug!("elementary stream demuxer created: {:?}", config);
        Ok(Self {
            framer: new_framer(config.framing, config.max_unit_size),
            detector: new_detector(config.codec),
            assembler: AccessUnitAssembler::default(),
            metadata: AuxMetadataParser::new(config.pan_scan_pool_size),
            config,
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn metadata(&self) -> &AuxMetadataParser {
        &self.metadata
    }

    /// Returns the access units completed by this chunk, the last one stays
    /// pending until the next unit or [`Self::finish`] closes it.
    pub fn feed(&mut self, chunk: &[u8], timestamp: Option<i64>) -> ElementaryResult<Vec<AccessUnit>> {
        let units = self.framer.feed(chunk, timestamp)?;
        self.process_units(units)
    }

    /// End of stream, closes the last access unit.
    pub fn finish(&mut self) -> ElementaryResult<Vec<AccessUnit>> {
        let units = self.framer.finish()?;
        let mut access_units = self.process_units(units)?;
        if let Some(pending) = self.assembler.take() {
            access_units.push(self.finalize(pending));
        }
        Ok(access_units)
    }

    /// Discontinuity: everything tied to the stream position is dropped.
    pub fn flush(&mut self) {
        self.framer.flush();
        self.detector.reset();
        if let Some(pending) = self.assembler.take() {
            tracing::debug!(
                "flush dropped a pending access unit of {} units",
                pending.units.len()
            );
        }
        self.metadata.flush();
    }

    pub fn parse_extradata_vui(&mut self, data: &[u8]) -> bool {
        self.config.codec == CodecFamily::H264 && self.metadata.parse_extradata_vui(data)
    }

    fn process_units(&mut self, units: Vec<FramedUnit>) -> ElementaryResult<Vec<AccessUnit>> {
        let mut access_units = Vec::new();
        for framed in units {
            if let Some(access_unit) = self.process_unit(framed)? {
                access_units.push(access_unit);
            }
        }
        Ok(access_units)
    }

    fn process_unit(&mut self, framed: FramedUnit) -> ElementaryResult<Option<AccessUnit>> {
        let unit = match CodedUnit::classify(self.config.codec, framed.payload) {
            Ok(unit) => unit,
            Err(err) => {
                tracing::warn!("unclassifiable unit dropped: {}", err);
                return Ok(None);
            }
        };
        let (is_new_frame, boundary_assumed) = match self.detector.detect(&unit) {
            Ok(is_new_frame) => (is_new_frame, false),
            Err(err) => {
                tracing::warn!(
                    "unit type {} with unreadable slice header, assuming a new frame: {}",
                    unit.unit_type,
                    err
                );
                (true, true)
            }
        };
        tracing::trace!(
            "unit type {}, new frame {}, {} bytes: {}",
            unit.unit_type,
            is_new_frame,
            unit.payload.len(),
            HexPreview::new(&unit.payload, LOG_PREVIEW_BYTES)
        );

        let completed = self.assembler.enqueue(ClassifiedUnit {
            unit: unit.clone(),
            timestamp: framed.timestamp,
            is_slice: self.is_slice(&unit),
            is_new_frame,
            boundary_assumed,
        })?;
        // the previous access unit is done before this unit's SEI applies
        let access_unit = completed.map(|pending| self.finalize(pending));
        if self.config.codec == CodecFamily::H264
            && let Err(err) = self.metadata.parse_nal(&unit)
        {
            tracing::warn!("unit type {} side information dropped: {}", unit.unit_type, err);
        }
        Ok(access_unit)
    }

    fn finalize(&mut self, pending: PendingAccessUnit) -> AccessUnit {
        let container_timestamp = pending.timestamp();
        let (timestamp, metadata) = if self.config.codec == CodecFamily::H264 {
            let reconciled = self.metadata.process_timestamp(container_timestamp);
            let timestamp = container_timestamp.or(reconciled);
            self.metadata.update_pan_scan(timestamp);
            (timestamp, self.metadata.frame_metadata(timestamp))
        } else {
            (container_timestamp, FrameMetadata::default())
        };
        let is_keyframe = pending.units.iter().any(|unit| self.is_keyframe_unit(unit));
        tracing::debug!(
            "access unit of {} units, timestamp {:?}, keyframe {}",
            pending.units.len(),
            timestamp,
            is_keyframe
        );
        AccessUnit {
            units: pending.units,
            timestamp,
            metadata,
            is_keyframe,
            boundary_assumed: pending.boundary_assumed,
        }
    }

    fn is_slice(&self, unit: &CodedUnit) -> bool {
        match self.config.codec {
            CodecFamily::H264 => H264NaluType::try_from(unit.unit_type)
                .is_ok_and(|nalu_type| nalu_type.is_picture_slice()),
            CodecFamily::Hevc => HevcNaluType::from(unit.unit_type).is_slice(),
            CodecFamily::Legacy => true,
        }
    }

    fn is_keyframe_unit(&self, unit: &CodedUnit) -> bool {
        match self.config.codec {
            CodecFamily::H264 => H264NaluType::try_from(unit.unit_type)
                .is_ok_and(|nalu_type| nalu_type.is_idr()),
            CodecFamily::Hevc => HevcNaluType::from(unit.unit_type).is_irap(),
            CodecFamily::Legacy => false,
        }
    }
}
