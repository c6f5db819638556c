//! Bitstream builders shared by the unit tests.

use bitstream_io::{BigEndian, BitWrite, BitWriter};
use codec_bitstream::{
    exp_golomb::{write_se, write_ue},
    rbsp::insert_emulation_prevention,
};

pub const START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

#[derive(Debug, Clone, Default)]
pub struct VuiFixture {
    pub aspect_ratio_idc: Option<u8>,
    /// num_units_in_tick, time_scale, fixed_frame_rate_flag
    pub timing: Option<(u32, u32, bool)>,
    /// NAL HRD with 24 bit delays and time offsets
    pub nal_hrd: bool,
    pub cpb_cnt_minus1: u32,
    pub pic_struct_present: bool,
}

fn rbsp_bytes<F>(body: F) -> Vec<u8>
where
    F: FnOnce(&mut BitWriter<&mut Vec<u8>, BigEndian>),
{
    let mut bytes = Vec::new();
    let mut writer = BitWriter::endian(&mut bytes, BigEndian);
    body(&mut writer);
    // rbsp_stop_one_bit
    writer.write_bit(true).unwrap();
    writer.byte_align().unwrap();
    drop(writer);
    bytes
}

fn unit(header: &[u8], rbsp: &[u8]) -> Vec<u8> {
    let mut unit = header.to_vec();
    unit.extend(insert_emulation_prevention(rbsp));
    unit
}

pub fn annex_b(units: &[Vec<u8>]) -> Vec<u8> {
    units
        .iter()
        .flat_map(|unit| START_CODE.iter().chain(unit.iter()).copied())
        .collect()
}

/// A slice header start: first_mb_in_slice, an I slice, pps 0 and one filler byte.
pub fn h264_slice(header: u8, first_mb_in_slice: u32) -> Vec<u8> {
    let rbsp = rbsp_bytes(|writer| {
        write_ue(writer, first_mb_in_slice).unwrap();
        write_ue(writer, 7).unwrap();
        write_ue(writer, 0).unwrap();
        writer.write_var(8, 0xAA_u8).unwrap();
    });
    unit(&[header], &rbsp)
}

fn write_vui(writer: &mut BitWriter<&mut Vec<u8>, BigEndian>, vui: &VuiFixture) {
    writer.write_bit(vui.aspect_ratio_idc.is_some()).unwrap();
    if let Some(idc) = vui.aspect_ratio_idc {
        writer.write_var(8, idc).unwrap();
        if idc == 255 {
            writer.write_var(16, 64_u16).unwrap();
            writer.write_var(16, 45_u16).unwrap();
        }
    }
    // overscan, video signal type, chroma location
    for _ in 0..3 {
        writer.write_bit(false).unwrap();
    }
    writer.write_bit(vui.timing.is_some()).unwrap();
    if let Some((num_units_in_tick, time_scale, fixed_frame_rate)) = vui.timing {
        writer.write_var(32, num_units_in_tick).unwrap();
        writer.write_var(32, time_scale).unwrap();
        writer.write_bit(fixed_frame_rate).unwrap();
    }
    writer.write_bit(vui.nal_hrd).unwrap();
    if vui.nal_hrd {
        write_ue(writer, vui.cpb_cnt_minus1).unwrap();
        writer.write_var(4, 0_u8).unwrap();
        writer.write_var(4, 0_u8).unwrap();
        for _ in 0..=vui.cpb_cnt_minus1 {
            write_ue(writer, 1000).unwrap();
            write_ue(writer, 1000).unwrap();
            writer.write_bit(false).unwrap();
        }
        for length_minus1 in [23_u8, 23, 23] {
            writer.write_var(5, length_minus1).unwrap();
        }
        writer.write_var(5, 24_u8).unwrap(); // time_offset_length
    }
    // vcl_hrd_parameters_present_flag
    writer.write_bit(false).unwrap();
    if vui.nal_hrd {
        // low_delay_hrd_flag
        writer.write_bit(false).unwrap();
    }
    writer.write_bit(vui.pic_struct_present).unwrap();
    // bitstream_restriction_flag
    writer.write_bit(false).unwrap();
}

/// Baseline 352x288 SPS, with a VUI when `vui` is given.
pub fn sps_unit(vui: Option<&VuiFixture>) -> Vec<u8> {
    let rbsp = rbsp_bytes(|writer| {
        writer.write_var(8, 66_u8).unwrap(); // profile_idc
        writer.write_var(8, 0b1100_0000_u8).unwrap();
        writer.write_var(8, 30_u8).unwrap(); // level_idc
        write_ue(writer, 0).unwrap(); // seq_parameter_set_id
        write_ue(writer, 0).unwrap(); // log2_max_frame_num_minus4
        write_ue(writer, 2).unwrap(); // pic_order_cnt_type
        write_ue(writer, 1).unwrap(); // max_num_ref_frames
        writer.write_bit(false).unwrap();
        write_ue(writer, 21).unwrap();
        write_ue(writer, 17).unwrap();
        writer.write_bit(true).unwrap(); // frame_mbs_only_flag
        writer.write_bit(true).unwrap(); // direct_8x8_inference_flag
        writer.write_bit(false).unwrap(); // frame_cropping_flag
        writer.write_bit(vui.is_some()).unwrap();
        if let Some(vui) = vui {
            write_vui(writer, vui);
        }
    });
    unit(&[0x67], &rbsp)
}

/// SEI unit holding `(payload_type, payload)` messages.
pub fn sei_unit(messages: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut rbsp = Vec::new();
    for (payload_type, payload) in messages {
        for value in [*payload_type as usize, payload.len()] {
            rbsp.extend(std::iter::repeat_n(0xFF_u8, value / 255));
            rbsp.push((value % 255) as u8);
        }
        rbsp.extend_from_slice(payload);
    }
    // rbsp_trailing_bits
    rbsp.push(0x80);
    unit(&[0x06], &rbsp)
}

fn payload_bytes<F>(body: F) -> Vec<u8>
where
    F: FnOnce(&mut BitWriter<&mut Vec<u8>, BigEndian>),
{
    let mut bytes = Vec::new();
    let mut writer = BitWriter::endian(&mut bytes, BigEndian);
    body(&mut writer);
    // bit_equal_to_one, then alignment zeros
    if !writer.byte_aligned() {
        writer.write_bit(true).unwrap();
        writer.byte_align().unwrap();
    }
    drop(writer);
    bytes
}

/// Buffering period for the one-schedule NAL HRD of [`VuiFixture`].
pub fn buffering_period_payload(initial_cpb_removal_delay: u32) -> Vec<u8> {
    payload_bytes(|writer| {
        write_ue(writer, 0).unwrap();
        writer.write_var(24, initial_cpb_removal_delay).unwrap();
        writer.write_var(24, 0_u32).unwrap();
    })
}

/// Picture timing with 24 bit delays. `pic_struct` must be one of 0..=2, its
/// single clock timestamp is a full one built from
/// `(hours, minutes, seconds, n_frames)`.
pub fn pic_timing_payload(
    cpb_removal_delay: u32,
    pic_struct: Option<u8>,
    clock: Option<(u8, u8, u8, u8)>,
    time_offset_length: u32,
) -> Vec<u8> {
    payload_bytes(|writer| {
        writer.write_var(24, cpb_removal_delay).unwrap();
        writer.write_var(24, 0_u32).unwrap();
        if let Some(pic_struct) = pic_struct {
            writer.write_var(4, pic_struct).unwrap();
            writer.write_bit(clock.is_some()).unwrap();
            if let Some((hours, minutes, seconds, n_frames)) = clock {
                writer.write_var(2, 0_u8).unwrap(); // ct_type
                writer.write_bit(false).unwrap(); // nuit_field_based_flag
                writer.write_var(5, 0_u8).unwrap(); // counting_type
                writer.write_bit(true).unwrap(); // full_timestamp_flag
                writer.write_bit(false).unwrap();
                writer.write_bit(false).unwrap();
                writer.write_var(8, n_frames).unwrap();
                writer.write_var(6, seconds).unwrap();
                writer.write_var(6, minutes).unwrap();
                writer.write_var(5, hours).unwrap();
                if time_offset_length > 0 {
                    writer.write_var(time_offset_length, 0_u32).unwrap();
                }
            }
        }
    })
}

/// Pan-scan rect with one window of `(left, right, top, bottom)` offsets.
pub fn pan_scan_payload(rect_id: u32, offsets: (i32, i32, i32, i32), repetition: u32) -> Vec<u8> {
    payload_bytes(|writer| {
        write_ue(writer, rect_id).unwrap();
        writer.write_bit(false).unwrap(); // pan_scan_rect_cancel_flag
        write_ue(writer, 0).unwrap(); // pan_scan_cnt_minus1
        for offset in [offsets.0, offsets.1, offsets.2, offsets.3] {
            write_se(writer, offset).unwrap();
        }
        write_ue(writer, repetition).unwrap();
    })
}

/// HEVC unit, a slice body starts with `first_slice_segment_in_pic_flag`.
pub fn hevc_unit(nal_unit_type: u8, first_slice_segment_in_pic: Option<bool>) -> Vec<u8> {
    let mut unit = vec![nal_unit_type << 1, 0x01];
    match first_slice_segment_in_pic {
        Some(first) => unit.extend([if first { 0xD0 } else { 0x50 }, 0x8A, 0x42]),
        None => unit.extend([0x0C, 0x01, 0xFF]),
    }
    unit
}
