use bitstream_io::{BigEndian, BitWrite, BitWriter};
use codec_bitstream::{exp_golomb::write_ue, reader::BitstreamReader};
use utils::traits::reader::BitwiseReadFrom;

use crate::{
    errors::H264CodecError,
    vui::{AspectRatioIdc, AspectRatioInfoExtendedSAR, VideoFormat, VuiParameters},
};

fn write_hrd<W: BitWrite>(writer: &mut W, cpb_cnt_minus1: u32) {
    write_ue(writer, cpb_cnt_minus1).unwrap();
    writer.write_var(4, 2_u8).unwrap(); // bit_rate_scale
    writer.write_var(4, 3_u8).unwrap(); // cpb_size_scale
    for _ in 0..=cpb_cnt_minus1.min(40) {
        write_ue(writer, 1000).unwrap();
        write_ue(writer, 2000).unwrap();
        writer.write_bit(false).unwrap();
    }
    writer.write_var(5, 23_u8).unwrap(); // initial_cpb_removal_delay_length_minus1
    writer.write_var(5, 15_u8).unwrap(); // cpb_removal_delay_length_minus1
    writer.write_var(5, 4_u8).unwrap(); // dpb_output_delay_length_minus1
    writer.write_var(5, 24_u8).unwrap(); // time_offset_length
}

fn vui_bytes(extended_sar: bool, nal_hrd_cpb_cnt_minus1: Option<u32>) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut writer = BitWriter::endian(&mut bytes, BigEndian);
    // aspect_ratio_info_present_flag
    writer.write_bit(true).unwrap();
    if extended_sar {
        writer.write_var(8, 255_u8).unwrap();
        writer.write_var(16, 64_u16).unwrap();
        writer.write_var(16, 45_u16).unwrap();
    } else {
        writer.write_var(8, 14_u8).unwrap();
    }
    // overscan_info_present_flag
    writer.write_bit(false).unwrap();
    // video_signal_type_present_flag, format, full range, colour description
    writer.write_bit(true).unwrap();
    writer.write_var(3, 5_u8).unwrap();
    writer.write_bit(false).unwrap();
    writer.write_bit(true).unwrap();
    writer.write_var(24, 0x010101_u32).unwrap();
    // chroma_loc_info_present_flag
    writer.write_bit(false).unwrap();
    // timing_info
    writer.write_bit(true).unwrap();
    writer.write_var(32, 1001_u32).unwrap();
    writer.write_var(32, 60000_u32).unwrap();
    writer.write_bit(true).unwrap();
    // nal_hrd_parameters_present_flag
    match nal_hrd_cpb_cnt_minus1 {
        Some(cnt) => {
            writer.write_bit(true).unwrap();
            write_hrd(&mut writer, cnt);
        }
        None => writer.write_bit(false).unwrap(),
    }
    // vcl_hrd_parameters_present_flag
    writer.write_bit(false).unwrap();
    if nal_hrd_cpb_cnt_minus1.is_some() {
        // low_delay_hrd_flag
        writer.write_bit(false).unwrap();
    }
    // pic_struct_present_flag
    writer.write_bit(true).unwrap();
    // bitstream_restriction_flag and its fields
    writer.write_bit(true).unwrap();
    writer.write_bit(true).unwrap();
    for value in [0, 0, 11, 11, 2, 4] {
        write_ue(&mut writer, value).unwrap();
    }
    // rbsp_stop_one_bit
    writer.write_bit(true).unwrap();
    writer.byte_align().unwrap();
    drop(writer);
    bytes
}

#[test]
fn test_vui() {
    let bytes = vui_bytes(false, None);
    let mut reader = BitstreamReader::new(&bytes);
    let vui = VuiParameters::read_from(&mut reader).unwrap();

    let aspect_ratio_info = vui.aspect_ratio_info.unwrap();
    assert_eq!(aspect_ratio_info.aspect_ratio_idc, AspectRatioIdc::Predefined(14));
    assert_eq!(
        aspect_ratio_info.sample_aspect_ratio(),
        Some(AspectRatioInfoExtendedSAR {
            sar_width: 4,
            sar_height: 3
        })
    );
    assert_eq!(
        vui.video_signal_type.as_ref().unwrap().video_format,
        VideoFormat::Unspecified
    );
    let timing_info = vui.timing_info.unwrap();
    assert_eq!(timing_info.num_units_in_tick, 1001);
    assert_eq!(timing_info.time_scale, 60000);
    assert!(timing_info.fixed_frame_rate_flag);
    assert!((vui.frame_rate().unwrap() - 29.97).abs() < 0.01);
    assert!(vui.nal_hrd_parameters.is_none());
    assert!(vui.low_delay_hrd_flag.is_none());
    assert!(vui.pic_struct_present_flag);
    assert!(vui.bitstream_restriction_flag);
    // only the stop bit is left
    assert!(!reader.more_rbsp_data());
}

#[test]
fn test_vui_extended_sar_and_hrd() {
    let bytes = vui_bytes(true, Some(1));
    let mut reader = BitstreamReader::new(&bytes);
    let vui = VuiParameters::read_from(&mut reader).unwrap();

    assert_eq!(
        vui.aspect_ratio_info.unwrap().sample_aspect_ratio(),
        Some(AspectRatioInfoExtendedSAR {
            sar_width: 64,
            sar_height: 45
        })
    );
    let hrd = vui.preferred_hrd().unwrap();
    assert_eq!(hrd.cpb_cnt(), 2);
    assert_eq!(hrd.sched_sels.len(), 2);
    assert_eq!(hrd.sched_sels[1].cpb_size_value_minus1, 2000);
    assert_eq!(hrd.initial_cpb_removal_delay_length(), 24);
    assert_eq!(hrd.cpb_removal_delay_length(), 16);
    assert_eq!(hrd.dpb_output_delay_length(), 5);
    assert_eq!(hrd.time_offset_length, 24);
    assert_eq!(vui.low_delay_hrd_flag, Some(false));
    assert!(!reader.more_rbsp_data());
}

#[test]
fn test_vui_rejects_cpb_count_over_limit() {
    let bytes = vui_bytes(false, Some(32));
    let mut reader = BitstreamReader::new(&bytes);
    let err = VuiParameters::read_from(&mut reader).unwrap_err();
    assert!(matches!(
        err,
        H264CodecError::InvalidFieldValue {
            field: "cpb_cnt_minus1",
            value: 32
        }
    ));
}

#[test]
fn test_vui_truncated() {
    let bytes = vui_bytes(false, None);
    let mut reader = BitstreamReader::new(&bytes[..6]);
    assert!(matches!(
        VuiParameters::read_from(&mut reader),
        Err(H264CodecError::Bitstream(_))
    ));
}

#[test]
fn test_vui_from_extradata() {
    let vui = vui_bytes(false, None);
    // 5 zero bits, the enable flag, then the vui shifted by 6 bits
    let mut bytes = Vec::new();
    let mut writer = BitWriter::endian(&mut bytes, BigEndian);
    writer.write_var(6, 0b000001_u8).unwrap();
    for byte in &vui {
        writer.write_var(8, *byte).unwrap();
    }
    writer.byte_align().unwrap();
    drop(writer);

    let mut reader = BitstreamReader::new(&bytes);
    let parsed = VuiParameters::read_from_extradata(&mut reader)
        .unwrap()
        .unwrap();
    assert_eq!(parsed.timing_info.unwrap().time_scale, 60000);

    let zeros = [0_u8; 4];
    let mut reader = BitstreamReader::new(&zeros);
    assert!(
        VuiParameters::read_from_extradata(&mut reader)
            .unwrap()
            .is_none()
    );
}
