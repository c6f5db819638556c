use codec_h264::{
    sei::{buffering_period::SeiBufferingPeriod, pic_timing::SeiPicTiming},
    vui::VuiParameters,
};
use num::ToPrimitive;

const MICROS_PER_SECOND: i128 = 1_000_000;
const DEFAULT_TFI_DIVISOR: i128 = 2;

/// Field ticks per frame for a pic_struct, @see: Table D-1
fn tfi_divisor(pic_struct: u8) -> i128 {
    match pic_struct {
        1 | 2 => 1,
        0 | 3 | 4 => 2,
        5 | 6 => 3,
        7 => 4,
        8 => 6,
        _ => DEFAULT_TFI_DIVISOR,
    }
}

/// Rebuilds access unit timestamps, in microseconds, from the stream's own
/// timing: clock timestamps, the fixed frame rate, or cpb removal delays
/// counted from the last buffering period.
#[derive(Debug, Default)]
pub struct TimestampReconciler {
    fixed_rate_previous: Option<i64>,
    buffering_period_valid: bool,
    access_units_since_buffering_period: u64,
    reference_timestamp: Option<i64>,
}

impl TimestampReconciler {
    pub fn on_buffering_period(&mut self, buffering_period: &SeiBufferingPeriod) {
        self.buffering_period_valid = buffering_period.is_valid();
        self.access_units_since_buffering_period = 0;
    }

    /// Called once per access unit with the container timestamp and the
    /// picture timing SEI of that unit, if any.
    pub fn reconcile(
        &mut self,
        timestamp: Option<i64>,
        vui: Option<&VuiParameters>,
        pic_timing: Option<&SeiPicTiming>,
    ) -> Option<i64> {
        let Some(timing) = vui
            .and_then(|vui| vui.timing_info.as_ref())
            .filter(|timing| timing.time_scale != 0)
        else {
            return timestamp;
        };
        let num_units_in_tick = i128::from(timing.num_units_in_tick);
        let time_scale = i128::from(timing.time_scale);

        if let Some(clock) = pic_timing.and_then(SeiPicTiming::last_clock_timestamp) {
            let seconds = (i128::from(clock.hours_value) * 60 + i128::from(clock.minutes_value)) * 60
                + i128::from(clock.seconds_value);
            let ticks = i128::from(clock.n_frames)
                * num_units_in_tick
                * (1 + i128::from(clock.nuit_field_based_flag))
                + i128::from(clock.time_offset);
            return (seconds * MICROS_PER_SECOND + ticks * MICROS_PER_SECOND / time_scale).to_i64();
        }

        if timing.fixed_frame_rate_flag {
            if timestamp.is_some() {
                self.fixed_rate_previous = timestamp;
            } else if let Some(previous) = self.fixed_rate_previous {
                let divisor = pic_timing
                    .and_then(|pic_timing| pic_timing.pic_struct)
                    .map_or(DEFAULT_TFI_DIVISOR, tfi_divisor);
                let delta = divisor * MICROS_PER_SECOND * num_units_in_tick / time_scale;
                self.fixed_rate_previous = (i128::from(previous) + delta).to_i64();
            }
            return self.fixed_rate_previous;
        }

        if !self.buffering_period_valid {
            return timestamp;
        }
        let mut result = timestamp;
        if self.access_units_since_buffering_period == 0 {
            self.reference_timestamp = timestamp;
        } else if let (Some(pic_timing), Some(reference)) = (pic_timing, self.reference_timestamp) {
            let delay = i128::from(pic_timing.cpb_removal_delay) * MICROS_PER_SECOND
                * num_units_in_tick
                / time_scale;
            result = (i128::from(reference) + delay).to_i64();
        }
        self.access_units_since_buffering_period += 1;
        result
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod test {
    use codec_h264::{
        sei::{
            buffering_period::{InitialCpbRemoval, SeiBufferingPeriod},
            pic_timing::{ClockTimestamp, SeiPicTiming},
        },
        vui::{TimingInfo, VuiParameters},
    };

    use super::TimestampReconciler;

    fn vui(num_units_in_tick: u32, time_scale: u32, fixed_frame_rate_flag: bool) -> VuiParameters {
        VuiParameters {
            timing_info: Some(TimingInfo {
                num_units_in_tick,
                time_scale,
                fixed_frame_rate_flag,
            }),
            ..Default::default()
        }
    }

    fn pic_timing(cpb_removal_delay: u32, pic_struct: Option<u8>) -> SeiPicTiming {
        SeiPicTiming {
            cpb_removal_delay,
            pic_struct,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_timing_passes_through() {
        let mut reconciler = TimestampReconciler::default();
        assert_eq!(reconciler.reconcile(Some(5), None, None), Some(5));
        assert_eq!(reconciler.reconcile(None, None, None), None);
        let vui = vui(1, 0, true);
        assert_eq!(reconciler.reconcile(None, Some(&vui), None), None);
        assert_eq!(reconciler.reconcile(Some(7), Some(&vui), None), Some(7));
    }

    #[test]
    fn test_fixed_frame_rate_extrapolation() {
        let mut reconciler = TimestampReconciler::default();
        let vui = vui(1, 60, true);
        let t0 = 1_000_000;
        assert_eq!(reconciler.reconcile(Some(t0), Some(&vui), None), Some(t0));
        assert_eq!(reconciler.reconcile(None, Some(&vui), None), Some(t0 + 33_333));
        assert_eq!(reconciler.reconcile(None, Some(&vui), None), Some(t0 + 66_666));
        // a container timestamp re-anchors the extrapolation
        assert_eq!(reconciler.reconcile(Some(5_000_000), Some(&vui), None), Some(5_000_000));
    }

    #[test]
    fn test_fixed_frame_rate_divisor_from_pic_struct() {
        let vui = vui(1001, 60_000, true);
        for (pic_struct, delta) in [(1, 16_683), (0, 33_366), (5, 50_050), (7, 66_733), (8, 100_100)] {
            let mut reconciler = TimestampReconciler::default();
            reconciler.reconcile(Some(0), Some(&vui), None);
            let timing = pic_timing(0, Some(pic_struct));
            assert_eq!(
                reconciler.reconcile(None, Some(&vui), Some(&timing)),
                Some(delta),
                "pic_struct {}",
                pic_struct
            );
        }
    }

    #[test]
    fn test_fixed_frame_rate_without_anchor() {
        let mut reconciler = TimestampReconciler::default();
        let vui = vui(1, 60, true);
        assert_eq!(reconciler.reconcile(None, Some(&vui), None), None);
    }

    #[test]
    fn test_clock_timestamp() {
        let mut reconciler = TimestampReconciler::default();
        let vui = vui(1, 50, false);
        let timing = SeiPicTiming {
            pic_struct: Some(0),
            clock_timestamps: vec![Some(ClockTimestamp {
                nuit_field_based_flag: true,
                n_frames: 10,
                seconds_value: 5,
                minutes_value: 2,
                hours_value: 1,
                time_offset: 5,
                ..Default::default()
            })],
            ..Default::default()
        };
        // 3725 s + (10 * 1 * 2 + 5) / 50 s
        assert_eq!(
            reconciler.reconcile(Some(0), Some(&vui), Some(&timing)),
            Some(3_725_500_000)
        );
    }

    #[test]
    fn test_cpb_removal_delay_from_buffering_period() {
        let mut reconciler = TimestampReconciler::default();
        let vui = vui(1, 50, false);
        reconciler.on_buffering_period(&SeiBufferingPeriod {
            seq_parameter_set_id: 0,
            nal_initial_cpb_removals: vec![InitialCpbRemoval {
                initial_cpb_removal_delay: 900,
                initial_cpb_removal_delay_offset: 0,
            }],
            vcl_initial_cpb_removals: Vec::new(),
        });
        assert_eq!(
            reconciler.reconcile(Some(40_000), Some(&vui), Some(&pic_timing(0, None))),
            Some(40_000)
        );
        // two ticks per frame at 50 ticks per second
        assert_eq!(
            reconciler.reconcile(None, Some(&vui), Some(&pic_timing(2, None))),
            Some(80_000)
        );
        assert_eq!(
            reconciler.reconcile(None, Some(&vui), Some(&pic_timing(4, None))),
            Some(120_000)
        );
        // no picture timing, nothing to add
        assert_eq!(reconciler.reconcile(None, Some(&vui), None), None);
    }

    #[test]
    fn test_invalid_buffering_period_passes_through() {
        let mut reconciler = TimestampReconciler::default();
        let vui = vui(1, 50, false);
        reconciler.on_buffering_period(&SeiBufferingPeriod::default());
        assert_eq!(reconciler.reconcile(Some(1), Some(&vui), Some(&pic_timing(9, None))), Some(1));
        assert_eq!(reconciler.reconcile(None, Some(&vui), Some(&pic_timing(9, None))), None);
    }
}
