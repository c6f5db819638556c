pub const MAX_CPB_COUNT: usize = 32;

#[derive(Debug, Clone)]
pub struct SchedSel {
    pub bit_rate_value_minus1: u32, // ue(v), in [0, 2^32 - 2]
    pub cpb_size_value_minus1: u32, // ue(v), in [0, 2^32 - 2]
    pub cbr_flag: bool,             // u(1)
}

/// @see: Section E.1.2 HRD parameters syntax
#[derive(Debug, Clone)]
pub struct HrdParameters {
    pub cpb_cnt_minus1: u8, // ue(v), in [0, 31]
    pub bit_rate_scale: u8, // u(4)
    pub cpb_size_scale: u8, // u(4)
    /// for( SchedSelIdx = 0; SchedSelIdx <= cpb_cnt_minus1; SchedSelIdx++ ) {
    pub sched_sels: Vec<SchedSel>,
    /// }
    pub initial_cpb_removal_delay_length_minus1: u8, // u(5)
    pub cpb_removal_delay_length_minus1: u8, // u(5)
    pub dpb_output_delay_length_minus1: u8,  // u(5)
    pub time_offset_length: u8,              // u(5)
}

impl HrdParameters {
    pub fn cpb_cnt(&self) -> usize {
        usize::from(self.cpb_cnt_minus1) + 1
    }

    pub fn initial_cpb_removal_delay_length(&self) -> u32 {
        u32::from(self.initial_cpb_removal_delay_length_minus1) + 1
    }

    pub fn cpb_removal_delay_length(&self) -> u32 {
        u32::from(self.cpb_removal_delay_length_minus1) + 1
    }

    pub fn dpb_output_delay_length(&self) -> u32 {
        u32::from(self.dpb_output_delay_length_minus1) + 1
    }
}
