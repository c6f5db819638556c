pub mod errors;
pub mod nalu_header;
pub mod nalu_type;
pub mod sei;
pub mod sps;
pub mod vui;
