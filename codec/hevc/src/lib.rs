pub mod errors;
pub mod nalu_header;
pub mod nalu_type;
