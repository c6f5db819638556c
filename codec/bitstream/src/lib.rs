pub mod errors;
pub mod exp_golomb;
pub mod rbsp;
pub mod reader;
