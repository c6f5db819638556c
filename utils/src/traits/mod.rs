pub mod buffer;
pub mod reader;
