pub mod au_detector;
pub mod config;
pub mod demuxer;
pub mod errors;
pub mod framer;
pub mod metadata;
pub mod unit;

#[cfg(test)]
mod fixtures;
