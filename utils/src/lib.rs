pub mod bytes;
pub mod traits;
