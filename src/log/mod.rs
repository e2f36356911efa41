//! Reading and decoding WMP samples from system logs.

pub mod decode;
pub mod record;
pub mod source;

pub use decode::Decoder;
pub use record::{Entry, Record};
pub use source::LogSource;
