//! Random-access byte sources and the endian-aware cursor over them.

mod cursor;
mod source;

pub use cursor::ByteCursor;
pub use source::{ByteSource, MemorySource};
