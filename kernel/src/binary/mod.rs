//! Binary module format: LEB128 coding, the module model, and the
//! decode/encode/text boundaries.
//!
//! This is the foundational layer. No other kernel module is imported here.

pub mod builder;
pub mod decode;
pub mod encode;
pub mod leb128;
pub mod module;
pub mod wat;
