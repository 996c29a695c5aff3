//! Core functionality for hkget

pub mod extractor;
pub mod media_info;

pub use extractor::*;
pub use media_info::*;
