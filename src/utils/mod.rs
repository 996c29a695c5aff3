//! Utility functions for hkget

pub mod html;
pub mod js;
pub mod mime;
pub mod url;

pub use html::*;
pub use js::*;
pub use mime::*;
pub use url::*;
