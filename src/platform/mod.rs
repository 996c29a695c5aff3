//! HKAnime site decoding and page fetching

pub mod cipher;
pub mod client;
pub mod jwplayer;
pub mod manifest;
pub mod retry;

pub use cipher::*;
pub use client::*;
pub use jwplayer::*;
pub use manifest::*;
pub use retry::*;
