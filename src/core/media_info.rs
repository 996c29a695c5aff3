//! Media descriptor structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extracted media descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Site video ID
    pub id: String,
    /// Display title
    pub title: String,
    /// Extension of the preferred format
    pub ext: String,
    /// Playable formats
    pub formats: Vec<Format>,
    /// Thumbnail URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Description from the player configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Subtitles keyed by language label
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub subtitles: BTreeMap<String, Vec<Subtitle>>,
}

impl MediaInfo {
    /// Create a new MediaInfo
    pub fn new(id: String, title: String) -> Self {
        Self {
            id,
            title,
            ext: "mp4".to_string(),
            formats: Vec::new(),
            thumbnail: None,
            description: None,
            duration: None,
            subtitles: BTreeMap::new(),
        }
    }

    /// Set the same request headers on every format
    pub fn attach_http_headers(&mut self, headers: &BTreeMap<String, String>) {
        for format in &mut self.formats {
            for (name, value) in headers {
                format.http_headers.insert(name.clone(), value.clone());
            }
        }
    }
}

/// Single playable stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Format {
    /// Format identifier
    pub format_id: String,
    /// Stream URL
    pub url: String,
    /// File extension
    pub ext: String,
    /// Transfer protocol (https, m3u8_native)
    pub protocol: String,
    /// Video height
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Video width
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Label shown by the player
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_note: Option<String>,
    /// Headers the origin requires for this stream
    pub http_headers: BTreeMap<String, String>,
}

impl Format {
    /// Create a new Format
    pub fn new(format_id: String, url: String, ext: String) -> Self {
        Self {
            format_id,
            url,
            ext,
            protocol: "https".to_string(),
            height: None,
            width: None,
            format_note: None,
            http_headers: BTreeMap::new(),
        }
    }

    /// Check if format is an HLS playlist
    pub fn is_hls(&self) -> bool {
        self.protocol.starts_with("m3u8")
    }

    /// Get human-readable quality string
    pub fn quality_string(&self) -> String {
        if let Some(note) = &self.format_note {
            note.clone()
        } else if let (Some(width), Some(height)) = (self.width, self.height) {
            format!("{}x{}", width, height)
        } else if let Some(height) = self.height {
            format!("{}p", height)
        } else {
            "Unknown".to_string()
        }
    }
}

/// Subtitle track
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subtitle {
    /// Subtitle file URL
    pub url: String,
    /// Subtitle extension
    pub ext: String,
}

/// Episode entry recovered from a series manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Episode title
    pub title: String,
    /// Embed player video ID
    pub video_id: String,
}

impl EpisodeRecord {
    /// Create a new EpisodeRecord
    pub fn new(title: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            video_id: video_id.into(),
        }
    }
}
