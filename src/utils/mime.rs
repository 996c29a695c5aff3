//! MIME type and extension utilities for player sources

use url::Url;

/// Kind of stream a player source points to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Direct progressive file
    Progressive,
    /// HLS playlist
    Hls,
    /// DASH manifest
    Dash,
    /// SMIL document
    Smil,
}

/// Get file extension from a jwplayer `type` value or MIME type
pub fn ext_from_mime(mime_type: &str) -> Option<&'static str> {
    let mime = mime_type.trim().to_lowercase();
    let mime = mime.split(';').next().unwrap_or_default().trim();

    let ext = match mime {
        "video/mp4" | "mp4" => "mp4",
        "video/webm" | "webm" => "webm",
        "video/x-flv" | "flv" => "flv",
        "video/mp2t" | "ts" => "ts",
        "video/x-matroska" | "mkv" => "mkv",
        "audio/mp4" | "m4a" | "aac" => "m4a",
        "audio/mpeg" | "mp3" => "mp3",
        "application/x-mpegurl" | "application/vnd.apple.mpegurl" | "hls" | "m3u8" => "m3u8",
        "application/dash+xml" | "dash" | "mpd" => "mpd",
        "application/smil+xml" | "smil" => "smil",
        "text/vtt" | "vtt" => "vtt",
        "application/x-subrip" | "srt" => "srt",
        _ => return None,
    };
    Some(ext)
}

/// Guess the extension from the last path segment of a URL
pub fn determine_ext(url: &str, default: &str) -> String {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.split(['?', '#']).next().unwrap_or_default().to_string());

    path.rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| default.to_string())
}

/// Classify a source from its declared type, falling back to its URL
pub fn source_kind(declared_type: Option<&str>, url: &str) -> SourceKind {
    let ext = declared_type
        .and_then(ext_from_mime)
        .map(str::to_string)
        .unwrap_or_else(|| determine_ext(url, ""));

    match ext.as_str() {
        "m3u8" => SourceKind::Hls,
        "mpd" => SourceKind::Dash,
        "smil" => SourceKind::Smil,
        _ => SourceKind::Progressive,
    }
}
