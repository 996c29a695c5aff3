//! jwplayer options to media descriptor conversion

use crate::core::media_info::{Format, MediaInfo, Subtitle};
use crate::error::HkError;
use crate::utils::mime::{determine_ext, ext_from_mime, source_kind, SourceKind};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, warn};
use url::Url;

#[derive(Deserialize, Debug)]
struct Source {
    #[serde(alias = "url")]
    file: Option<String>,
    #[serde(rename = "type")]
    kind: Option<Value>,
    label: Option<Value>,
    height: Option<Value>,
    width: Option<Value>,
}

#[derive(Deserialize, Debug)]
struct Track {
    file: Option<String>,
    kind: Option<Value>,
    label: Option<Value>,
}

/// Player configs write labels both as `"720p"` and as bare `720`
fn str_or_none(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Convert a jwplayer options object into a [`MediaInfo`]
///
/// Accepts the flattened forms jwplayer still understands: a `playlist`
/// array or object, an item with a `sources` list, or a bare item whose
/// own `file` is the only source. Only the first playlist item is used.
pub fn parse_jwplayer_data(
    config: &Value,
    video_id: &str,
    title: &str,
    base_url: Option<&str>,
) -> Result<MediaInfo, HkError> {
    let item = match config.get("playlist") {
        Some(Value::Array(items)) => {
            if items.len() > 1 {
                debug!("Player playlist has {} items, using the first", items.len());
            }
            items
                .first()
                .ok_or_else(|| HkError::NotFound("playlist item".to_string()))?
        }
        Some(item @ Value::Object(_)) => item,
        _ => config,
    };

    let sources: Vec<&Value> = match item.get("sources") {
        Some(Value::Array(sources)) => sources.iter().collect(),
        _ => vec![item],
    };

    let mut info = MediaInfo::new(video_id.to_string(), title.to_string());
    info.formats = parse_formats(&sources, base_url);
    if info.formats.is_empty() {
        return Err(HkError::NotFound("formats".to_string()));
    }
    info.ext = info.formats[0].ext.clone();

    info.thumbnail = item
        .get("image")
        .and_then(Value::as_str)
        .and_then(|image| resolve_url(base_url, image));
    info.description = item
        .get("description")
        .and_then(Value::as_str)
        .map(crate::utils::html::clean_html)
        .filter(|d| !d.is_empty());
    info.duration = config
        .get("duration")
        .and_then(float_or_none)
        .or_else(|| item.get("duration").and_then(float_or_none));

    if let Some(Value::Array(tracks)) = item.get("tracks") {
        for track in tracks {
            let Ok(track) = serde_json::from_value::<Track>(track.clone()) else {
                continue;
            };
            let is_caption = str_or_none(track.kind.as_ref()).map_or(false, |kind| {
                matches!(
                    kind.to_lowercase().as_str(),
                    "captions" | "caption" | "subtitles" | "subtitle"
                )
            });
            let Some(url) = track
                .file
                .as_deref()
                .filter(|_| is_caption)
                .and_then(|file| resolve_url(base_url, file))
            else {
                continue;
            };

            let ext = determine_ext(&url, "vtt");
            info.subtitles
                .entry(str_or_none(track.label.as_ref()).unwrap_or_else(|| "en".to_string()))
                .or_default()
                .push(Subtitle { url, ext });
        }
    }

    Ok(info)
}

fn parse_formats(sources: &[&Value], base_url: Option<&str>) -> Vec<Format> {
    let mut formats: Vec<Format> = Vec::new();

    for (index, source) in sources.iter().enumerate() {
        let Ok(source) = serde_json::from_value::<Source>((*source).clone()) else {
            continue;
        };
        let Some(url) = source
            .file
            .as_deref()
            .and_then(|file| resolve_url(base_url, file))
        else {
            continue;
        };
        if formats.iter().any(|f| f.url == url) {
            continue;
        }

        let kind = str_or_none(source.kind.as_ref());
        let declared = kind.as_deref();
        let label = str_or_none(source.label.as_ref());
        let format_id = label.clone().unwrap_or_else(|| index.to_string());

        match source_kind(declared, &url) {
            SourceKind::Hls => {
                let mut format = Format::new(format!("hls-{}", format_id), url, "mp4".to_string());
                format.protocol = "m3u8_native".to_string();
                format.format_note = label;
                formats.push(format);
            }
            SourceKind::Dash | SourceKind::Smil => {
                warn!("Skipping unsupported manifest source {}", url);
            }
            SourceKind::Progressive => {
                let ext = declared
                    .and_then(ext_from_mime)
                    .map(str::to_string)
                    .unwrap_or_else(|| determine_ext(&url, "mp4"));
                let height = source
                    .height
                    .as_ref()
                    .and_then(int_or_none)
                    .or_else(|| label.as_deref().and_then(height_from_label));

                let mut format = Format::new(format_id, url, ext);
                format.height = height;
                format.width = source.width.as_ref().and_then(int_or_none);
                format.format_note = label;
                formats.push(format);
            }
        }
    }

    formats
}

/// Join a possibly relative or protocol-relative URL against the page URL
fn resolve_url(base_url: Option<&str>, url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if let Some(rest) = url.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }
    if let Ok(absolute) = Url::parse(url) {
        return Some(absolute.to_string());
    }

    base_url
        .and_then(|base| Url::parse(base).ok())
        .and_then(|base| base.join(url).ok())
        .map(|joined| joined.to_string())
}

/// Read a height out of labels such as `720p` or `1080P HD`
fn height_from_label(label: &str) -> Option<u32> {
    static HEIGHT_RE: OnceLock<Regex> = OnceLock::new();
    HEIGHT_RE
        .get_or_init(|| Regex::new(r"^(\d{3,4})[pP]?(?:\b|$)").unwrap())
        .captures(label.trim())
        .and_then(|caps| caps[1].parse().ok())
}

fn int_or_none(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn float_or_none(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
