//! Series manifest decoding
//!
//! Series pages embed their episode list as
//! `mac_url=unescape(base64decode('...'))`. The decoded text is a
//! `#`-separated list of `title$videoId` records, percent-encoded, with
//! non-ASCII titles additionally escaped as `%uXXXX`.

use crate::core::media_info::EpisodeRecord;
use crate::error::HkError;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::debug;

const MANIFEST_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a manifest string into its ordered episode list
pub fn decode_manifest(manifest_raw: &str) -> Result<Vec<EpisodeRecord>, HkError> {
    let text = decode_manifest_text(manifest_raw)?;
    let episodes = text
        .split('#')
        .map(parse_episode_token)
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Decoded manifest with {} episodes", episodes.len());
    Ok(episodes)
}

/// Resolve a 1-based episode number against a manifest string
pub fn resolve_episode(manifest_raw: &str, episode: usize) -> Result<EpisodeRecord, HkError> {
    let mut episodes = decode_manifest(manifest_raw)?;
    let available = episodes.len();

    if episode == 0 || episode > available {
        return Err(HkError::EpisodeNotFound { episode, available });
    }

    Ok(episodes.swap_remove(episode - 1))
}

/// Undo the base64, percent and `%u` escaping layers
fn decode_manifest_text(manifest_raw: &str) -> Result<String, HkError> {
    let compact: String = manifest_raw
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = MANIFEST_ENGINE
        .decode(compact.as_bytes())
        .map_err(|e| HkError::Decode(format!("manifest is not valid base64: {}", e)))?;

    let unquoted = urlencoding::decode_binary(&bytes);
    let text = String::from_utf8_lossy(&unquoted);

    expand_unicode_escapes(&text)
}

/// Expand `%uXXXX` and `%uXX` escapes into literal characters
pub fn expand_unicode_escapes(text: &str) -> Result<String, HkError> {
    static UNICODE_ESCAPE_RE: OnceLock<Regex> = OnceLock::new();
    let re = UNICODE_ESCAPE_RE.get_or_init(|| {
        Regex::new(r"%u([a-fA-F0-9]{4}|[a-fA-F0-9]{2})").expect("valid escape regex")
    });

    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;
    let mut pending_high: Option<u32> = None;

    for caps in re.captures_iter(text) {
        let whole = caps.get(0).expect("group 0 always present");
        let unit = code_unit(&caps)?;

        // A high surrogate only pairs with an escape that follows it directly
        if let Some(high) = pending_high.take() {
            if whole.start() != last_end || !(0xDC00..=0xDFFF).contains(&unit) {
                return Err(lone_surrogate(high));
            }
            let combined = 0x10000 + ((high - 0xD800) << 10) + (unit - 0xDC00);
            result.push(char::from_u32(combined).ok_or_else(|| lone_surrogate(high))?);
            last_end = whole.end();
            continue;
        }

        result.push_str(&text[last_end..whole.start()]);
        last_end = whole.end();

        match unit {
            0xD800..=0xDBFF => pending_high = Some(unit),
            0xDC00..=0xDFFF => return Err(lone_surrogate(unit)),
            _ => result.push(char::from_u32(unit).ok_or_else(|| lone_surrogate(unit))?),
        }
    }

    if let Some(high) = pending_high {
        return Err(lone_surrogate(high));
    }

    result.push_str(&text[last_end..]);
    Ok(result)
}

fn code_unit(caps: &Captures<'_>) -> Result<u32, HkError> {
    let hex = &caps[1];
    u32::from_str_radix(hex, 16)
        .map_err(|e| HkError::Decode(format!("bad %u escape '{}': {}", hex, e)))
}

fn lone_surrogate(unit: u32) -> HkError {
    HkError::Decode(format!("unpaired surrogate %u{:04X} in manifest", unit))
}

/// Split a `title$videoId` token on its last `$`
fn parse_episode_token(token: &str) -> Result<EpisodeRecord, HkError> {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    let re = TOKEN_RE.get_or_init(|| Regex::new(r"^(.+)\$(.+)").expect("valid token regex"));

    let caps = re
        .captures(token)
        .ok_or_else(|| HkError::Parse(format!("malformed episode record '{}'", token)))?;

    Ok(EpisodeRecord::new(&caps[1], &caps[2]))
}
