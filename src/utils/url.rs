//! URL utilities for matching episode page URLs

use crate::error::HkError;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Episode page reference parsed from an input URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeUrl {
    /// `<series>x<group>x<episode>` path component
    pub path_id: String,
    /// 1-based episode number
    pub episode: usize,
}

fn episode_url_regex() -> &'static Regex {
    static EPISODE_URL_RE: OnceLock<Regex> = OnceLock::new();
    EPISODE_URL_RE.get_or_init(|| {
        Regex::new(r"^https?://(?:www\.)?hkanime\.com/animal/(?P<id>[0-9]+x[0-9]+x(?P<episode>[0-9]+))")
            .unwrap()
    })
}

/// Parse an episode page URL such as `https://www.hkanime.com/animal/416x1x1`
pub fn parse_episode_url(url: &str) -> Result<EpisodeUrl, HkError> {
    let parsed = Url::parse(url)?;
    let normalized = format!(
        "{}://{}{}",
        parsed.scheme(),
        parsed.host_str().unwrap_or_default(),
        parsed.path()
    );

    let caps = episode_url_regex()
        .captures(&normalized)
        .ok_or_else(|| HkError::InvalidUrl(format!("not an episode page: {}", url)))?;

    let episode = caps["episode"]
        .parse::<usize>()
        .map_err(|e| HkError::InvalidUrl(format!("bad episode number in {}: {}", url, e)))?;

    Ok(EpisodeUrl {
        path_id: caps["id"].to_string(),
        episode,
    })
}

/// Build the embed player URL for a video ID
pub fn embed_url(embed_base: &str, video_id: &str) -> String {
    format!("{}/{}/", embed_base.trim_end_matches('/'), video_id)
}
