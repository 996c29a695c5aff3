//! Terminal output formatting

use crate::cli::args::VerbosityLevel;
use crate::core::{EpisodeRecord, Format, MediaInfo};
use crate::error::HkError;
use std::time::Duration;

/// Output formatter for hkget
pub struct OutputFormatter {
    verbosity: VerbosityLevel,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self { verbosity }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        eprintln!("❌ {}", message);
    }

    /// Print media summary followed by its formats
    pub fn print_media_info(&self, info: &MediaInfo) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }

        println!("📹 {}", info.title);
        println!("🆔 {}", info.id);
        if let Some(duration) = info.duration {
            println!("⏱️  {}", format_duration(Duration::try_from_secs_f64(duration).unwrap_or_default()));
        }
        if let Some(thumbnail) = &info.thumbnail {
            println!("🖼️  {}", thumbnail);
        }
        if !info.subtitles.is_empty() {
            let languages: Vec<&str> = info.subtitles.keys().map(String::as_str).collect();
            println!("💬 {}", languages.join(", "));
        }
        println!("📊 {} formats available", info.formats.len());
        println!();

        self.print_formats(&info.formats);
    }

    /// Print one line per format
    pub fn print_formats(&self, formats: &[Format]) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }

        for format in formats {
            println!("{}", format_line(format));
            if self.verbosity == VerbosityLevel::Verbose {
                for (name, value) in &format.http_headers {
                    println!("      {}: {}", name, value);
                }
            }
        }
    }

    /// Print stream URLs, one per line, regardless of verbosity
    pub fn print_urls(&self, info: &MediaInfo) {
        for format in &info.formats {
            println!("{}", format.url);
        }
    }

    /// Print the media descriptor as pretty JSON
    pub fn print_json(&self, info: &MediaInfo) -> Result<(), HkError> {
        println!("{}", serde_json::to_string_pretty(info)?);
        Ok(())
    }

    /// Print the episode list, marking `current` (1-based) if given
    pub fn print_episode_list(&self, episodes: &[EpisodeRecord], current: Option<usize>) {
        if self.verbosity != VerbosityLevel::Quiet {
            println!("📺 {} episodes", episodes.len());
        }
        for (index, episode) in episodes.iter().enumerate() {
            println!("{}", episode_line(index, episode, current));
        }
    }

    /// Print help text
    pub fn print_help(&self) {
        println!("hkget - HKAnime stream extractor");
        println!();
        println!("Usage: hkget [OPTIONS] <URL>");
        println!();
        println!("Examples:");
        println!("  hkget https://www.hkanime.com/animal/416x1x1");
        println!("  hkget --episode 3 -g https://www.hkanime.com/animal/416x1x1");
        println!("  hkget --list-episodes https://www.hkanime.com/animal/416x1x1");
        println!();
        println!("For more information, run: hkget --help");
    }
}

/// Render a format as `<id>  <ext>  <quality>  <protocol>`
fn format_line(format: &Format) -> String {
    format!(
        "  {:<12} {:<5} {:<10} {}",
        format.format_id,
        format.ext,
        format.quality_string(),
        format.protocol
    )
}

fn episode_line(index: usize, episode: &EpisodeRecord, current: Option<usize>) -> String {
    let marker = if current == Some(index + 1) { "▶" } else { " " };
    format!(
        "{} {:>3}. {} [{}]",
        marker,
        index + 1,
        episode.title,
        episode.video_id
    )
}

/// Format duration as human-readable string
fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    if total_seconds < 60 {
        format!("{}s", total_seconds)
    } else if total_seconds < 3600 {
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        if seconds == 0 {
            format!("{}m", minutes)
        } else {
            format!("{}m {}s", minutes, seconds)
        }
    } else {
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        if minutes == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, minutes)
        }
    }
}
