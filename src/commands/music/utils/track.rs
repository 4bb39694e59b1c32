//! Defines the `Track` struct, the immutable value the queue and the playback
//! engine pass around, and the conversion from songbird's auxiliary metadata.

use serde::{Deserialize, Serialize};
use songbird::input::AuxMetadata;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Where a track was resolved from, derived from the host of its URL.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TrackSource {
    YouTube,
    SoundCloud,
    Spotify,
    Bandcamp,
    /// Any other http(s) URL.
    Http,
    #[default]
    Unknown,
}

impl TrackSource {
    /// Classifies a URL by its host. Strings that do not parse as URLs are `Unknown`.
    pub fn from_url(url: &str) -> Self {
        let Ok(parsed) = Url::parse(url) else {
            return Self::Unknown;
        };

        let host = parsed.host_str().unwrap_or_default();
        let host = host.strip_prefix("www.").unwrap_or(host);
        let host = host.strip_prefix("m.").unwrap_or(host);

        match host {
            "youtube.com" | "youtu.be" | "music.youtube.com" => Self::YouTube,
            "soundcloud.com" => Self::SoundCloud,
            "open.spotify.com" => Self::Spotify,
            h if h.ends_with(".bandcamp.com") => Self::Bandcamp,
            _ if matches!(parsed.scheme(), "http" | "https") => Self::Http,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for TrackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::YouTube => "YouTube",
            Self::SoundCloud => "SoundCloud",
            Self::Spotify => "Spotify",
            Self::Bandcamp => "Bandcamp",
            Self::Http => "HTTP",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Unified representation of a playable track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    /// The title of the track.
    pub title: String,
    /// The URL the engine plays from, if available.
    pub url: Option<String>,
    /// The duration of the track, if known.
    #[serde(with = "humantime_serde")]
    pub duration: Option<Duration>,
    /// URL to a thumbnail image for the track, if available.
    pub thumbnail: Option<String>,
    pub source: TrackSource,
    /// The name of the user who requested the track.
    pub requested_by: Option<String>,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            title: "Unknown Track".to_string(),
            url: None,
            duration: None,
            thumbnail: None,
            source: TrackSource::Unknown,
            requested_by: None,
        }
    }
}

impl Track {
    /// Creates a track with a title and a URL; the source is derived from the URL.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            title: title.into(),
            source: TrackSource::from_url(&url),
            url: Some(url),
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_requester(mut self, requested_by: impl Into<String>) -> Self {
        self.requested_by = Some(requested_by.into());
        self
    }

    /// Builds a track from the metadata songbird reports for a resolved input.
    pub fn from_aux_metadata(metadata: AuxMetadata, requested_by: impl Into<String>) -> Self {
        let source = metadata
            .source_url
            .as_deref()
            .map(TrackSource::from_url)
            .unwrap_or_default();

        Self {
            title: metadata
                .title
                .or(metadata.track)
                .unwrap_or_else(|| "Unknown Title".to_string()),
            url: metadata.source_url,
            duration: metadata.duration,
            thumbnail: metadata.thumbnail,
            source,
            requested_by: Some(requested_by.into()),
        }
    }

    /// Markdown link used in embeds, falling back to `#` when the URL is unknown.
    pub fn markdown_link(&self) -> String {
        format!("[{}]({})", self.title, self.url.as_deref().unwrap_or("#"))
    }
}
