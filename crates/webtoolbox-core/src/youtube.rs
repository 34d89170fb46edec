//! YouTube link parsing and thumbnail URL construction.
//!
//! Only URLs are built here. The page loads them in `<img>` tags and the
//! browser does the fetching.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::input::InputError;

const THUMBNAIL_HOST: &str = "https://img.youtube.com/vi";

/// Host and path shapes that carry a video ID. The ID itself is exactly 11
/// characters and case-sensitive; scheme and host are not.
static VIDEO_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?i:https?://)?",
        r"(?:(?i:(?:www\.|m\.)?youtube\.com)/(?:watch/?\?(?:[^#]*&)?v=|embed/|shorts/|v/|live/)",
        r"|(?i:youtu\.be)/)",
        r"([A-Za-z0-9_-]{11})",
        r"(?:[?&#/].*)?$",
    ))
    .expect("video URL pattern is valid")
});

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("video ID pattern is valid"));

/// An 11-character YouTube video ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    pub fn parse(id: &str) -> Option<Self> {
        VIDEO_ID.is_match(id).then(|| Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VideoId {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(InputError::InvalidUrl(value))
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pull the video ID out of a share, watch, embed or shorts link.
///
/// # Errors
///
/// Returns `InputError::Empty` for blank input and
/// `InputError::InvalidUrl` for anything that isn't a recognised link.
pub fn extract_video_id(url: &str) -> Result<VideoId, InputError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(InputError::Empty("URL"));
    }
    VIDEO_URL
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|id| VideoId(id.as_str().to_string()))
        .ok_or_else(|| {
            log::warn!("No video ID in {:?}", url);
            InputError::InvalidUrl(url.to_string())
        })
}

/// Thumbnail sizes YouTube publishes for every video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailVariant {
    Default,
    Mq,
    Hq,
    Sd,
    Maxres,
}

impl ThumbnailVariant {
    pub const ALL: [ThumbnailVariant; 5] = [
        ThumbnailVariant::Default,
        ThumbnailVariant::Mq,
        ThumbnailVariant::Hq,
        ThumbnailVariant::Sd,
        ThumbnailVariant::Maxres,
    ];

    /// Prefix before `default.jpg` in the file name.
    fn prefix(self) -> &'static str {
        match self {
            ThumbnailVariant::Default => "",
            ThumbnailVariant::Mq => "mq",
            ThumbnailVariant::Hq => "hq",
            ThumbnailVariant::Sd => "sd",
            ThumbnailVariant::Maxres => "maxres",
        }
    }

    /// Nominal pixel size. `maxres` only exists for HD uploads.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            ThumbnailVariant::Default => (120, 90),
            ThumbnailVariant::Mq => (320, 180),
            ThumbnailVariant::Hq => (480, 360),
            ThumbnailVariant::Sd => (640, 480),
            ThumbnailVariant::Maxres => (1280, 720),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThumbnailVariant::Default => "Default",
            ThumbnailVariant::Mq => "Medium Quality",
            ThumbnailVariant::Hq => "High Quality",
            ThumbnailVariant::Sd => "Standard Definition",
            ThumbnailVariant::Maxres => "Maximum Resolution",
        }
    }

    pub fn url(self, id: &VideoId) -> String {
        format!("{}/{}/{}default.jpg", THUMBNAIL_HOST, id, self.prefix())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub variant: ThumbnailVariant,
    pub label: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// One entry per variant, smallest first.
pub fn thumbnail_urls(id: &VideoId) -> Vec<Thumbnail> {
    ThumbnailVariant::ALL
        .into_iter()
        .map(|variant| {
            let (width, height) = variant.dimensions();
            Thumbnail {
                variant,
                label: variant.label().to_string(),
                url: variant.url(id),
                width,
                height,
            }
        })
        .collect()
}

/// [`extract_video_id`] then [`thumbnail_urls`].
pub fn thumbnails_for_url(url: &str) -> Result<Vec<Thumbnail>, InputError> {
    extract_video_id(url).map(|id| thumbnail_urls(&id))
}
