//! Opportunistic field extraction from item text
//!
//! Each field is looked up with an ordered list of patterns; the first one
//! that matches wins. A field that matches nothing is simply absent.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Platforms recognised by name in listing text
pub const PLATFORMS: &[&str] = &["SoundCloud", "Mixcloud", "YouTube", "Spotify", "Apple Podcasts"];

/// (host suffix, platform name) for stream links
const PLATFORM_HOSTS: &[(&str, &str)] = &[
    ("soundcloud.com", "SoundCloud"),
    ("mixcloud.com", "Mixcloud"),
    ("youtube.com", "YouTube"),
    ("youtu.be", "YouTube"),
    ("spotify.com", "Spotify"),
    ("podcasts.apple.com", "Apple Podcasts"),
];

const DOWNLOAD_EXTENSIONS: &[&str] = &[".mp3", ".m4a", ".aac", ".flac", ".wav", ".ogg", ".zip"];

// Bracketed times are tracklist cues, not the mix length
static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\[\d:])(\d{1,2}:\d{2}:\d{2})(?:$|[^\]\d:])")
        .expect("hardcoded regex pattern is valid")
});

static SIZE_WITH_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(MB|GB)\b").expect("hardcoded regex pattern is valid")
});

static SIZE_BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\d.:])(\d+\.\d+)(?:$|[^\d.:])").expect("hardcoded regex pattern is valid")
});

static BITRATE_WITH_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{2,4})\s*kbps\b").expect("hardcoded regex pattern is valid")
});

static BITRATE_BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\d.:\[?])(\d{3})(?:$|[^\d.:\]?])").expect("hardcoded regex pattern is valid")
});

static URL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/w/(\d{4}-\d{2}-\d{2})_").expect("hardcoded regex pattern is valid")
});

static ANY_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("hardcoded regex pattern is valid")
});

static LEADING_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}\s*(?:-\s*)?").expect("hardcoded regex pattern is valid")
});

/// Mix length, `H:MM:SS` or `HH:MM:SS`
pub fn extract_duration(text: &str) -> Option<String> {
    DURATION
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// File size, preferring an explicit unit over a bare decimal (assumed MB)
pub fn extract_file_size(text: &str) -> Option<String> {
    if let Some(caps) = SIZE_WITH_UNIT.captures(text) {
        return Some(format!("{} {}", &caps[1], caps[2].to_uppercase()));
    }
    SIZE_BARE
        .captures(text)
        .map(|caps| format!("{} MB", &caps[1]))
}

/// Bitrate, preferring an explicit `kbps` over a bare three-digit number
pub fn extract_bitrate(text: &str) -> Option<String> {
    if let Some(caps) = BITRATE_WITH_UNIT.captures(text) {
        return Some(format!("{} kbps", &caps[1]));
    }
    BITRATE_BARE
        .captures(text)
        .map(|caps| format!("{} kbps", &caps[1]))
}

/// Platforms mentioned by name, in [`PLATFORMS`] order
pub fn extract_platforms(text: &str) -> Vec<String> {
    PLATFORMS
        .iter()
        .filter(|platform| text.contains(*platform))
        .map(|platform| platform.to_string())
        .collect()
}

/// `YYYY-MM-DD` from the detail URL slug, else from the title
pub fn extract_date(url: &str, title: &str) -> Option<String> {
    URL_DATE
        .captures(url)
        .or_else(|| ANY_DATE.captures(title))
        .map(|caps| caps[1].to_string())
}

/// Creator name from a listing title such as `2024-03-01 - Ben Klock @ Berghain`
///
/// The leading date is dropped, then the name runs up to the first ` - ` or
/// ` @ `.
pub fn extract_creator(title: &str) -> Option<String> {
    let rest = LEADING_DATE.replace(title.trim(), "");
    let name = [" - ", " @ "]
        .iter()
        .filter_map(|sep| rest.find(sep))
        .min()
        .map(|idx| &rest[..idx])
        .unwrap_or(rest.as_ref())
        .trim();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// How a link found near an item relates to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Hosted on a streaming platform
    Stream(&'static str),
    /// Points straight at an audio file or archive
    Download,
    Other,
}

/// Classifies an absolute link by host and file extension
pub fn classify_link(href: &str) -> LinkKind {
    let Ok(url) = Url::parse(href) else {
        return LinkKind::Other;
    };
    if url.scheme() != "http" && url.scheme() != "https" {
        return LinkKind::Other;
    }

    let host = url.host_str().unwrap_or("").to_ascii_lowercase();
    for (suffix, platform) in PLATFORM_HOSTS {
        if host == *suffix || host.ends_with(&format!(".{}", suffix)) {
            return LinkKind::Stream(*platform);
        }
    }

    let path = url.path().to_ascii_lowercase();
    if DOWNLOAD_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return LinkKind::Download;
    }

    LinkKind::Other
}
