//! Utility functions for filename handling and video id extraction

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Bare video ids are exactly 11 URL-safe base64 characters
#[allow(clippy::unwrap_used)] // the pattern is a literal and always compiles
fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").unwrap())
}

#[allow(clippy::unwrap_used)] // the pattern is a literal and always compiles
fn unsafe_char_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w.\-]").unwrap())
}

/// Replace filesystem-unfriendly characters in a title with underscores
///
/// Anything outside `[\w.\-]` becomes a single `_`, preserving the
/// character count of the original title.
pub fn sanitize_filename(title: &str) -> String {
    unsafe_char_regex().replace_all(title, "_").into_owned()
}

/// Normalize a client-supplied video reference into a bare video id
///
/// Accepts either the 11-character id itself or any of the common URL
/// forms (`watch?v=`, `youtu.be/`, `/shorts/`, `/embed/`, `/v/`,
/// `/live/`). Returns [`Error::InvalidVideoId`] for anything else.
pub fn parse_video_id(input: &str) -> Result<String> {
    let input = input.trim();

    if video_id_regex().is_match(input) {
        return Ok(input.to_string());
    }

    let url = Url::parse(input).map_err(|_| Error::InvalidVideoId(input.to_string()))?;

    let host = url
        .host_str()
        .map(|h| h.trim_start_matches("www.").trim_start_matches("m."))
        .unwrap_or("");

    let candidate = match host {
        "youtu.be" => url.path_segments().and_then(|mut s| s.next()).map(str::to_string),
        "youtube.com" | "music.youtube.com" => {
            if url.path() == "/watch" {
                url.query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned())
            } else {
                let mut segments = url.path_segments().into_iter().flatten();
                match segments.next() {
                    Some("shorts") | Some("embed") | Some("v") | Some("live") => {
                        segments.next().map(str::to_string)
                    }
                    _ => None,
                }
            }
        }
        _ => None,
    };

    match candidate {
        Some(id) if video_id_regex().is_match(&id) => Ok(id),
        _ => Err(Error::InvalidVideoId(input.to_string())),
    }
}
