// crates/serve/src/video.rs

//! External video URL → platform id.
//!
//! Recognized:
//!   - `youtube.com/watch?v=ID` (any parameter order), `/embed/ID`, `/shorts/ID`, `/live/ID`
//!   - `youtu.be/ID`
//!   - `vimeo.com/DIGITS`, `vimeo.com/video/DIGITS`, `player.vimeo.com/video/DIGITS`
//!
//! Anything else yields `None`, and the record carrying it is dropped.

use domain::item::{VideoPlatform, VideoRef};
use regex::Regex;
use std::sync::LazyLock;

static YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:https?://)?(?:www\.|m\.)?(?:youtube(?:-nocookie)?\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/|live/|v/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[?&#/].*)?$",
    )
    .unwrap()
});

static VIMEO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:https?://)?(?:www\.|player\.)?vimeo\.com/(?:video/)?(\d+)(?:[?#/].*)?$",
    )
    .unwrap()
});

pub fn parse_video_url(url: &str) -> Option<VideoRef> {
    let url = url.trim();

    if let Some(caps) = YOUTUBE.captures(url) {
        return Some(VideoRef {
            platform: VideoPlatform::Youtube,
            id: caps[1].to_owned(),
        });
    }

    VIMEO.captures(url).map(|caps| VideoRef {
        platform: VideoPlatform::Vimeo,
        id: caps[1].to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yt(id: &str) -> Option<VideoRef> {
        Some(VideoRef {
            platform: VideoPlatform::Youtube,
            id: id.into(),
        })
    }

    fn vimeo(id: &str) -> Option<VideoRef> {
        Some(VideoRef {
            platform: VideoPlatform::Vimeo,
            id: id.into(),
        })
    }

    #[test]
    fn youtube_forms() {
        let id = "dQw4w9WgXcQ";
        assert_eq!(parse_video_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), yt(id));
        assert_eq!(
            parse_video_url("https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42"),
            yt(id)
        );
        assert_eq!(parse_video_url("https://youtu.be/dQw4w9WgXcQ?si=abc"), yt(id));
        assert_eq!(parse_video_url("https://www.youtube.com/embed/dQw4w9WgXcQ"), yt(id));
        assert_eq!(parse_video_url("https://m.youtube.com/shorts/dQw4w9WgXcQ"), yt(id));
        assert_eq!(parse_video_url("  youtu.be/dQw4w9WgXcQ  "), yt(id));
    }

    #[test]
    fn vimeo_forms() {
        assert_eq!(parse_video_url("https://vimeo.com/76979871"), vimeo("76979871"));
        assert_eq!(
            parse_video_url("https://player.vimeo.com/video/76979871?h=abc"),
            vimeo("76979871")
        );
    }

    #[test]
    fn unparseable_urls() {
        assert_eq!(parse_video_url(""), None);
        assert_eq!(parse_video_url("https://example.com/video.mp4"), None);
        assert_eq!(parse_video_url("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(parse_video_url("https://vimeo.com/channels/staff"), None);
    }
}
