use regex::Regex;
use url::Url;

/// Canonicalizes any recognized YouTube link into the watch-URL form used
/// for storage and playback. Returns `None` for anything unrecognized;
/// malformed input never panics or errors.
pub fn normalize_watch_url(input: &str) -> Option<String> {
    let id = extract_video_id(input)?;
    Some(format!("https://www.youtube.com/watch?v={}", id))
}

/// Extracts the video identifier from the three recognized link shapes:
/// `youtu.be/<id>`, `youtube.com/watch?v=<id>`, and `youtube.com/embed/<id>`.
pub fn extract_video_id(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    let host = url.host_str()?;

    let id = match host {
        "youtu.be" => {
            let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
            match segments.as_slice() {
                [id] => (*id).to_string(),
                _ => return None,
            }
        }
        "www.youtube.com" | "youtube.com" | "m.youtube.com" => {
            if url.path() == "/watch" {
                url.query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned())?
            } else {
                let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
                match segments.as_slice() {
                    ["embed", id] => (*id).to_string(),
                    _ => return None,
                }
            }
        }
        _ => return None,
    };

    if !is_valid_video_id(&id) {
        return None;
    }
    Some(id)
}

/// Watch-URL with a start offset, so playback resumes where the user left off.
pub fn resume_url(watch_url: &str, progress_seconds: u32) -> String {
    if progress_seconds == 0 {
        return watch_url.to_string();
    }
    format!("{}&t={}s", watch_url, progress_seconds)
}

fn is_valid_video_id(id: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9_-]{6,64}$")
        .map(|re| re.is_match(id))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "https://www.youtube.com/watch?v=abc123";

    #[test]
    fn test_normalizes_short_link() {
        assert_eq!(
            normalize_watch_url("https://youtu.be/abc123").as_deref(),
            Some(CANONICAL)
        );
    }

    #[test]
    fn test_normalizes_watch_link() {
        assert_eq!(
            normalize_watch_url("https://www.youtube.com/watch?v=abc123").as_deref(),
            Some(CANONICAL)
        );
        // Extra query parameters don't matter
        assert_eq!(
            normalize_watch_url("https://www.youtube.com/watch?v=abc123&t=120s&list=PL1").as_deref(),
            Some(CANONICAL)
        );
    }

    #[test]
    fn test_normalizes_embed_link() {
        assert_eq!(
            normalize_watch_url("https://www.youtube.com/embed/abc123").as_deref(),
            Some(CANONICAL)
        );
    }

    #[test]
    fn test_accepts_host_variants() {
        assert_eq!(
            normalize_watch_url("https://youtube.com/watch?v=abc123").as_deref(),
            Some(CANONICAL)
        );
        assert_eq!(
            normalize_watch_url("https://m.youtube.com/watch?v=abc123").as_deref(),
            Some(CANONICAL)
        );
    }

    #[test]
    fn test_rejects_unrecognized_shapes() {
        assert_eq!(normalize_watch_url("https://example.com/video"), None);
        assert_eq!(normalize_watch_url("https://www.youtube.com/watch"), None);
        assert_eq!(normalize_watch_url("https://www.youtube.com/playlist?list=PL1"), None);
        assert_eq!(normalize_watch_url("https://youtu.be/abc123/extra"), None);
        assert_eq!(normalize_watch_url("not a url"), None);
        assert_eq!(normalize_watch_url(""), None);
    }

    #[test]
    fn test_rejects_bad_identifiers() {
        // Too short and wrong charset respectively
        assert_eq!(normalize_watch_url("https://youtu.be/ab"), None);
        assert_eq!(normalize_watch_url("https://youtu.be/abc%20123"), None);
    }

    #[test]
    fn test_resume_url() {
        assert_eq!(resume_url(CANONICAL, 0), CANONICAL);
        assert_eq!(
            resume_url(CANONICAL, 42),
            "https://www.youtube.com/watch?v=abc123&t=42s"
        );
    }
}
