mod title;
mod url;

pub use self::title::{OEmbedClient, TitleLookup};
pub use self::url::{extract_video_id, normalize_watch_url, resume_url};
