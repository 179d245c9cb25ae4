use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Knobs for a scene search. Everything defaults to the server's behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Restrict matches to a single AniList entry.
    pub anilist_id: Option<u64>,
    /// Ask the server to crop letterboxing before matching.
    pub cut_black_borders: bool,
    /// Return each match's AniList entry as an [`AnilistInfo`] object
    /// instead of a bare ID.
    pub include_anilist_info: bool,
}

/// Result of `search_by_url` / `search_by_file`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    /// Number of frames the server compared against.
    pub frame_count: u64,
    /// Empty unless the server reported a soft error.
    pub error: String,
    /// Best match first, in the order the server ranked them.
    pub results: Vec<MatchResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub anilist: Anilist,
    /// Source file the matching frame was taken from.
    pub filename: String,
    pub episode: Option<Episode>,
    /// Start of the matching scene, in seconds.
    pub from: f64,
    /// End of the matching scene, in seconds.
    pub to: f64,
    /// 0.0 to 1.0.
    pub similarity: f64,
    /// Preview clip URL, already carrying its access token.
    pub video_url: String,
    /// Preview frame URL, already carrying its access token.
    pub image_url: String,
}

impl MatchResult {
    /// AniList ID of the match, whichever shape `anilist` has.
    pub fn anilist_id(&self) -> u64 {
        self.anilist.id()
    }
}

/// The AniList entry of a match: a bare ID, or the full object when
/// [`SearchOptions::include_anilist_info`] was set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Anilist {
    Id(u64),
    Info(Box<AnilistInfo>),
}

impl Anilist {
    pub fn id(&self) -> u64 {
        match self {
            Anilist::Id(id) => *id,
            Anilist::Info(info) => info.id,
        }
    }

    pub fn info(&self) -> Option<&AnilistInfo> {
        match self {
            Anilist::Id(_) => None,
            Anilist::Info(info) => Some(info),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnilistInfo {
    pub id: u64,

    /// MyAnimeList ID, when AniList knows one.
    #[serde(default, rename = "idMal")]
    pub id_mal: Option<u64>,

    #[serde(default)]
    pub title: AnilistTitle,

    #[serde(default)]
    pub synonyms: Vec<String>,

    #[serde(default, rename = "isAdult")]
    pub is_adult: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnilistTitle {
    #[serde(default)]
    pub native: Option<String>,
    #[serde(default)]
    pub romaji: Option<String>,
    #[serde(default)]
    pub english: Option<String>,
}

/// Episode of a match, as guessed by the server from the file name.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Episode {
    Number(f64),
    /// e.g. "OVA" or "1-2".
    Text(String),
    /// Files spanning several episodes.
    List(Vec<f64>),
}

/// Search quota for the current caller, from `GET /me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiLimits {
    /// Key identity; empty for anonymous callers.
    pub id: String,
    /// Total searches allowed this month.
    pub limit: u64,
    pub remaining: u64,
    pub quota_used: u64,
    pub priority: u32,
    /// Searches allowed in flight at once.
    pub concurrency: u32,
}

/// Preview size requested from the media server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaSize {
    Large,
    Medium,
    Small,
}

impl MediaSize {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaSize::Large => "large",
            MediaSize::Medium => "medium",
            MediaSize::Small => "small",
        }
    }
}

impl fmt::Display for MediaSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how to save a preview.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaDownloadOptions {
    /// Default: server's choice.
    pub size: Option<MediaSize>,
    /// Strip audio. Ignored for images.
    pub mute: bool,
    /// Must already exist. Default: current directory.
    pub directory: Option<PathBuf>,
    /// File stem without extension. Default: `<anilistId>_<from>`.
    pub name: Option<String>,
}

/// What a download was asked to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    /// Extension of the written file.
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Video => "mp4",
            MediaKind::Image => "jpg",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => f.write_str("video"),
            MediaKind::Image => f.write_str("image"),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire shapes (not part of the public API surface)
// ---------------------------------------------------------------------------

/// GET|POST /search response.
#[derive(Debug, Deserialize)]
pub(crate) struct RawSearchResponse {
    #[serde(default, rename = "frameCount")]
    pub frame_count: u64,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub result: Vec<RawSearchResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSearchResult {
    pub anilist: Anilist,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub episode: Option<Episode>,
    pub from: f64,
    pub to: f64,
    pub similarity: f64,
    #[serde(default)]
    pub video: String,
    #[serde(default)]
    pub image: String,
}

/// GET /me response.
#[derive(Debug, Deserialize)]
pub(crate) struct RawApiLimits {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub concurrency: u32,
    #[serde(default)]
    pub quota: u64,
    #[serde(default, rename = "quotaUsed")]
    pub quota_used: u64,
}
