use crate::models::{
    Anilist, ApiLimits, MatchResult, RawApiLimits, RawSearchResponse, RawSearchResult,
    SearchOptions, SearchResponse,
};

/// Reshape a `/search` payload into a [`SearchResponse`].
///
/// The server already inlines AniList objects when the request carried
/// `anilistInfo`; without that flag every identifier is reduced to its
/// numeric ID, whatever shape arrived.
pub(crate) fn map_search_response(
    raw: RawSearchResponse,
    options: &SearchOptions,
) -> SearchResponse {
    let results = raw
        .result
        .into_iter()
        .map(|r| map_match(r, options.include_anilist_info))
        .collect();

    SearchResponse {
        frame_count: raw.frame_count,
        error: raw.error,
        results,
    }
}

fn map_match(raw: RawSearchResult, include_anilist_info: bool) -> MatchResult {
    let anilist = if include_anilist_info {
        raw.anilist
    } else {
        Anilist::Id(raw.anilist.id())
    };

    MatchResult {
        anilist,
        filename: raw.filename,
        episode: raw.episode,
        from: raw.from,
        to: raw.to,
        similarity: raw.similarity,
        video_url: raw.video,
        image_url: raw.image,
    }
}

/// Type the `/me` payload. Anonymous callers get an empty `id`; the server
/// reports their address there.
pub(crate) fn map_api_limits(raw: RawApiLimits, key_used: bool) -> ApiLimits {
    ApiLimits {
        id: if key_used { raw.id } else { String::new() },
        limit: raw.quota,
        remaining: raw.quota.saturating_sub(raw.quota_used),
        quota_used: raw.quota_used,
        priority: raw.priority,
        concurrency: raw.concurrency,
    }
}
