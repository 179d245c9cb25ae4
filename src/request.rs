use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use url::Url;

use crate::errors::Result;
use crate::models::SearchOptions;

pub(crate) const SEARCH_PATH: &str = "/search";
pub(crate) const ME_PATH: &str = "/me";

/// Header carrying the API key.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-trace-key");

/// The service takes raw media bytes under this content type.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The media a search is run against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// A publicly reachable image or video URL; the server fetches it.
    Url(String),
    /// Media content uploaded in the request body.
    Bytes(Vec<u8>),
}

/// A fully built HTTP request, ready to hand to the transport.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// Build a `/search` request.
///
/// A [`MediaSource::Url`] becomes `GET /search?url=...`; a
/// [`MediaSource::Bytes`] becomes a `POST` whose body is the media itself.
/// Option flags go into the query string in both modes.
pub fn build_search_request(
    base_url: &str,
    api_key: Option<&str>,
    source: MediaSource,
    options: &SearchOptions,
) -> Result<RequestDescriptor> {
    let mut url = endpoint_url(base_url, SEARCH_PATH)?;
    let mut headers = auth_headers(api_key)?;

    let (method, media_url, body) = match source {
        MediaSource::Url(media_url) => (Method::GET, Some(media_url), None),
        MediaSource::Bytes(bytes) => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
            (Method::POST, None, Some(bytes))
        }
    };

    let mut query_parts: Vec<(&str, Option<String>)> = Vec::new();

    if let Some(m) = media_url {
        query_parts.push(("url", Some(m)));
    }
    if let Some(id) = options.anilist_id {
        query_parts.push(("anilistID", Some(id.to_string())));
    }
    if options.cut_black_borders {
        query_parts.push(("cutBorders", None));
    }
    if options.include_anilist_info {
        query_parts.push(("anilistInfo", None));
    }

    // Calling query_pairs_mut at all leaves a dangling `?`.
    if !query_parts.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &query_parts {
            match value {
                Some(v) => pairs.append_pair(key, v),
                None => pairs.append_key_only(key),
            };
        }
    }

    Ok(RequestDescriptor {
        method,
        url,
        headers,
        body,
    })
}

/// Build the `GET /me` quota request.
pub fn build_limits_request(base_url: &str, api_key: Option<&str>) -> Result<RequestDescriptor> {
    Ok(RequestDescriptor {
        method: Method::GET,
        url: endpoint_url(base_url, ME_PATH)?,
        headers: auth_headers(api_key)?,
        body: None,
    })
}

fn endpoint_url(base_url: &str, path: &str) -> Result<Url> {
    Ok(Url::parse(&format!("{base_url}{path}"))?)
}

fn auth_headers(api_key: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(key) = api_key {
        let mut value = HeaderValue::from_str(key)?;
        value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TraceMoeError;

    const BASE: &str = "https://api.trace.moe";
    const MEDIA: &str = "https://images.plurk.com/32B15UXxymfSMwKGTObY5e.jpg";

    fn query_keys(req: &RequestDescriptor) -> Vec<String> {
        req.url.query_pairs().map(|(k, _)| k.into_owned()).collect()
    }

    #[test]
    fn url_source_is_get_with_url_param() {
        let req = build_search_request(
            BASE,
            None,
            MediaSource::Url(MEDIA.into()),
            &SearchOptions::default(),
        )
        .unwrap();

        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.path(), "/search");
        assert!(req.body.is_none());
        let pairs: Vec<_> = req.url.query_pairs().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "url");
        assert_eq!(pairs[0].1, MEDIA);
    }

    #[test]
    fn bytes_source_is_form_post_without_url_param() {
        let bytes = vec![8, 6, 7, 5, 3, 0, 9];
        let req = build_search_request(
            BASE,
            None,
            MediaSource::Bytes(bytes.clone()),
            &SearchOptions::default(),
        )
        .unwrap();

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.body, Some(bytes));
        assert_eq!(req.url.as_str(), "https://api.trace.moe/search");
        assert_eq!(
            req.headers.get(CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn options_map_to_exact_query_params() {
        let all = SearchOptions {
            anilist_id: Some(21034),
            cut_black_borders: true,
            include_anilist_info: true,
        };

        let get = build_search_request(BASE, None, MediaSource::Url(MEDIA.into()), &all).unwrap();
        assert_eq!(query_keys(&get), ["url", "anilistID", "cutBorders", "anilistInfo"]);
        assert!(get.url.query().unwrap().contains("anilistID=21034"));

        let post = build_search_request(BASE, None, MediaSource::Bytes(vec![1]), &all).unwrap();
        assert_eq!(query_keys(&post), ["anilistID", "cutBorders", "anilistInfo"]);

        let only_borders = SearchOptions {
            cut_black_borders: true,
            ..Default::default()
        };
        let req =
            build_search_request(BASE, None, MediaSource::Bytes(vec![1]), &only_borders).unwrap();
        assert_eq!(req.url.query(), Some("cutBorders"));
    }

    #[test]
    fn false_flags_are_omitted() {
        let req = build_search_request(
            BASE,
            None,
            MediaSource::Url(MEDIA.into()),
            &SearchOptions {
                cut_black_borders: false,
                include_anilist_info: false,
                anilist_id: None,
            },
        )
        .unwrap();
        assert_eq!(query_keys(&req), ["url"]);
    }

    #[test]
    fn api_key_header_present_only_when_set() {
        let keyed = build_limits_request(BASE, Some("abc123")).unwrap();
        assert_eq!(keyed.headers.get(&API_KEY_HEADER).unwrap(), "abc123");
        assert_eq!(keyed.url.as_str(), "https://api.trace.moe/me");

        let anon = build_limits_request(BASE, None).unwrap();
        assert!(anon.headers.is_empty());

        let search = build_search_request(
            BASE,
            Some("abc123"),
            MediaSource::Bytes(vec![1]),
            &SearchOptions::default(),
        )
        .unwrap();
        assert_eq!(search.headers.get("x-trace-key").unwrap(), "abc123");
    }

    #[test]
    fn unusable_api_key_is_rejected() {
        let err = build_limits_request(BASE, Some("bad\nkey")).unwrap_err();
        assert!(matches!(err, TraceMoeError::InvalidApiKey(_)));
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let err = build_limits_request("not a url", None).unwrap_err();
        assert!(matches!(err, TraceMoeError::InvalidUrl(_)));
    }
}
