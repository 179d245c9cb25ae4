use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

use crate::errors::{check_response, Result, TraceMoeError};
use crate::models::{MatchResult, MediaDownloadOptions, MediaKind};

/// Fetch a match's preview and write it to disk, returning the absolute path.
///
/// No API key is sent: media URLs carry their own token.
pub(crate) async fn download_media(
    http: &reqwest::Client,
    result: &MatchResult,
    kind: MediaKind,
    options: &MediaDownloadOptions,
) -> Result<PathBuf> {
    let url = Url::parse(&media_url(result, kind, options)?)?;
    let path = destination_path(result, kind, options)?;

    debug!(%kind, anilist = result.anilist_id(), path = %path.display(), "downloading preview");

    let response = http.get(url).send().await?;
    let response = check_response(response).await?;

    let written = stream_to_file(response, &path).await?;
    debug!(%kind, bytes = written, path = %path.display(), "preview saved");

    Ok(path)
}

/// The result's own URL plus `size` / `mute`. The base is never rebuilt.
pub(crate) fn media_url(
    result: &MatchResult,
    kind: MediaKind,
    options: &MediaDownloadOptions,
) -> Result<String> {
    let base = match kind {
        MediaKind::Video => &result.video_url,
        MediaKind::Image => &result.image_url,
    };
    if base.is_empty() {
        return Err(TraceMoeError::MissingMediaUrl(kind));
    }

    let mut url = base.clone();
    let mut sep = if url.contains('?') { '&' } else { '?' };

    if let Some(size) = options.size {
        url.push(sep);
        url.push_str("size=");
        url.push_str(size.as_str());
        sep = '&';
    }
    if kind == MediaKind::Video && options.mute {
        url.push(sep);
        url.push_str("mute");
    }

    Ok(url)
}

/// `<directory>/<name>.<ext>`, made absolute against the working directory.
pub(crate) fn destination_path(
    result: &MatchResult,
    kind: MediaKind,
    options: &MediaDownloadOptions,
) -> Result<PathBuf> {
    let directory = match &options.directory {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let name = options
        .name
        .clone()
        .unwrap_or_else(|| default_name(result));

    let path = directory.join(format!("{name}.{}", kind.extension()));
    Ok(std::path::absolute(path)?)
}

fn default_name(result: &MatchResult) -> String {
    format!("{}_{:.2}", result.anilist_id(), result.from)
}

/// Stream the body into a temp file next to `path`, then move it over `path`.
///
/// The directory must exist. On failure the temp file is dropped and an
/// existing file at `path` is left untouched.
async fn stream_to_file(mut response: reqwest::Response, path: &Path) -> Result<u64> {
    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    let (std_file, temp_path) = tempfile::Builder::new()
        .prefix(".tracemoe-")
        .suffix(".part")
        .tempfile_in(directory)?
        .into_parts();

    let mut file = File::from_std(std_file);
    let written = write_body(&mut response, &mut file).await?;
    drop(file);

    temp_path.persist(path).map_err(std::io::Error::from)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Anilist, MediaSize};

    fn result() -> MatchResult {
        MatchResult {
            anilist: Anilist::Id(99939),
            filename: "Violet Evergarden Gaiden.mp4".into(),
            episode: None,
            from: 2713.5,
            to: 2714.25,
            similarity: 0.96875,
            video_url: "https://media.trace.moe/video/99939/v.mp4?t=2713.5&now=1653892514&token=abc"
                .into(),
            image_url: "https://media.trace.moe/image/99939/v.mp4.jpg?t=2713.5&now=1653892514&token=abc"
                .into(),
        }
    }

    #[test]
    fn size_appended_verbatim() {
        let r = result();
        let opts = MediaDownloadOptions {
            size: Some(MediaSize::Medium),
            ..Default::default()
        };
        let url = media_url(&r, MediaKind::Video, &opts).unwrap();
        assert_eq!(url, format!("{}&size=medium", r.video_url));
    }

    #[test]
    fn mute_without_size() {
        let r = result();
        let opts = MediaDownloadOptions {
            mute: true,
            ..Default::default()
        };
        let url = media_url(&r, MediaKind::Video, &opts).unwrap();
        assert_eq!(url, format!("{}&mute", r.video_url));
        assert!(!url.contains("size="));
    }

    #[test]
    fn mute_ignored_for_images() {
        let r = result();
        let opts = MediaDownloadOptions {
            size: Some(MediaSize::Small),
            mute: true,
            ..Default::default()
        };
        let url = media_url(&r, MediaKind::Image, &opts).unwrap();
        assert_eq!(url, format!("{}&size=small", r.image_url));
    }

    #[test]
    fn url_without_query_gets_question_mark() {
        let mut r = result();
        r.video_url = "https://media.example/clip.mp4".into();
        let opts = MediaDownloadOptions {
            size: Some(MediaSize::Large),
            mute: true,
            ..Default::default()
        };
        let url = media_url(&r, MediaKind::Video, &opts).unwrap();
        assert_eq!(url, "https://media.example/clip.mp4?size=large&mute");
    }

    #[test]
    fn empty_url_is_an_error() {
        let mut r = result();
        r.image_url.clear();
        let err = media_url(&r, MediaKind::Image, &MediaDownloadOptions::default()).unwrap_err();
        assert!(matches!(err, TraceMoeError::MissingMediaUrl(MediaKind::Image)));
    }

    #[test]
    fn destination_uses_directory_name_and_extension() {
        let opts = MediaDownloadOptions {
            directory: Some(PathBuf::from("/tmp/previews")),
            name: Some("test".into()),
            ..Default::default()
        };
        let video = destination_path(&result(), MediaKind::Video, &opts).unwrap();
        assert_eq!(video, PathBuf::from("/tmp/previews/test.mp4"));
        let image = destination_path(&result(), MediaKind::Image, &opts).unwrap();
        assert_eq!(image, PathBuf::from("/tmp/previews/test.jpg"));
    }

    #[test]
    fn default_destination_is_cwd_with_derived_name() {
        let path =
            destination_path(&result(), MediaKind::Video, &MediaDownloadOptions::default()).unwrap();
        assert!(path.is_absolute());
        assert_eq!(path.parent().unwrap(), std::env::current_dir().unwrap());
        assert_eq!(path.file_name().unwrap(), "99939_2713.50.mp4");
    }
}
