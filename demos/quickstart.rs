//! Quick-start examples for the trace.moe Rust client.
//!
//! Run with:
//!   cargo run --example quickstart -- path/to/screenshot.jpg
//!
//! Set TRACE_MOE_API_KEY to search with your key's quota, and RUST_LOG=tracemoe=debug
//! to see each request.

use std::path::PathBuf;

use tracemoe::{ClientBuilder, Episode, MediaDownloadOptions, MediaSize, SearchOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> tracemoe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // -----------------------------------------------------------------------
    // 1. Create a client (picks up TRACE_MOE_API_KEY if set)
    // -----------------------------------------------------------------------
    let client = ClientBuilder::from_env().build()?;

    // -----------------------------------------------------------------------
    // 2. Check your quota
    // -----------------------------------------------------------------------
    let quota = client.fetch_quota().await?;
    if quota.id.is_empty() {
        println!("Anonymous caller");
    } else {
        println!("Key: {}", quota.id);
    }
    println!("Searches left: {} / {}", quota.remaining, quota.limit);
    println!("Concurrency: {}", quota.concurrency);
    println!();

    // -----------------------------------------------------------------------
    // 3. Search by URL, with AniList titles inlined
    // -----------------------------------------------------------------------
    let options = SearchOptions {
        cut_black_borders: true,
        include_anilist_info: true,
        ..Default::default()
    };
    let response = client
        .search_by_url(
            "https://images.plurk.com/32B15UXxymfSMwKGTObY5e.jpg",
            Some(options.clone()),
        )
        .await?;

    println!("Compared {} frames", response.frame_count);
    for m in &response.results {
        let title = m
            .anilist
            .info()
            .and_then(|info| info.title.english.clone().or_else(|| info.title.romaji.clone()))
            .unwrap_or_else(|| m.anilist_id().to_string());
        let episode = match &m.episode {
            Some(Episode::Number(n)) => format!("ep {n}"),
            Some(Episode::Text(t)) => t.clone(),
            Some(Episode::List(eps)) => format!("eps {eps:?}"),
            None => "-".to_string(),
        };
        println!(
            "  {:5.1}% {} ({}) [{:.1}s - {:.1}s]",
            m.similarity * 100.0,
            title,
            episode,
            m.from,
            m.to
        );
    }
    println!();

    // -----------------------------------------------------------------------
    // 4. Search with a local file, if one was given
    // -----------------------------------------------------------------------
    let best = match std::env::args().nth(1) {
        Some(path) => {
            let response = client.search_by_file(&path, Some(options)).await?;
            println!("{path}: {} matches", response.results.len());
            response.results.into_iter().next()
        }
        None => response.results.into_iter().next(),
    };

    // -----------------------------------------------------------------------
    // 5. Save the best match's previews
    // -----------------------------------------------------------------------
    if let Some(best) = best {
        let directory = Some(PathBuf::from("."));

        let video = client
            .download_video(
                &best,
                Some(MediaDownloadOptions {
                    size: Some(MediaSize::Medium),
                    mute: true,
                    directory: directory.clone(),
                    name: Some("best-match".into()),
                }),
            )
            .await?;
        println!("Video preview: {}", video.display());

        let image = client
            .download_image(
                &best,
                Some(MediaDownloadOptions {
                    size: Some(MediaSize::Large),
                    directory,
                    name: Some("best-match".into()),
                    ..Default::default()
                }),
            )
            .await?;
        println!("Image preview: {}", image.display());
    }

    Ok(())
}
