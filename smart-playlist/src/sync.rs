//! The sync pipeline: find or create the managed playlist, read it, query the channel,
//! reconcile, and append what's missing.

use crate::reconcile::reconcile;
use crate::youtube_api::{PlaylistInsertRequest, YouTubeClient};
use crate::{Playlist, Video};
use eyre::Context;
use std::collections::HashSet;
use tokio_stream::StreamExt;

/// Description given to playlists this tool creates.
pub const MANAGED_PLAYLIST_DESCRIPTION: &str = "Managed by YouTube-Smart-Playlist";

/// What to sync, as given on the command line.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub managed_playlist_name: String,
    pub channel_handle: String,
    pub query: Option<String>,
    /// How many of the channel's most recent matching videos to consider.
    pub max_results: u32,
    /// Compute the videos to add without touching the playlist.
    pub dry_run: bool,
}

/// Outcome of a sync run.
#[derive(Debug)]
pub struct SyncReport {
    pub playlist: Playlist,
    /// Whether the managed playlist had to be created during this run.
    pub created_playlist: bool,
    /// Number of distinct videos that were already in the playlist.
    pub existing: usize,
    pub candidates: usize,
    /// Videos added, or that would have been added in a dry run, in insertion order.
    pub added: Vec<Video>,
}

/// Finds the first playlist whose title matches `name`, ignoring case.
pub fn find_managed_playlist<'a>(playlists: &'a [Playlist], name: &str) -> Option<&'a Playlist> {
    let name = name.to_lowercase();
    playlists.iter().find(|p| p.name.to_lowercase() == name)
}

/// Runs one sync of the managed playlist against the channel's latest uploads.
#[tracing::instrument(skip(yt))]
pub async fn sync(yt: &YouTubeClient, options: &SyncOptions) -> eyre::Result<SyncReport> {
    let (playlist, created_playlist) =
        find_or_create_managed_playlist(yt, &options.managed_playlist_name).await?;

    let existing_ids = if created_playlist {
        HashSet::new()
    } else {
        existing_video_ids(yt, &playlist.id)
            .await
            .context("read managed playlist")?
    };
    tracing::info!(
        playlist = %playlist.name,
        playlist_id = %playlist.id,
        existing = existing_ids.len(),
        "fetched existing videos in managed playlist"
    );

    let candidates = candidate_videos(
        yt,
        &options.channel_handle,
        options.query.as_deref(),
        options.max_results,
    )
    .await?;

    let to_add = reconcile(&existing_ids, &candidates);
    tracing::info!(
        candidates = candidates.len(),
        to_add = to_add.len(),
        "reconciled channel videos against playlist"
    );

    let to_add: HashSet<&str> = to_add.iter().map(String::as_str).collect();
    let mut added = Vec::with_capacity(to_add.len());
    for video in candidates.iter().filter(|v| to_add.contains(v.id.as_str())) {
        let video_id = video.id.as_str();
        if options.dry_run {
            tracing::info!(video_id, title = %video.title, "would add video (dry run)");
        } else {
            yt.insert_playlist_item(&playlist.id, video_id)
                .await
                .with_context(|| format!("add video {video_id} to playlist {}", playlist.id))?;
            tracing::info!(video_id, title = %video.title, "added video");
        }
        added.push(video.clone());
    }

    Ok(SyncReport {
        playlist,
        created_playlist,
        existing: existing_ids.len(),
        candidates: candidates.len(),
        added,
    })
}

/// Returns the managed playlist, creating it as a private playlist if none matches `name`.
///
/// The boolean is `true` when the playlist was just created.
pub async fn find_or_create_managed_playlist(
    yt: &YouTubeClient,
    name: &str,
) -> eyre::Result<(Playlist, bool)> {
    let mut playlists = Vec::new();
    let stream = yt.list_my_playlists();
    let mut stream = std::pin::pin!(stream);
    while let Some(playlist) = stream.next().await {
        playlists.push(Playlist::from(playlist.context("list playlists")?));
    }
    tracing::debug!(count = playlists.len(), "fetched user playlists");

    if let Some(playlist) = find_managed_playlist(&playlists, name) {
        return Ok((playlist.clone(), false));
    }

    let request = PlaylistInsertRequest::private(name, MANAGED_PLAYLIST_DESCRIPTION);
    let created = yt
        .insert_playlist(&request)
        .await
        .with_context(|| format!("create managed playlist {name:?}"))?;
    let playlist = Playlist::from(created);
    tracing::info!(name, playlist_id = %playlist.id, "created managed playlist");
    Ok((playlist, true))
}

/// Collects the ids of every video in the playlist, across all pages.
pub async fn existing_video_ids(
    yt: &YouTubeClient,
    playlist_id: &str,
) -> eyre::Result<HashSet<String>> {
    let mut ids = HashSet::new();
    let items = yt.list_playlist_items(playlist_id);
    let mut items = std::pin::pin!(items);
    while let Some(item) = items.next().await {
        let item = item.context("list playlist items")?;
        ids.insert(item.snippet.resource_id.video_id);
    }
    Ok(ids)
}

/// Resolves the channel handle and returns its latest videos, newest first.
pub async fn candidate_videos(
    yt: &YouTubeClient,
    channel_handle: &str,
    query: Option<&str>,
    max_results: u32,
) -> eyre::Result<Vec<Video>> {
    let channel = yt
        .get_channel_by_handle(channel_handle)
        .await
        .context("resolve channel handle")?;
    tracing::info!(
        handle = channel_handle,
        channel_id = %channel.id,
        channel = %channel.snippet.title,
        "resolved channel"
    );

    yt.search_channel_videos(&channel.id, query, max_results)
        .await
        .with_context(|| format!("search videos of channel {}", channel.id))
}
