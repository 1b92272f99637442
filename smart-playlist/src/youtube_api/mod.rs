//! YouTube Data API v3 client library.
//!
//! Covers the handful of endpoints needed to keep a playlist in sync with a channel:
//!
//! - `playlists.list` / `playlists.insert` to find or create the managed playlist
//! - `playlistItems.list` / `playlistItems.insert` to read and extend it
//! - `channels.list?forHandle=` to turn a channel handle into a channel id
//! - `search.list` to get a channel's latest uploads
//!
//! Listing endpoints are exposed as [`PagedStream`]s that follow `nextPageToken`
//! on demand.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use youtube_smart_playlist::youtube_api::YouTubeClient;
//! use tokio_stream::StreamExt;
//!
//! # async fn example(client: YouTubeClient) -> eyre::Result<()> {
//! let playlists = client.list_my_playlists();
//! let mut playlists = std::pin::pin!(playlists);
//! while let Some(playlist) = playlists.next().await {
//!     let playlist = playlist?;
//!     println!("{} ({})", playlist.snippet.title, playlist.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod client;
pub mod paging;
pub mod playlist_items;
pub mod playlists;
pub mod search;

pub use client::{DEFAULT_API_BASE, TimeBoundAccessToken, YouTubeClient};
pub use paging::{Page, PageInfo, PagedStream};

pub use channels::{Channel, ChannelSnippet};
pub use playlist_items::{PlaylistItem, PlaylistItemInsertRequest, ResourceId};
pub use playlists::{PlaylistInsertRequest, PlaylistResource};
pub use search::SearchResult;
