//! YouTube PlaylistItems API types.

use crate::youtube_api::paging::{Page, PageInfo};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Response structure for the `playlistItems.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItemListResponse {
    /// The value will be `youtube#playlistItemListResponse`.
    pub kind: String,
    #[serde(default)]
    pub items: VecDeque<PlaylistItem>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

impl From<PlaylistItemListResponse> for Page<PlaylistItem> {
    fn from(response: PlaylistItemListResponse) -> Self {
        Page {
            items: response.items,
            next_page_token: response.next_page_token,
        }
    }
}

/// A `playlistItem` resource identifies a video that is included in a playlist.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItem {
    /// The ID of the playlist entry itself, *not* of the video it points at.
    pub id: String,
    pub snippet: PlaylistItemSnippet,
}

/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#snippet>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItemSnippet {
    #[serde(rename = "playlistId")]
    pub playlist_id: String,
    pub title: String,
    #[serde(rename = "resourceId")]
    pub resource_id: ResourceId,
    /// Missing for videos that have since been deleted or made private.
    #[serde(rename = "videoOwnerChannelTitle")]
    pub video_owner_channel_title: Option<String>,
    #[serde(rename = "videoOwnerChannelId")]
    pub video_owner_channel_id: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<Timestamp>,
}

/// Points a playlist item at the resource it contains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceId {
    /// `youtube#video` for everything this tool deals with.
    pub kind: String,
    #[serde(rename = "videoId")]
    pub video_id: String,
}

impl ResourceId {
    pub fn video(video_id: &str) -> Self {
        Self {
            kind: "youtube#video".to_string(),
            video_id: video_id.to_string(),
        }
    }
}

/// Request body for `playlistItems.insert`.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems/insert>
#[derive(Debug, Serialize)]
pub struct PlaylistItemInsertRequest {
    pub snippet: PlaylistItemInsertSnippet,
}

#[derive(Debug, Serialize)]
pub struct PlaylistItemInsertSnippet {
    #[serde(rename = "playlistId")]
    pub playlist_id: String,
    #[serde(rename = "resourceId")]
    pub resource_id: ResourceId,
}

impl PlaylistItemInsertRequest {
    pub fn new(playlist_id: &str, video_id: &str) -> Self {
        Self {
            snippet: PlaylistItemInsertSnippet {
                playlist_id: playlist_id.to_string(),
                resource_id: ResourceId::video(video_id),
            },
        }
    }
}
