//! YouTube Playlists API types.

use crate::youtube_api::paging::{Page, PageInfo};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Response structure for the `playlists.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlists/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistListResponse {
    /// Identifies the API resource's type.
    ///
    /// The value will be `youtube#playlistListResponse`.
    pub kind: String,
    /// A list of playlists that match the request criteria.
    #[serde(default)]
    pub items: VecDeque<PlaylistResource>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
    /// Token for the next page of results, absent on the last page.
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

impl From<PlaylistListResponse> for Page<PlaylistResource> {
    fn from(response: PlaylistListResponse) -> Self {
        Page {
            items: response.items,
            next_page_token: response.next_page_token,
        }
    }
}

/// A `playlist` resource represents a YouTube playlist.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlists#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistResource {
    /// The ID that YouTube uses to uniquely identify the playlist.
    pub id: String,
    pub snippet: PlaylistSnippet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PlaylistStatus>,
}

/// Basic details about a playlist, such as its title and description.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlists#snippet>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistSnippet {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "publishedAt", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<Timestamp>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistStatus {
    /// `private`, `public` or `unlisted`.
    #[serde(rename = "privacyStatus")]
    pub privacy_status: String,
}

/// Request body for `playlists.insert`.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlists/insert>
#[derive(Debug, Serialize)]
pub struct PlaylistInsertRequest {
    pub snippet: PlaylistSnippet,
    pub status: PlaylistStatus,
}

impl PlaylistInsertRequest {
    /// A playlist only the owner can see.
    pub fn private(title: &str, description: &str) -> Self {
        Self {
            snippet: PlaylistSnippet {
                title: title.to_string(),
                description: Some(description.to_string()),
                published_at: None,
            },
            status: PlaylistStatus {
                privacy_status: "private".to_string(),
            },
        }
    }
}
