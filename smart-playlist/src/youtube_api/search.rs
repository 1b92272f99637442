//! YouTube Search API types.

use crate::Video;
use crate::youtube_api::paging::PageInfo;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Response structure for the `search.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/search/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchListResponse {
    /// The value will be `youtube#searchListResponse`.
    pub kind: String,
    #[serde(default)]
    pub items: Vec<SearchResult>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// A search result points at a video, channel or playlist.
///
/// See: <https://developers.google.com/youtube/v3/docs/search#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
    pub snippet: SearchResultSnippet,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResultId {
    /// `youtube#video`, `youtube#channel` or `youtube#playlist`.
    pub kind: String,
    /// Only set when `kind` is `youtube#video`.
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResultSnippet {
    pub title: String,
    #[serde(rename = "channelId")]
    pub channel_id: String,
    #[serde(rename = "channelTitle")]
    pub channel_title: String,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<Timestamp>,
}

impl SearchResult {
    /// Converts the result into a [`Video`], or `None` if it doesn't point at a video.
    pub fn into_video(self) -> Option<Video> {
        let id = self.id.video_id?;
        Some(Video {
            id,
            title: self.snippet.title,
            channel_name: self.snippet.channel_title,
            channel_id: self.snippet.channel_id,
            published_at: self.snippet.published_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_results_are_not_videos() {
        let result: SearchResult = serde_json::from_value(serde_json::json!({
            "id": { "kind": "youtube#channel", "channelId": "UC1" },
            "snippet": {
                "title": "Some channel",
                "channelId": "UC1",
                "channelTitle": "Some channel",
                "publishedAt": "2020-01-01T00:00:00Z"
            }
        }))
        .unwrap();
        assert!(result.into_video().is_none());
    }
}
