//! Helpers shared by the integration tests: a client pointed at a mock server, and
//! builders for the JSON bodies the YouTube API returns.

#![allow(dead_code)]

use oauth2::basic::{BasicTokenResponse, BasicTokenType};
use oauth2::{AccessToken, EmptyExtraTokenFields, RefreshToken};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{MockServer, ResponseTemplate};
use youtube_smart_playlist::oauth::OAuthManager;
use youtube_smart_playlist::secrets::ClientSecrets;
use youtube_smart_playlist::youtube_api::{TimeBoundAccessToken, YouTubeClient};

pub const ACCESS_TOKEN: &str = "ya29.test-token";

pub const CLIENT_ID: &str = "test.apps.googleusercontent.com";

pub fn token(access: &str, refresh: Option<&str>, expires_in: u64) -> BasicTokenResponse {
    let mut token = BasicTokenResponse::new(
        AccessToken::new(access.to_string()),
        BasicTokenType::Bearer,
        EmptyExtraTokenFields {},
    );
    token.set_expires_in(Some(&Duration::from_secs(expires_in)));
    token.set_refresh_token(refresh.map(|r| RefreshToken::new(r.to_string())));
    token
}

/// Client secrets whose token endpoint lives on the mock server.
pub fn secrets(server: &MockServer) -> ClientSecrets {
    ClientSecrets {
        token_uri: format!("{}/token", server.uri()),
        ..ClientSecrets::new(CLIENT_ID, "s")
    }
}

pub fn client_with(server: &MockServer, token: BasicTokenResponse) -> YouTubeClient {
    let oauth = OAuthManager::new(secrets(server), "");
    YouTubeClient::new(
        TimeBoundAccessToken::new(token),
        Arc::new(oauth),
        reqwest::Client::new(),
    )
    .with_api_base(server.uri())
}

pub fn client(server: &MockServer) -> YouTubeClient {
    client_with(server, token(ACCESS_TOKEN, None, 3600))
}

/// A `200 OK` carrying `body` as JSON.
pub fn ok_json(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

fn list(kind: &str, items: Vec<Value>, next: Option<&str>) -> Value {
    let mut body = json!({
        "kind": kind,
        "pageInfo": { "totalResults": items.len(), "resultsPerPage": 50 },
        "items": items,
    });
    if let Some(next) = next {
        body["nextPageToken"] = json!(next);
    }
    body
}

pub fn playlist(id: &str, title: &str) -> Value {
    json!({
        "kind": "youtube#playlist",
        "id": id,
        "snippet": { "title": title, "publishedAt": "2023-04-01T12:00:00Z" },
    })
}

pub fn playlists_page(playlists: &[(&str, &str)], next: Option<&str>) -> Value {
    let items = playlists.iter().map(|(id, t)| playlist(id, t)).collect();
    list("youtube#playlistListResponse", items, next)
}

pub fn playlist_item(playlist_id: &str, video_id: &str) -> Value {
    json!({
        "kind": "youtube#playlistItem",
        "id": format!("{playlist_id}.{video_id}"),
        "snippet": {
            "playlistId": playlist_id,
            "title": format!("Episode {video_id}"),
            "resourceId": { "kind": "youtube#video", "videoId": video_id },
            "videoOwnerChannelTitle": "GeminiTay",
            "videoOwnerChannelId": "UCgemini",
            "publishedAt": "2024-01-01T00:00:00Z",
        },
    })
}

pub fn playlist_items_page(playlist_id: &str, video_ids: &[&str], next: Option<&str>) -> Value {
    let items = video_ids
        .iter()
        .map(|v| playlist_item(playlist_id, v))
        .collect();
    list("youtube#playlistItemListResponse", items, next)
}

pub fn channels(found: Option<(&str, &str)>) -> Value {
    match found {
        Some((id, title)) => list(
            "youtube#channelListResponse",
            vec![json!({
                "kind": "youtube#channel",
                "id": id,
                "snippet": {
                    "title": title,
                    "customUrl": "@geminitay",
                    "publishedAt": "2012-08-03T17:23:40Z",
                },
            })],
            None,
        ),
        // the API omits `items` when nothing matches
        None => json!({
            "kind": "youtube#channelListResponse",
            "pageInfo": { "totalResults": 0, "resultsPerPage": 5 },
        }),
    }
}

pub fn search_results(channel_id: &str, video_ids: &[&str]) -> Value {
    let items = video_ids
        .iter()
        .map(|v| {
            json!({
                "kind": "youtube#searchResult",
                "id": { "kind": "youtube#video", "videoId": v },
                "snippet": {
                    "title": format!("Hermitcraft {v}"),
                    "channelId": channel_id,
                    "channelTitle": "GeminiTay",
                    "publishedAt": "2024-05-01T15:00:00Z",
                },
            })
        })
        .collect();
    list("youtube#searchListResponse", items, None)
}

pub fn insert_body(playlist_id: &str, video_id: &str) -> Value {
    json!({
        "snippet": {
            "playlistId": playlist_id,
            "resourceId": { "kind": "youtube#video", "videoId": video_id },
        }
    })
}
