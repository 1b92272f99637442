//! Core YouTube API client functionality and authentication management.

use crate::Video;
use crate::oauth::OAuthManager;
use crate::youtube_api::{
    channels::{Channel, ChannelListResponse},
    paging::{Page, PagedStream},
    playlist_items::{PlaylistItem, PlaylistItemInsertRequest, PlaylistItemListResponse},
    playlists::{PlaylistInsertRequest, PlaylistListResponse, PlaylistResource},
    search::SearchListResponse,
};
use eyre::Context;
use http::Method;
use oauth2::TokenResponse;
use oauth2::basic::BasicTokenResponse;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tokio_stream::Stream;
use tracing::instrument;

/// Base URL of the YouTube Data API v3.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Largest page size any `*.list` endpoint accepts.
const MAX_PAGE_SIZE: u32 = 50;

/// An OAuth2 token together with the instant after which it should no longer be used.
#[derive(Debug, Clone)]
pub struct TimeBoundAccessToken {
    token: BasicTokenResponse,
    /// When the current access token expires (with safety buffer)
    expires_at: SystemTime,
}

impl TimeBoundAccessToken {
    /// Wraps a freshly issued token.
    ///
    /// The expiry time is the token's `expires_in` minus a 5-minute safety buffer.
    pub fn new(token: BasicTokenResponse) -> Self {
        Self {
            expires_at: Self::calculate_token_expiry(&token),
            token,
        }
    }

    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires_at
    }

    /// Refreshes this token using the provided OAuth manager, preserving the refresh token.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Token was successfully refreshed
    /// * `Ok(false)` - Refresh failed (invalid grant, no refresh token, etc.)
    /// * `Err(_)` - Network or other error occurred
    pub async fn refresh(&mut self, oauth_manager: &OAuthManager) -> eyre::Result<bool> {
        tracing::trace!("refreshing token");
        match oauth_manager
            .refresh_token(self.token.clone())
            .await
            .context("refresh OAuth token")?
        {
            Some(new_token) => {
                let old_token = std::mem::replace(&mut self.token, new_token);

                // Google usually omits the refresh token from refresh responses
                if self.token.refresh_token().is_none() {
                    tracing::trace!("new token lacks refresh token, preserving original");
                    self.token
                        .set_refresh_token(old_token.refresh_token().cloned());
                }

                self.expires_at = Self::calculate_token_expiry(&self.token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn calculate_token_expiry(token: &BasicTokenResponse) -> SystemTime {
        let now = SystemTime::now();
        match token.expires_in() {
            Some(expires_in) => now + expires_in.saturating_sub(Duration::from_secs(300)),
            // Google access tokens live for an hour
            None => now + Duration::from_secs(3300),
        }
    }
}

/// Client for the parts of the YouTube Data API v3 that playlist syncing needs.
///
/// Every call goes through [`Self::make_authenticated_request`], which refreshes the
/// access token first if it has expired.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    token: Arc<Mutex<TimeBoundAccessToken>>,
    oauth_manager: Arc<OAuthManager>,
    client: reqwest::Client,
    api_base: String,
}

impl YouTubeClient {
    /// Creates a new YouTube API client talking to [`DEFAULT_API_BASE`].
    pub fn new(
        token: TimeBoundAccessToken,
        oauth_manager: Arc<OAuthManager>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            token: Arc::new(Mutex::new(token)),
            oauth_manager,
            client,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Points the client at a different API root, such as a local mock server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Gets a guaranteed-fresh access token, refreshing if necessary.
    #[instrument(skip(self))]
    pub(crate) async fn fresh_access_token(&self) -> eyre::Result<String> {
        let mut token = self.token.lock().await;

        if token.is_expired() {
            tracing::debug!("access token expired, attempting refresh");
            if !token.refresh(&self.oauth_manager).await? {
                tracing::error!("access token refresh failed, client is unusable");
                eyre::bail!("unable to refresh expired access token");
            }
            tracing::debug!("access token successfully refreshed");
        }

        Ok(token.token.access_token().secret().to_string())
    }

    /// Makes an authenticated HTTP request to the YouTube API.
    ///
    /// `resource` is the path below the API root, e.g. `playlists`. Non-2xx responses
    /// are turned into an error that carries the status and the response body.
    #[instrument(skip(self, json_body), ret, level = tracing::Level::TRACE)]
    pub(crate) async fn make_authenticated_request(
        &self,
        method: Method,
        resource: &str,
        query_params: &[(&str, &str)],
        json_body: Option<&impl Serialize>,
    ) -> eyre::Result<reqwest::Response> {
        let access_token = self.fresh_access_token().await?;
        let url = format!("{}/{}", self.api_base, resource);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .query(query_params);

        if let Some(body) = json_body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("send {} request to YouTube API: {}", method, url))?;

        let status_code = response.status();
        if !status_code.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            eyre::bail!(
                "YouTube API {} {} failed with status {}: {}",
                method,
                resource,
                status_code,
                error_text
            );
        }

        Ok(response)
    }

    /// Returns a paginated stream of all playlists owned by the authenticated user.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube.readonly`
    /// * `https://www.googleapis.com/auth/youtube`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlists/list>
    #[instrument(skip(self))]
    pub fn list_my_playlists(
        &self,
    ) -> impl Stream<Item = eyre::Result<PlaylistResource>> + use<'_> {
        PagedStream::new(move |page_token| async move {
            let response = self
                .list_playlists_internal(MAX_PAGE_SIZE, page_token)
                .await?;
            Ok(Page::from(response))
        })
    }

    /// Creates a playlist owned by the authenticated user.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube`
    /// * `https://www.googleapis.com/auth/youtube.force-ssl`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlists/insert>
    #[instrument(skip(self), ret)]
    pub async fn insert_playlist(
        &self,
        request: &PlaylistInsertRequest,
    ) -> eyre::Result<PlaylistResource> {
        let response = self
            .make_authenticated_request(
                Method::POST,
                "playlists",
                &[("part", "snippet,status")],
                Some(request),
            )
            .await?;

        let playlist: PlaylistResource = response
            .json()
            .await
            .context("parse YouTube playlists.insert response as JSON")?;

        tracing::debug!(playlist_id = %playlist.id, "created playlist");
        Ok(playlist)
    }

    /// Returns a paginated stream of the entries of the given playlist, in playlist order.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/list>
    #[instrument(skip(self))]
    pub fn list_playlist_items<'a>(
        &'a self,
        playlist_id: &'a str,
    ) -> impl Stream<Item = eyre::Result<PlaylistItem>> + use<'a> {
        PagedStream::new(move |page_token| async move {
            let response = self
                .list_playlist_items_internal(playlist_id, MAX_PAGE_SIZE, page_token)
                .await?;
            Ok(Page::from(response))
        })
    }

    /// Appends a video to the end of a playlist.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube`
    /// * `https://www.googleapis.com/auth/youtube.force-ssl`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/insert>
    #[instrument(skip(self), ret)]
    pub async fn insert_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
    ) -> eyre::Result<PlaylistItem> {
        let body = PlaylistItemInsertRequest::new(playlist_id, video_id);
        let response = self
            .make_authenticated_request(
                Method::POST,
                "playlistItems",
                &[("part", "snippet")],
                Some(&body),
            )
            .await?;

        let item: PlaylistItem = response
            .json()
            .await
            .context("parse YouTube playlistItems.insert response as JSON")?;

        tracing::debug!(playlist_id, video_id, item_id = %item.id, "added video to playlist");
        Ok(item)
    }

    /// Looks up a channel by its handle (with or without the leading `@`).
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/channels/list>
    #[instrument(skip(self), ret)]
    pub async fn get_channel_by_handle(&self, handle: &str) -> eyre::Result<Channel> {
        let response = self
            .make_authenticated_request(
                Method::GET,
                "channels",
                &[("part", "id,snippet"), ("forHandle", handle)],
                None::<&()>,
            )
            .await?;

        let channels: ChannelListResponse = response
            .json()
            .await
            .context("parse YouTube channels API response as JSON")?;

        tracing::debug!(
            handle,
            returned_items = channels.items.len(),
            "looked up channel by handle"
        );

        channels
            .items
            .into_iter()
            .next()
            .ok_or_else(|| eyre::eyre!("channel not found: {}", handle))
    }

    /// Fetches the most recent videos of a channel, newest first, optionally matching `query`.
    ///
    /// Only a single page of up to `max_results` (at most 50) results is requested.
    /// Results that aren't videos are dropped.
    ///
    /// # API Cost
    ///
    /// Search calls cost 100 quota units each.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/search/list>
    #[instrument(skip(self))]
    pub async fn search_channel_videos(
        &self,
        channel_id: &str,
        query: Option<&str>,
        max_results: u32,
    ) -> eyre::Result<Vec<Video>> {
        let max_results_string = max_results.clamp(1, MAX_PAGE_SIZE).to_string();
        let mut query_params = vec![
            ("part", "id,snippet"),
            ("channelId", channel_id),
            ("maxResults", max_results_string.as_str()),
            ("order", "date"),
            ("type", "video"),
        ];
        if let Some(q) = query {
            query_params.push(("q", q));
        }

        let response = self
            .make_authenticated_request(Method::GET, "search", &query_params, None::<&()>)
            .await?;

        let results: SearchListResponse = response
            .json()
            .await
            .context("parse YouTube search API response as JSON")?;

        tracing::debug!(
            total_results = results.page_info.total_results,
            returned_items = results.items.len(),
            "searched channel videos"
        );

        Ok(results
            .items
            .into_iter()
            .filter_map(|result| result.into_video())
            .collect())
    }

    /// Internal method to call the `playlists.list` API with `mine=true`.
    ///
    /// Used by [`Self::list_my_playlists`] to handle pagination.
    async fn list_playlists_internal(
        &self,
        max_results: u32,
        page_token: Option<String>,
    ) -> eyre::Result<PlaylistListResponse> {
        let max_results_string = max_results.to_string();
        let mut query_params = vec![
            ("part", "snippet,contentDetails"),
            ("mine", "true"),
            ("maxResults", max_results_string.as_str()),
        ];
        if let Some(ref token) = page_token {
            query_params.push(("pageToken", token.as_str()));
        }

        let response = self
            .make_authenticated_request(Method::GET, "playlists", &query_params, None::<&()>)
            .await?;

        let playlists: PlaylistListResponse = response
            .json()
            .await
            .context("parse YouTube playlists API response as JSON")?;

        tracing::debug!(
            total_results = playlists.page_info.total_results,
            returned_items = playlists.items.len(),
            "fetched playlists"
        );

        Ok(playlists)
    }

    /// Internal method to call the `playlistItems.list` API.
    ///
    /// Used by [`Self::list_playlist_items`] to handle pagination.
    async fn list_playlist_items_internal(
        &self,
        playlist_id: &str,
        max_results: u32,
        page_token: Option<String>,
    ) -> eyre::Result<PlaylistItemListResponse> {
        let max_results_string = max_results.to_string();
        let mut query_params = vec![
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", max_results_string.as_str()),
        ];
        if let Some(ref token) = page_token {
            query_params.push(("pageToken", token.as_str()));
        }

        let response = self
            .make_authenticated_request(Method::GET, "playlistItems", &query_params, None::<&()>)
            .await?;

        let items: PlaylistItemListResponse = response
            .json()
            .await
            .context("parse YouTube playlistItems API response as JSON")?;

        tracing::debug!(
            playlist_id,
            total_results = items.page_info.total_results,
            returned_items = items.items.len(),
            "fetched playlist items"
        );

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::ClientSecrets;
    use oauth2::basic::BasicTokenType;
    use oauth2::{AccessToken, EmptyExtraTokenFields, RefreshToken};

    fn token(expires_in: Option<u64>) -> BasicTokenResponse {
        let mut token = BasicTokenResponse::new(
            AccessToken::new("ya29.test".to_string()),
            BasicTokenType::Bearer,
            EmptyExtraTokenFields {},
        );
        token.set_expires_in(expires_in.map(Duration::from_secs).as_ref());
        token.set_refresh_token(Some(RefreshToken::new("1//refresh".to_string())));
        token
    }

    fn client(token: TimeBoundAccessToken) -> YouTubeClient {
        let secrets = ClientSecrets::new("id.apps.googleusercontent.com", "secret");
        YouTubeClient::new(
            token,
            Arc::new(OAuthManager::new(secrets, "done")),
            reqwest::Client::new(),
        )
    }

    #[test]
    fn expiry_keeps_a_safety_buffer() {
        let before = SystemTime::now();
        let token = TimeBoundAccessToken::new(token(Some(3600)));
        assert!(!token.is_expired());
        let lifetime = token.expires_at.duration_since(before).unwrap();
        assert!(lifetime >= Duration::from_secs(3300));
        assert!(lifetime < Duration::from_secs(3360));
    }

    #[test]
    fn short_lived_token_is_immediately_stale() {
        assert!(TimeBoundAccessToken::new(token(Some(60))).is_expired());
        assert!(TimeBoundAccessToken::new(token(Some(300))).is_expired());
    }

    #[tokio::test]
    async fn fresh_token_is_used_as_is() {
        let yt = client(TimeBoundAccessToken::new(token(Some(3600))));
        assert_eq!(yt.fresh_access_token().await.unwrap(), "ya29.test");
    }

    #[test]
    fn api_base_trailing_slash_is_dropped() {
        let yt = client(TimeBoundAccessToken::new(token(None)))
            .with_api_base("http://127.0.0.1:9999/youtube/v3/");
        assert_eq!(yt.api_base, "http://127.0.0.1:9999/youtube/v3");
    }
}
