use crate::oauth::OAuthManager;
use crate::secrets::ClientSecrets;
use crate::youtube_api::{PlaylistResource, TimeBoundAccessToken, YouTubeClient};
use eyre::Context;
use jiff::Timestamp;
use std::path::Path;
use std::sync::Arc;

pub mod oauth;
pub mod reconcile;
pub mod secrets;
pub mod sync;
pub mod youtube_api;

pub use reconcile::reconcile;
pub use sync::{SyncOptions, SyncReport, sync};

const OAUTH_DONE: &str = include_str!("../oauth_success.html");

/// A playlist owned by the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
}

impl From<PlaylistResource> for Playlist {
    fn from(resource: PlaylistResource) -> Self {
        Self {
            id: resource.id,
            name: resource.snippet.title,
        }
    }
}

/// A video, identified by YouTube's opaque video id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub channel_name: String,
    pub channel_id: String,
    pub published_at: Option<Timestamp>,
}

/// Runs the OAuth flow for the client in `client_secrets` and returns a ready API client.
///
/// Nothing is cached: every call sends the user through the browser consent page again.
pub async fn authenticate(
    client_secrets: &Path,
    http: reqwest::Client,
) -> eyre::Result<YouTubeClient> {
    let secrets = ClientSecrets::load(client_secrets).await?;
    let oauth_manager = Arc::new(OAuthManager::new(secrets, OAUTH_DONE));

    let token = oauth_manager
        .authenticate()
        .await
        .context("authorize user to YouTube")?;
    let client = YouTubeClient::new(TimeBoundAccessToken::new(token), oauth_manager, http);
    Ok(client)
}
