//! OAuth 2.0 installed-application flow for YouTube API access.
//!
//! The user is sent to Google's consent page in their browser, and the authorization code
//! comes back through a one-shot HTTP server on the loopback interface.

use crate::secrets::ClientSecrets;
use eyre::Context;
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Request, Response};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::reqwest;
use oauth2::{AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken};
use oauth2::{PkceCodeChallenge, RedirectUrl, Scope, TokenResponse, TokenUrl};
use std::convert::Infallible;
use std::future::Future;

/// Scopes needed to read and modify the user's playlists.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/youtube",
    "https://www.googleapis.com/auth/youtube.force-ssl",
];

/// Runs OAuth flows against the client configured in a [`ClientSecrets`].
#[derive(Debug, Clone)]
pub struct OAuthManager {
    secrets: ClientSecrets,
    oauth_done_html: &'static str,
}

impl OAuthManager {
    /// `oauth_done_html` is what the browser shows once the redirect has been received.
    pub fn new(secrets: ClientSecrets, oauth_done_html: &'static str) -> Self {
        Self {
            secrets,
            oauth_done_html,
        }
    }

    fn http_client() -> eyre::Result<reqwest::Client> {
        reqwest::ClientBuilder::new()
            // SSRF no thank you.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("build OAuth HTTP client")
    }

    /// Performs a complete authorization flow to obtain a new access token.
    ///
    /// 1. Bind the loopback redirect endpoint
    /// 2. Open the user's browser on the consent page
    /// 3. Wait for the redirect and exchange the code (with PKCE verifier) for a token
    pub async fn authenticate(&self) -> eyre::Result<BasicTokenResponse> {
        let csrf = CsrfToken::new_random();
        let (redirect_url, eventually_authorization_code) = self
            .setup_redirect(csrf.clone())
            .await
            .context("set up redirect endpoint")?;

        let auth_url =
            AuthUrl::new(self.secrets.auth_uri.clone()).context("parse authorization endpoint")?;
        let token_url =
            TokenUrl::new(self.secrets.token_uri.clone()).context("parse token endpoint")?;
        let client = BasicClient::new(ClientId::new(self.secrets.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.secrets.client_secret.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url);

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, _csrf_token) = client
            // We never re-use the CSRF since we only go through the flow exactly once.
            .authorize_url(move || csrf.clone())
            .add_scopes(SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .set_pkce_challenge(pkce_challenge)
            .url();

        tracing::info!(url = %auth_url, "asking user to follow OAuth flow");
        if let Err(e) = webbrowser::open(auth_url.as_ref()) {
            // headless machines can still copy the logged URL by hand
            tracing::warn!(error = %e, "could not open browser, visit the URL above manually");
        }
        let authorization_code = eventually_authorization_code
            .await
            .context("await user authorization code")?;

        let token_result = client
            .exchange_code(authorization_code)
            .set_pkce_verifier(pkce_verifier)
            .request_async(&Self::http_client()?)
            .await
            .context("exchange authorization code with access token")?;

        tracing::info!("obtained YouTube access token");
        Ok(token_result)
    }

    /// Attempts to refresh an existing OAuth token using its refresh token.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(new_token))` - Refresh succeeded, new token is available
    /// * `Ok(None)` - No refresh token, or Google no longer accepts it
    /// * `Err(_)` - Network or other error occurred during refresh attempt
    pub async fn refresh_token(
        &self,
        token: BasicTokenResponse,
    ) -> eyre::Result<Option<BasicTokenResponse>> {
        let Some(refresh_token) = token.refresh_token() else {
            tracing::warn!("no refresh token available, cannot refresh");
            return Ok(None);
        };

        tracing::debug!("attempting to refresh OAuth token");

        let token_url =
            TokenUrl::new(self.secrets.token_uri.clone()).context("parse token endpoint")?;
        let client = BasicClient::new(ClientId::new(self.secrets.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.secrets.client_secret.clone()))
            .set_token_uri(token_url);

        match client
            .exchange_refresh_token(refresh_token)
            .request_async(&Self::http_client()?)
            .await
        {
            Ok(new_token) => {
                tracing::debug!("successfully refreshed OAuth token");
                Ok(Some(new_token))
            }
            Err(ref e @ oauth2::RequestTokenError::ServerResponse(ref sr))
                if matches!(
                    sr.error(),
                    oauth2::basic::BasicErrorResponseType::InvalidGrant
                ) =>
            {
                tracing::warn!("OAuth refresh token considered invalid grant: {}", e);
                Ok(None)
            }
            Err(e) => Err(e).context("exchange refresh token"),
        }
    }

    /// Binds a one-shot HTTP server on a random loopback port to receive the OAuth redirect.
    ///
    /// Returns the redirect URL to hand to Google, and a future that resolves to the
    /// authorization code once the browser has been redirected with a matching `state`.
    async fn setup_redirect(
        &self,
        csrf: CsrfToken,
    ) -> eyre::Result<(
        RedirectUrl,
        impl Future<Output = eyre::Result<AuthorizationCode>>,
    )> {
        let socket = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind to localhost")?;
        let addr = socket.local_addr().context("get local address")?;
        let url = RedirectUrl::new(format!("http://{}:{}", addr.ip(), addr.port()))
            .context("construct redirect url")?;
        let (tx, rx) = tokio::sync::oneshot::channel();
        let oauth_done = self.oauth_done_html;
        tokio::spawn(async move {
            let r = async move {
                let (conn, _) = socket.accept().await.context("accept")?;
                let conn = hyper_util::rt::TokioIo::new(conn);
                let (got, mut gotten) = tokio::sync::mpsc::channel(1);
                let service = service_fn(move |req: Request<Incoming>| {
                    let csrf = csrf.clone();
                    let got = got.clone();
                    async move {
                        let outcome = parse_redirect(req.uri().query().unwrap_or(""), &csrf);
                        let reply = match &outcome {
                            Ok(_) => oauth_done.to_string(),
                            Err(e) => format!("Authorization failed: {e}"),
                        };
                        let _ = got.send(outcome).await;
                        let body = Full::<Bytes>::from(reply);
                        Ok::<_, Infallible>(Response::new(body))
                    }
                });
                let mut serve = std::pin::pin!(
                    hyper::server::conn::http1::Builder::new().serve_connection(conn, service)
                );

                tokio::select! {
                    exit = &mut serve => {
                        if let Err(e) = exit {
                            Err(e).context("redirect server got bad request")
                        } else {
                            eyre::bail!("redirect server exit prematurely");
                        }
                    }
                    outcome = gotten.recv() => {
                        serve.as_mut().graceful_shutdown();
                        // let the response reach the browser before the connection goes away
                        let _ = serve.await;
                        outcome.ok_or_else(|| eyre::eyre!("redirect handler went away"))?
                    }
                }
            };
            let _ = tx.send(r.await);
        });
        Ok((url, async move {
            rx.await.context("redirect future dropped prematurely")?
        }))
    }
}

/// Pulls the authorization code out of the redirect's query string.
///
/// The `state` must match the CSRF token we sent, and an `error` parameter (for example
/// `access_denied` when the user declines) is reported as such.
fn parse_redirect(query: &str, csrf: &CsrfToken) -> eyre::Result<AuthorizationCode> {
    let mut state = None;
    let mut code = None;
    let mut error = None;
    for (k, v) in form_urlencoded::parse(query.as_bytes()) {
        match &*k {
            "state" => state = Some(v),
            "code" => code = Some(v),
            "error" => error = Some(v),
            _ => {}
        }
    }
    if state.as_deref() != Some(csrf.secret().as_str()) {
        eyre::bail!("invalid csrf token");
    }
    if let Some(error) = error {
        eyre::bail!("authorization server returned error: {error}");
    }
    let Some(code) = code else {
        eyre::bail!("no authorization code found");
    };
    Ok(AuthorizationCode::new(code.into_owned()))
}
