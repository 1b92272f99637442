//! Loading of Google's OAuth `client_secrets.json`.

use eyre::Context;
use serde::Deserialize;
use std::path::Path;

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The OAuth client configuration of a Google Cloud project.
///
/// For installed desktop applications the secret is not actually secret, see
/// <https://developers.google.com/identity/protocols/oauth2#installed>.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// The console hands out either an "installed" or a "web" client; both carry the same fields.
#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum ClientSecretsFile {
    Installed(ClientSecrets),
    Web(ClientSecrets),
}

impl ClientSecrets {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            auth_uri: default_auth_uri(),
            token_uri: default_token_uri(),
        }
    }

    pub fn from_json(json: &str) -> eyre::Result<Self> {
        let file: ClientSecretsFile = serde_json::from_str(json)
            .context("expected an object with an \"installed\" or \"web\" client")?;
        Ok(match file {
            ClientSecretsFile::Installed(secrets) | ClientSecretsFile::Web(secrets) => secrets,
        })
    }

    /// Reads and parses the client secrets file at `path`.
    pub async fn load(path: &Path) -> eyre::Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read client secrets from {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("parse client secrets in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// As downloaded from the Google Cloud console.
    const INSTALLED: &str = r#"{"installed":{
        "client_id":"123.apps.googleusercontent.com",
        "project_id":"smart-playlist",
        "auth_uri":"https://accounts.google.com/o/oauth2/auth",
        "token_uri":"https://oauth2.googleapis.com/token",
        "client_secret":"GOCSPX-abc",
        "redirect_uris":["http://localhost"]
    }}"#;

    #[test]
    fn installed_client() {
        let secrets = ClientSecrets::from_json(INSTALLED).unwrap();
        assert_eq!(secrets.client_id, "123.apps.googleusercontent.com");
        assert_eq!(secrets.client_secret, "GOCSPX-abc");
        assert_eq!(secrets.auth_uri, "https://accounts.google.com/o/oauth2/auth");
    }

    #[test]
    fn web_client_with_default_endpoints() {
        let json = r#"{"web":{"client_id":"id","client_secret":"s"}}"#;
        let secrets = ClientSecrets::from_json(json).unwrap();
        assert_eq!(secrets.auth_uri, GOOGLE_AUTH_URI);
        assert_eq!(secrets.token_uri, GOOGLE_TOKEN_URI);
    }

    #[test]
    fn unknown_layout_is_rejected() {
        assert!(ClientSecrets::from_json(r#"{"client_id":"id","client_secret":"s"}"#).is_err());
        assert!(ClientSecrets::from_json(r#"{"installed":{"client_id":"id"}}"#).is_err());
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let err = ClientSecrets::load(Path::new("/nonexistent/client_secrets.json"))
            .await
            .unwrap_err();
        assert!(format!("{err}").contains("/nonexistent/client_secrets.json"));
    }
}
