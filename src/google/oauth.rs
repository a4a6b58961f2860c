use std::path::{Path, PathBuf};

use reqwest::Client;
use tokio::{fs, sync::Mutex};

use super::{flow, types::*, utils};
use crate::{
    config::Config,
    error::{Error, Result},
};

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/classroom.courses.readonly",
    "https://www.googleapis.com/auth/classroom.coursework.students",
    "https://www.googleapis.com/auth/classroom.rosters.readonly",
    "https://www.googleapis.com/auth/drive.readonly",
];

/// Owns the access token shared by the Classroom and Drive clients.
pub struct Authenticator {
    http: Client,
    path: PathBuf,
    token: Mutex<StoredToken>,
}

impl Authenticator {
    pub fn new(http: Client, path: impl Into<PathBuf>, token: StoredToken) -> Self {
        Self {
            http,
            path: path.into(),
            token: Mutex::new(token),
        }
    }

    /// Loads the saved token, refreshing it or running the browser consent
    /// flow as needed, and writes the result back to disk.
    pub async fn obtain(http: Client, config: &Config) -> Result<Self> {
        let token = match load_token(&config.token).await {
            Some(t) if t.is_valid() => {
                tracing::debug!(path = %config.token.display(), "Using saved access token");
                t
            }
            Some(t) if t.refresh_token.is_some() => {
                tracing::info!("Access token expired, refreshing");
                refresh(&http, t).await?
            }
            _ => {
                let secrets = load_secrets(&config.credentials).await?;
                flow::authorize(&http, &secrets, SCOPES).await?
            }
        };

        save_token(&config.token, &token).await?;
        Ok(Self::new(http, &config.token, token))
    }

    /// Value for the `Authorization` header, refreshing the token first if it
    /// has expired since the last call.
    pub async fn auth_header(&self) -> Result<String> {
        let mut token = self.token.lock().await;

        if !token.is_valid() {
            if token.refresh_token.is_none() {
                return Err(Error::Auth(
                    "access token expired and no refresh token is available".into(),
                ));
            }

            tracing::info!("Access token expired, refreshing");
            *token = refresh(&self.http, token.clone()).await?;
            save_token(&self.path, &token).await?;
        }

        Ok(format!("Bearer {}", token.token))
    }
}

async fn refresh(http: &Client, mut token: StoredToken) -> Result<StoredToken> {
    let refresh_token = token.refresh_token.clone().unwrap_or_default();

    let res = http
        .post(&token.token_uri)
        .form(&[
            ("client_id", token.client_id.as_str()),
            ("client_secret", token.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ])
        .send()
        .await?;

    let res = utils::check(res).await.map_err(|e| match e {
        Error::Status { message, .. } => {
            Error::Auth(format!("could not refresh access token: {message}"))
        }
        e => e,
    })?;

    token.apply(res.json::<TokenResponse>().await?);
    Ok(token)
}

async fn load_token(path: &Path) -> Option<StoredToken> {
    let bytes = match fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not read saved token");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed saved token");
            None
        }
    }
}

async fn save_token(path: &Path, token: &StoredToken) -> Result<()> {
    let json = serde_json::to_vec(token).map_err(|e| Error::json(path, e))?;
    fs::write(path, json).await.map_err(|e| Error::io(path, e))
}

async fn load_secrets(path: &Path) -> Result<ClientSecrets> {
    let bytes = fs::read(path).await.map_err(|e| {
        Error::Auth(format!(
            "client secrets file '{}' is required to authorize: {e}",
            path.display()
        ))
    })?;

    serde_json::from_slice::<ClientSecretsFile>(&bytes)
        .map_err(|e| Error::json(path, e))?
        .into_secrets()
        .ok_or_else(|| {
            Error::Auth(format!(
                "'{}' has neither an `installed` nor a `web` client",
                path.display()
            ))
        })
}
