//! Installed-application consent flow.
//!
//! The operator opens the printed consent URL, Google redirects the browser
//! to a listener on the loopback interface, and the authorization code from
//! that redirect is exchanged for a token.

use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{distributions::Alphanumeric, Rng};
use reqwest::Client;
use sha2::{Digest, Sha256};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
};
use unwrap_or::unwrap_some_or;
use url::Url;

use super::{types::*, utils};
use crate::error::{Error, Result};

/// How long one connection may take to send its request head.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const DONE_PAGE: &str = "The authentication flow has completed. You may close this window.\n";

pub async fn authorize(
    http: &Client,
    secrets: &ClientSecrets,
    scopes: &[&str],
) -> Result<StoredToken> {
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .map_err(|e| Error::Auth(format!("could not start the local callback listener: {e}")))?;
    let port = listener
        .local_addr()
        .map_err(|e| Error::Auth(format!("could not start the local callback listener: {e}")))?
        .port();

    let redirect_uri = format!("http://localhost:{port}/");
    let state = random_string(30);
    let verifier = random_string(64);

    let url = consent_url(secrets, scopes, &redirect_uri, &state, &verifier)?;
    println!("Please visit this URL to authorize this application: {url}");

    let code = wait_for_callback(&listener).await?.into_code(&state)?;
    tracing::debug!("Received authorization code");

    exchange(http, secrets, scopes, &code, &verifier, &redirect_uri).await
}

pub fn consent_url(
    secrets: &ClientSecrets,
    scopes: &[&str],
    redirect_uri: &str,
    state: &str,
    verifier: &str,
) -> Result<Url> {
    let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));

    Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("response_type", "code"),
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", scopes.join(" ").as_str()),
            ("state", state),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("code_challenge", challenge.as_str()),
            ("code_challenge_method", "S256"),
        ],
    )
    .map_err(|e| Error::Auth(format!("invalid auth_uri '{}': {e}", secrets.auth_uri)))
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Callback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl Callback {
    /// Parses the request target of a redirect, e.g. `/?code=..&state=..`.
    /// Returns `None` for requests that are not the OAuth redirect.
    pub fn parse(target: &str) -> Option<Self> {
        let url = Url::parse("http://localhost").ok()?.join(target).ok()?;
        let mut cb = Callback::default();

        for (k, v) in url.query_pairs() {
            match k.as_ref() {
                "code" => cb.code = Some(v.into_owned()),
                "state" => cb.state = Some(v.into_owned()),
                "error" => cb.error = Some(v.into_owned()),
                _ => {}
            }
        }

        match cb.code.is_some() || cb.error.is_some() {
            true => Some(cb),
            false => None,
        }
    }

    pub fn into_code(self, expected_state: &str) -> Result<String> {
        if let Some(e) = self.error {
            return Err(Error::Auth(format!("authorization was denied: {e}")));
        }
        if self.state.as_deref() != Some(expected_state) {
            return Err(Error::Auth(
                "authorization response carried an unexpected state".into(),
            ));
        }
        self.code
            .ok_or_else(|| Error::Auth("authorization response carried no code".into()))
    }
}

/// Serves requests on `listener` until the OAuth redirect arrives.
pub async fn wait_for_callback(listener: &TcpListener) -> Result<Callback> {
    serve_callbacks(listener, REQUEST_TIMEOUT).await
}

/// Connections that stay silent past `read_timeout` are dropped so that the
/// next one can be served.
async fn serve_callbacks(listener: &TcpListener, read_timeout: Duration) -> Result<Callback> {
    loop {
        let (stream, _) = listener
            .accept()
            .await
            .map_err(|e| Error::Auth(format!("callback listener failed: {e}")))?;

        let (target, mut stream) =
            match tokio::time::timeout(read_timeout, read_request_target(stream)).await {
                Ok(Ok(r)) => r,
                Ok(Err(e)) => {
                    tracing::debug!(error = %e, "Dropping malformed callback request");
                    continue;
                }
                Err(_) => {
                    tracing::debug!("Dropping idle callback connection");
                    continue;
                }
            };

        let callback = unwrap_some_or!(Callback::parse(&target), {
            let _ = respond(&mut stream, "404 Not Found", "").await;
            continue;
        });

        let _ = respond(&mut stream, "200 OK", DONE_PAGE).await;
        return Ok(callback);
    }
}

async fn read_request_target(stream: TcpStream) -> std::io::Result<(String, TcpStream)> {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    // GET /?code=... HTTP/1.1
    let target = line
        .split_whitespace()
        .nth(1)
        .map(String::from)
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidData, "bad request line"))?;

    let mut header = String::new();
    loop {
        header.clear();
        let n = reader.read_line(&mut header).await?;
        if n == 0 || header.trim().is_empty() {
            break;
        }
    }

    Ok((target, reader.into_inner()))
}

async fn respond(stream: &mut TcpStream, status: &str, body: &str) -> std::io::Result<()> {
    let res = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(res.as_bytes()).await?;
    stream.shutdown().await
}

async fn exchange(
    http: &Client,
    secrets: &ClientSecrets,
    scopes: &[&str],
    code: &str,
    verifier: &str,
    redirect_uri: &str,
) -> Result<StoredToken> {
    let res = http
        .post(&secrets.token_uri)
        .form(&[
            ("code", code),
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
            ("code_verifier", verifier),
        ])
        .send()
        .await?;

    let res = utils::check(res).await.map_err(|e| match e {
        Error::Status { message, .. } => {
            Error::Auth(format!("could not exchange authorization code: {message}"))
        }
        e => e,
    })?;

    let mut token = StoredToken {
        token: String::new(),
        refresh_token: None,
        token_uri: secrets.token_uri.clone(),
        client_id: secrets.client_id.clone(),
        client_secret: secrets.client_secret.clone(),
        scopes: scopes.iter().map(|s| s.to_string()).collect(),
        expiry: None,
    };
    token.apply(res.json::<TokenResponse>().await?);

    Ok(token)
}

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
