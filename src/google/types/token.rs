use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// Seconds before the real expiry at which a token is treated as expired.
const EXPIRY_LEEWAY: i64 = 60;

/// Authorized user credentials as kept in `token.json`.
///
/// The layout matches what Google's Python auth library writes, so a token
/// file produced by either tool can be read by the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_uri() -> String {
    TOKEN_URI.into()
}

impl StoredToken {
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            None => true,
            Some(exp) => now + Duration::seconds(EXPIRY_LEEWAY) < exp,
        }
    }

    /// Folds a token endpoint response into the stored credentials.
    pub fn apply(&mut self, res: TokenResponse) {
        self.expiry = res
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));
        self.token = res.access_token;

        // Google usually omits the refresh token on refresh.
        if let Some(t) = res.refresh_token {
            self.refresh_token = Some(t);
        }
        if let Some(scope) = res.scope {
            self.scopes = scope.split_whitespace().map(String::from).collect();
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// An OAuth client as downloaded from the Google Cloud console.
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
    AUTH_URI.into()
}

#[derive(Debug, Deserialize)]
pub struct ClientSecretsFile {
    pub installed: Option<ClientSecrets>,
    pub web: Option<ClientSecrets>,
}

impl ClientSecretsFile {
    pub fn into_secrets(self) -> Option<ClientSecrets> {
        self.installed.or(self.web)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PYTHON_TOKEN: &str = r#"{
        "token": "ya29.a0",
        "refresh_token": "1//0g",
        "token_uri": "https://oauth2.googleapis.com/token",
        "client_id": "123.apps.googleusercontent.com",
        "client_secret": "shh",
        "scopes": ["https://www.googleapis.com/auth/drive.readonly"],
        "universe_domain": "googleapis.com",
        "account": "",
        "expiry": "2024-05-01T10:00:00.123456Z"
    }"#;

    #[test]
    fn test_read_python_token() -> anyhow::Result<()> {
        let t: StoredToken = serde_json::from_str(PYTHON_TOKEN)?;
        assert_eq!(t.token, "ya29.a0");
        assert_eq!(t.refresh_token.as_deref(), Some("1//0g"));
        assert_eq!(t.scopes.len(), 1);
        assert!(!t.is_valid());
        Ok(())
    }

    #[test]
    fn test_validity_leeway() -> anyhow::Result<()> {
        let mut t: StoredToken = serde_json::from_str(PYTHON_TOKEN)?;
        let now = Utc::now();

        t.expiry = Some(now + Duration::seconds(30));
        assert!(!t.is_valid_at(now));

        t.expiry = Some(now + Duration::hours(1));
        assert!(t.is_valid_at(now));

        t.expiry = None;
        assert!(t.is_valid_at(now));
        Ok(())
    }

    #[test]
    fn test_apply_keeps_refresh_token() -> anyhow::Result<()> {
        let mut t: StoredToken = serde_json::from_str(PYTHON_TOKEN)?;
        t.apply(TokenResponse {
            access_token: "fresh".into(),
            expires_in: Some(3599),
            refresh_token: None,
            scope: None,
        });

        assert_eq!(t.token, "fresh");
        assert_eq!(t.refresh_token.as_deref(), Some("1//0g"));
        assert!(t.is_valid());
        Ok(())
    }

    #[test]
    fn test_client_secrets() -> anyhow::Result<()> {
        let f: ClientSecretsFile = serde_json::from_str(
            r#"{"installed": {"client_id": "id", "client_secret": "secret",
                "redirect_uris": ["http://localhost"]}}"#,
        )?;
        let s = f.into_secrets().unwrap();
        assert_eq!(s.client_id, "id");
        assert_eq!(s.token_uri, TOKEN_URI);
        assert_eq!(s.auth_uri, AUTH_URI);

        let f: ClientSecretsFile = serde_json::from_str(r#"{"other": {}}"#)?;
        assert!(f.into_secrets().is_none());
        Ok(())
    }
}
