use std::{path::Path, sync::Arc};

use chrono::{Duration, Utc};
use reqwest::Client;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use crate::{config::Config, google::*};

/// A token that stays valid for the whole test.
pub fn valid_token(access_token: &str) -> StoredToken {
    StoredToken {
        token: access_token.into(),
        refresh_token: None,
        token_uri: TOKEN_URI.into(),
        client_id: "client".into(),
        client_secret: "secret".into(),
        scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
        expiry: Some(Utc::now() + Duration::hours(1)),
    }
}

pub fn authenticator(dir: &Path) -> Arc<Authenticator> {
    Arc::new(Authenticator::new(
        Client::new(),
        dir.join("token.json"),
        valid_token("test-token"),
    ))
}

pub fn test_config(dir: &Path, classroom_url: &str, drive_url: &str) -> Config {
    Config {
        credentials: dir.join("credentials.json"),
        token: dir.join("token.json"),
        user_cache: dir.join("user_cache.json"),
        downloads: dir.join("downloads"),
        classroom_url: classroom_url.into(),
        drive_url: drive_url.into(),
    }
}

pub fn course(id: &str, name: &str) -> Course {
    Course {
        id: id.into(),
        name: name.into(),
    }
}

pub fn course_work(course_id: &str, id: &str, title: &str) -> CourseWork {
    CourseWork {
        id: id.into(),
        title: title.into(),
        course_id: course_id.into(),
    }
}

pub fn user(id: &str, full_name: &str) -> UserProfile {
    UserProfile {
        id: id.into(),
        name: UserName {
            full_name: full_name.into(),
            given_name: None,
            family_name: None,
        },
        email_address: None,
        other: Default::default(),
    }
}

pub fn submission(user_id: &str, attachments: serde_json::Value) -> StudentSubmission {
    serde_json::from_value(serde_json::json!({
        "id": format!("sub-{user_id}"),
        "userId": user_id,
        "assignmentSubmission": { "attachments": attachments },
    }))
    .unwrap()
}

pub async fn mount_profile(server: &MockServer, id: &str, full_name: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/userProfiles/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": id,
            "name": { "fullName": full_name, "givenName": "given" },
            "emailAddress": format!("{id}@school.example"),
        })))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_media(server: &MockServer, id: &str, body: &[u8], times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/drive/v3/files/{id}")))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_not_downloadable(server: &MockServer, id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/drive/v3/files/{id}")))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {
                "code": 403,
                "message": "Only files with binary content can be downloaded. Use Export with Docs Editors files.",
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_export(server: &MockServer, id: &str, body: &[u8], times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/drive/v3/files/{id}/export")))
        .and(query_param("mimeType", PDF))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(times)
        .mount(server)
        .await;
}
