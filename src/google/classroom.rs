use std::sync::Arc;

use async_stream::try_stream;
use futures::{Stream, TryStreamExt};
use reqwest::{header::AUTHORIZATION, Client};
use serde::de::DeserializeOwned;

use super::{types::*, utils, Authenticator};
use crate::error::Result;

pub const CLASSROOM_URI: &str = "https://classroom.googleapis.com";

const COURSE_PAGE_SIZE: u32 = 1000;
const COURSE_WORK_PAGE_SIZE: u32 = 10000;
const SUBMISSION_PAGE_SIZE: u32 = 10000;

lazy_static::lazy_static! {
    static ref COURSE_FIELDS: String =
        format!("nextPageToken,courses({})", Course::fields().join(","));
    static ref COURSE_WORK_FIELDS: String =
        format!("nextPageToken,courseWork({})", CourseWork::fields().join(","));
    static ref SUBMISSION_FIELDS: String =
        format!("nextPageToken,studentSubmissions({})", StudentSubmission::fields().join(","));
}

pub struct ClassroomClient {
    http: Client,
    base_url: String,
    auth: Arc<Authenticator>,
}

impl ClassroomClient {
    pub fn new(http: Client, base_url: impl Into<String>, auth: Arc<Authenticator>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            auth,
        }
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        let url = format!("{}/v1/courses", self.base_url);

        self.list::<CourseList>(url, COURSE_FIELDS.as_str(), COURSE_PAGE_SIZE)
            .try_collect()
            .await
    }

    pub async fn list_course_work(&self, course_id: &str) -> Result<Vec<CourseWork>> {
        let url = format!("{}/v1/courses/{course_id}/courseWork", self.base_url);

        self.list::<CourseWorkList>(url, COURSE_WORK_FIELDS.as_str(), COURSE_WORK_PAGE_SIZE)
            .try_collect()
            .await
    }

    pub async fn list_submissions(
        &self,
        course_id: &str,
        course_work_id: &str,
    ) -> Result<Vec<StudentSubmission>> {
        let url = format!(
            "{}/v1/courses/{course_id}/courseWork/{course_work_id}/studentSubmissions",
            self.base_url
        );

        self.list::<SubmissionList>(url, SUBMISSION_FIELDS.as_str(), SUBMISSION_PAGE_SIZE)
            .try_collect()
            .await
    }

    pub async fn user_profile(&self, user_id: &str) -> Result<UserProfile> {
        let url = format!("{}/v1/userProfiles/{user_id}", self.base_url);
        tracing::debug!(user_id, "Fetching user profile");

        self.get_json(&url, &[]).await
    }

    /// Walks every page of a list call, one request per page.
    fn list<'a, P>(
        &'a self,
        url: String,
        fields: &'a str,
        page_size: u32,
    ) -> impl Stream<Item = Result<P::Item>> + 'a
    where
        P: Page + DeserializeOwned + 'a,
    {
        let mut next_page_token: Option<String> = None;
        let page_size = page_size.to_string();

        try_stream! {
            loop {
                let mut query = vec![("pageSize", page_size.as_str()), ("fields", fields)];
                if let Some(t) = next_page_token.as_deref() {
                    query.push(("pageToken", t));
                }

                let page = self.get_json::<P>(&url, &query).await?;
                let (items, token) = page.into_parts();
                tracing::debug!(url = %url, count = items.len(), "Fetched page");

                for item in items {
                    yield item;
                }

                match token.filter(|t| !t.is_empty()) {
                    None => break,
                    Some(t) => next_page_token = Some(t),
                };
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let res = self
            .http
            .get(url)
            .query(query)
            .header(AUTHORIZATION, self.auth.auth_header().await?)
            .send()
            .await?;

        Ok(utils::check(res).await?.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, test_helpers::*};
    use wiremock::{
        matchers::{header, method, path, query_param, query_param_is_missing},
        Mock, MockServer, ResponseTemplate,
    };

    async fn client(server: &MockServer) -> (ClassroomClient, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let auth = authenticator(dir.path());
        (ClassroomClient::new(Client::new(), server.uri(), auth), dir)
    }

    #[tokio::test]
    async fn test_list_courses() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/courses"))
            .and(query_param("pageSize", "1000"))
            .and(query_param("fields", "nextPageToken,courses(id,name)"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "courses": [
                    {"id": "c1", "name": "Physics", "section": "A"},
                    {"id": "c2", "name": "Biology"},
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (classroom, _dir) = client(&server).await;
        let courses = classroom.list_courses().await?;

        let names: Vec<_> = courses.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Physics", "Biology"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_follows_page_token() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/courses/c1/courseWork"))
            .and(query_param_is_missing("pageToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "courseWork": [{"id": "w1", "title": "Essay", "courseId": "c1"}],
                "nextPageToken": "p2",
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/courses/c1/courseWork"))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "courseWork": [{"id": "w2", "title": "Lab report", "courseId": "c1"}],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (classroom, _dir) = client(&server).await;
        let works = classroom.list_course_work("c1").await?;

        let ids: Vec<_> = works.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, ["w1", "w2"]);
        assert_eq!(works[1].course_id, "c1");
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_listing() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/courses/c1/courseWork/w1/studentSubmissions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let (classroom, _dir) = client(&server).await;
        assert!(classroom.list_submissions("c1", "w1").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_listing_failure() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/courses"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {"code": 403, "message": "The caller does not have permission"}
            })))
            .mount(&server)
            .await;

        let (classroom, _dir) = client(&server).await;
        let err = classroom.list_courses().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(err.to_string().contains("The caller does not have permission"));
        Ok(())
    }

    #[tokio::test]
    async fn test_user_profile() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        mount_profile(&server, "u1", "Ada Lovelace", 1).await;

        let (classroom, _dir) = client(&server).await;
        let user = classroom.user_profile("u1").await?;
        assert_eq!(user.full_name(), "Ada Lovelace");
        Ok(())
    }
}
