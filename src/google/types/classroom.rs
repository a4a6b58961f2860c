use fievar::Fields;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize, Fields)]
pub struct Course {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Fields)]
pub struct CourseWork {
    pub id: String,
    pub title: String,
    #[serde(rename = "courseId")]
    #[fievar(name = "courseId")]
    pub course_id: String,
}

#[derive(Debug, Clone, Deserialize, Fields)]
pub struct StudentSubmission {
    pub id: String,
    #[serde(rename = "userId")]
    #[fievar(name = "userId")]
    pub user_id: String,
    #[serde(default, rename = "assignmentSubmission")]
    #[fievar(name = "assignmentSubmission")]
    pub assignment_submission: Option<AssignmentSubmission>,
}

impl StudentSubmission {
    /// `None` when the student attached nothing at all.
    pub fn attachments(&self) -> Option<&[Attachment]> {
        self.assignment_submission
            .as_ref()
            .and_then(|s| s.attachments.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentSubmission {
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
}

/// One attachment of a submission. Only Drive files are downloaded; links,
/// videos and forms end up in `other`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attachment {
    #[serde(default, rename = "driveFile")]
    pub drive_file: Option<DriveFileRef>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Attachment {
    /// True unless `driveFile` is the one and only key.
    pub fn has_unknown_kind(&self) -> bool {
        self.drive_file.is_none() || !self.other.is_empty()
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.drive_file
            .iter()
            .map(|_| "driveFile")
            .chain(self.other.keys().map(String::as_str))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriveFileRef {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// A user profile as stored in the user cache. Only `name.fullName` is
/// required; any other keys are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: String,
    pub name: UserName,
    #[serde(
        default,
        rename = "emailAddress",
        skip_serializing_if = "Option::is_none"
    )]
    pub email_address: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl UserProfile {
    pub fn full_name(&self) -> &str {
        &self.name.full_name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserName {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
}

/// One page of a Classroom list call.
pub trait Page {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseList {
    #[serde(default)]
    pub courses: Vec<Course>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWorkList {
    #[serde(default)]
    pub course_work: Vec<CourseWork>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionList {
    #[serde(default)]
    pub student_submissions: Vec<StudentSubmission>,
    pub next_page_token: Option<String>,
}

impl Page for CourseList {
    type Item = Course;

    fn into_parts(self) -> (Vec<Course>, Option<String>) {
        (self.courses, self.next_page_token)
    }
}

impl Page for CourseWorkList {
    type Item = CourseWork;

    fn into_parts(self) -> (Vec<CourseWork>, Option<String>) {
        (self.course_work, self.next_page_token)
    }
}

impl Page for SubmissionList {
    type Item = StudentSubmission;

    fn into_parts(self) -> (Vec<StudentSubmission>, Option<String>) {
        (self.student_submissions, self.next_page_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_kinds() -> anyhow::Result<()> {
        let a: Attachment =
            serde_json::from_str(r#"{"driveFile": {"id": "f1", "title": "essay.docx"}}"#)?;
        assert!(!a.has_unknown_kind());
        assert_eq!(a.drive_file.unwrap().title, "essay.docx");

        let a: Attachment = serde_json::from_str(r#"{"link": {"url": "https://example.com"}}"#)?;
        assert!(a.has_unknown_kind());
        assert!(a.drive_file.is_none());
        assert_eq!(a.kinds(), vec!["link"]);

        let a: Attachment = serde_json::from_str(
            r#"{"driveFile": {"id": "f1", "title": "x"}, "form": {"formUrl": "u"}}"#,
        )?;
        assert!(a.has_unknown_kind());
        assert!(a.drive_file.is_some());
        assert_eq!(a.kinds(), vec!["driveFile", "form"]);

        Ok(())
    }

    #[test]
    fn test_submission_without_attachments() -> anyhow::Result<()> {
        let s: StudentSubmission = serde_json::from_str(
            r#"{"id": "s1", "userId": "u1", "assignmentSubmission": {}}"#,
        )?;
        assert!(s.attachments().is_none());

        let s: StudentSubmission = serde_json::from_str(r#"{"id": "s1", "userId": "u1"}"#)?;
        assert!(s.attachments().is_none());

        let s: StudentSubmission = serde_json::from_str(
            r#"{"id": "s1", "userId": "u1", "assignmentSubmission": {"attachments": []}}"#,
        )?;
        assert_eq!(s.attachments().map(<[_]>::len), Some(0));
        Ok(())
    }

    #[test]
    fn test_empty_listing() -> anyhow::Result<()> {
        let l: CourseWorkList = serde_json::from_str("{}")?;
        let (items, next) = l.into_parts();
        assert!(items.is_empty());
        assert!(next.is_none());
        Ok(())
    }
}
