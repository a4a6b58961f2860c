use std::{io::Write, sync::Arc};

use anyhow::Context;
use tokio::io::AsyncBufRead;

use crate::{
    config::Config,
    error::Result,
    google::{self, Authenticator, ClassroomClient, Course, CourseWork, DriveClient},
    resolve::AttachmentResolver,
    say,
    select::{AssignmentChoice, Selector},
    types::Summary,
    users::UserCache,
};

/// One interactive session: log in, pick a course and an assignment, and
/// download every submitted Drive file.
pub async fn run<R>(config: &Config, input: R, out: &mut dyn Write) -> anyhow::Result<Summary>
where
    R: AsyncBufRead + Unpin,
{
    let http = google::http_client()?;
    let auth = Arc::new(
        Authenticator::obtain(http.clone(), config)
            .await
            .context("Could not log in to Google")?,
    );

    let classroom = ClassroomClient::new(http.clone(), &config.classroom_url, auth.clone());
    let drive = DriveClient::new(http, &config.drive_url, auth);
    let mut users = UserCache::load(&config.user_cache).await?;
    let mut selector = Selector::new(input);

    let courses = classroom
        .list_courses()
        .await
        .context("Could not list courses")?;
    if courses.is_empty() {
        say!(out, "No courses found.");
        return Ok(Summary::default());
    }

    let course = selector
        .choose(out, "Which course would you like to access:", &courses, |c| {
            c.name.as_str()
        })
        .await?;

    let works = classroom
        .list_course_work(&course.id)
        .await
        .with_context(|| format!("Could not list course works of '{}'", course.name))?;
    if works.is_empty() {
        say!(out, "No course works found.");
        return Ok(Summary::default());
    }

    let menu = AssignmentChoice::menu(&works);
    let choice = selector
        .choose(
            out,
            "Which course work would you like to access:",
            &menu,
            AssignmentChoice::label,
        )
        .await?;

    let resolver = AttachmentResolver::new(&drive, &config.downloads);
    let mut summary = Summary::default();

    for work in choice.expand(&works) {
        let s = download_course_work(&classroom, &resolver, &mut users, out, course, work)
            .await
            .with_context(|| format!("Could not download submissions for '{}'", work.title))?;
        summary.add(s);
    }

    tracing::info!(
        downloaded = summary.downloaded,
        exported = summary.exported,
        already_downloaded = summary.already_downloaded,
        unknown_attachments = summary.unknown_attachments,
        missing_attachments = summary.missing_attachments,
        "Finished"
    );

    Ok(summary)
}

/// Fetches the attachments of every submission to `work`.
pub async fn download_course_work(
    classroom: &ClassroomClient,
    resolver: &AttachmentResolver<'_>,
    users: &mut UserCache,
    out: &mut dyn Write,
    course: &Course,
    work: &CourseWork,
) -> Result<Summary> {
    let mut summary = Summary::default();

    let submissions = classroom.list_submissions(&work.course_id, &work.id).await?;
    tracing::info!(course_work = %work.title, submissions = submissions.len(), "Listed submissions");
    if submissions.is_empty() {
        say!(out, "No submissions found.");
        return Ok(summary);
    }

    for submission in &submissions {
        let user = users.resolve(classroom, &submission.user_id).await?;
        let s = resolver
            .resolve_submission(out, course, work, user, submission)
            .await?;
        summary.add(s);
    }

    Ok(summary)
}
