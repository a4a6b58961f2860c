use std::{
    io::Write,
    path::{Path, PathBuf},
};

use futures::TryStreamExt;
use unwrap_or::unwrap_some_or;

use crate::{
    error::Result,
    google::{Course, CourseWork, DriveClient, Media, StudentSubmission, UserProfile, PDF},
    local,
    materialize::materialize,
    say,
    types::Summary,
    utils::sanitize,
};

/// Decides, attachment by attachment, whether a submission file still has to
/// be fetched and fetches it.
pub struct AttachmentResolver<'a> {
    drive: &'a DriveClient,
    root: &'a Path,
}

impl<'a> AttachmentResolver<'a> {
    pub fn new(drive: &'a DriveClient, root: &'a Path) -> Self {
        Self { drive, root }
    }

    /// `{root}/{course}/{course work}/{student}`.
    pub fn submission_dir(&self, course: &Course, work: &CourseWork, user: &UserProfile) -> PathBuf {
        self.root
            .join(sanitize(&course.name))
            .join(sanitize(&work.title))
            .join(sanitize(user.full_name()))
    }

    pub async fn resolve_submission(
        &self,
        out: &mut dyn Write,
        course: &Course,
        work: &CourseWork,
        user: &UserProfile,
        submission: &StudentSubmission,
    ) -> Result<Summary> {
        let mut summary = Summary::default();
        let user_name = user.full_name();

        let attachments = unwrap_some_or!(submission.attachments(), {
            say!(out, "Missing attachments from {user_name}");
            summary.missing_attachments += 1;
            return Ok(summary);
        });

        let dir = self.submission_dir(course, work, user);
        local::create_dir_all(&dir).await?;

        for attachment in attachments {
            if attachment.has_unknown_kind() {
                say!(out, "Unknown type found!");
                say!(out, "{:?}", attachment.kinds());
                tracing::warn!(user = user_name, kinds = ?attachment.kinds(), "Unrecognized attachment");
                summary.unknown_attachments += 1;
            }

            let file = unwrap_some_or!(&attachment.drive_file, continue);
            let name = sanitize(&file.title);
            let path = dir.join(&name);

            if local::is_downloaded(&path).await? {
                say!(out, "Skipping {name} from {user_name} (already downloaded)");
                summary.already_downloaded += 1;
                continue;
            }

            match self.drive.get_media(&file.id).await {
                Ok(media) => {
                    self.store(out, media, &path, &name, user_name).await?;
                    summary.downloaded += 1;
                }
                Err(e) if e.is_status() => {
                    say!(out, "Cannot download file with Google Drive: {e}");
                    say!(out, "Attempting export...");
                    tracing::info!(file_id = %file.id, error = %e, "Falling back to PDF export");

                    let media = self.drive.export(&file.id, PDF).await?;
                    self.store(out, media, &path, &name, user_name).await?;
                    summary.exported += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(summary)
    }

    async fn store(
        &self,
        out: &mut dyn Write,
        media: Media,
        path: &Path,
        name: &str,
        user_name: &str,
    ) -> Result<()> {
        let progress = materialize(media.reader, media.total, path);
        futures::pin_mut!(progress);

        while let Some(p) = progress.try_next().await? {
            match p.percent() {
                Some(pct) => say!(out, "Downloading {name} from {user_name} ({pct}%)..."),
                None => say!(out, "Downloading {name} from {user_name} ({} bytes)...", p.done),
            }
        }

        tracing::debug!(path = %path.display(), "Saved");
        Ok(())
    }
}
