use std::path::PathBuf;

use clap::Parser;

use crate::google::{CLASSROOM_URI, DRIVE_URI};

/// Download every Drive file students attached to a Google Classroom
/// assignment.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// OAuth client secrets downloaded from the Google Cloud console
    #[arg(long, env = "CLASSROOM_DL_CREDENTIALS", default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Where the authorized token is kept between runs
    #[arg(long, env = "CLASSROOM_DL_TOKEN", default_value = "token.json")]
    pub token: PathBuf,

    /// Cache of user profiles, keyed by user id
    #[arg(long, env = "CLASSROOM_DL_USER_CACHE", default_value = "user_cache.json")]
    pub user_cache: PathBuf,

    /// Root of the downloaded folder tree
    #[arg(long, env = "CLASSROOM_DL_DOWNLOADS", default_value = "downloads")]
    pub downloads: PathBuf,

    #[arg(long, env = "CLASSROOM_DL_CLASSROOM_URL", default_value = CLASSROOM_URI, hide = true)]
    pub classroom_url: String,

    #[arg(long, env = "CLASSROOM_DL_DRIVE_URL", default_value = DRIVE_URI, hide = true)]
    pub drive_url: String,
}
