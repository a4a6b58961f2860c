use std::path::Path;

use tempfile::TempPath;
use tokio::fs;

use crate::error::{Error, Result};

/// A file that exists and is not empty counts as downloaded.
pub async fn is_downloaded(path: &Path) -> Result<bool> {
    match fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_file() && meta.len() > 0),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| Error::io(path, e))
}

/// Creates a hidden, uniquely named file next to `dst` for a download in
/// progress. The file is removed when the returned `TempPath` is dropped
/// unless it is persisted onto `dst` first.
pub fn staging_file(dst: &Path) -> Result<(fs::File, TempPath)> {
    let dir = match dst.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let staged = tempfile::Builder::new()
        .prefix(".")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| Error::io(dir, e))?;
    let (file, path) = staged.into_parts();

    Ok((fs::File::from_std(file), path))
}

/// Moves a finished staging file onto `dst`, replacing whatever is there.
pub fn persist(staged: TempPath, dst: &Path) -> Result<()> {
    staged.persist(dst).map_err(|e| Error::io(dst, e.error))
}
