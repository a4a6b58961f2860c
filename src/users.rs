use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use tokio::fs;

use crate::{
    error::{Error, Result},
    google::{ClassroomClient, UserProfile},
};

/// User profiles keyed by user id, backed by a JSON file so that later runs
/// skip the profile lookups.
#[derive(Debug)]
pub struct UserCache {
    path: PathBuf,
    entries: BTreeMap<String, UserProfile>,
}

impl UserCache {
    /// A missing file yields an empty cache.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let mut entries: BTreeMap<String, UserProfile> = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| Error::json(&path, e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(Error::io(&path, e)),
        };

        // Entries may omit the id; the key holds it.
        for (id, profile) in entries.iter_mut() {
            if profile.id.is_empty() {
                profile.id = id.clone();
            }
        }

        tracing::debug!(path = %path.display(), users = entries.len(), "Loaded user cache");
        Ok(Self { path, entries })
    }

    pub fn get(&self, user_id: &str) -> Option<&UserProfile> {
        self.entries.get(user_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached profile, looking it up remotely on a miss. Every
    /// new entry is flushed to disk before this returns.
    pub async fn resolve(
        &mut self,
        classroom: &ClassroomClient,
        user_id: &str,
    ) -> Result<&UserProfile> {
        if !self.entries.contains_key(user_id) {
            let profile = classroom.user_profile(user_id).await?;
            self.entries.insert(user_id.to_string(), profile);
            self.flush().await?;
        }

        Ok(&self.entries[user_id])
    }

    /// Rewrites the whole cache file.
    pub async fn flush(&self) -> Result<()> {
        let json = serde_json::to_vec(&self.entries).map_err(|e| Error::json(&self.path, e))?;
        let tmp = tmp_path(&self.path);

        fs::write(&tmp, json)
            .await
            .map_err(|e| Error::io(&tmp, e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::io(&self.path, e))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
