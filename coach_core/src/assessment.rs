//! Movement-screen assessment store.
//!
//! Assessments live in one JSON file per user under a directory
//! (`<dir>/<user_id>.json`). A file holds either a single assessment or an
//! array of them; the most recent by `assessed_at` is the one used.

use crate::{AssessmentResult, Error, Result};
use fs2::FileExt;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Source of the latest assessment for a user
pub trait AssessmentStore {
    /// `Ok(None)` when the user has never been assessed
    fn latest_assessment(&self, user_id: &str) -> Result<Option<AssessmentResult>>;
}

/// Store with no assessments on file
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAssessments;

impl AssessmentStore for NoAssessments {
    fn latest_assessment(&self, _user_id: &str) -> Result<Option<AssessmentResult>> {
        Ok(None)
    }
}

/// Fixed assessment returned for every user
impl AssessmentStore for AssessmentResult {
    fn latest_assessment(&self, _user_id: &str) -> Result<Option<AssessmentResult>> {
        Ok(Some(self.clone()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AssessmentFile {
    Many(Vec<AssessmentResult>),
    One(AssessmentResult),
}

impl AssessmentFile {
    fn into_vec(self) -> Vec<AssessmentResult> {
        match self {
            AssessmentFile::Many(v) => v,
            AssessmentFile::One(a) => vec![a],
        }
    }
}

/// Directory of per-user assessment files
#[derive(Clone, Debug)]
pub struct AssessmentDir {
    dir: PathBuf,
}

impl AssessmentDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding `user_id`'s assessments
    pub fn path_for(&self, user_id: &str) -> Result<PathBuf> {
        let valid = !user_id.is_empty()
            && user_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::Other(format!("Invalid user id: {:?}", user_id)));
        }
        Ok(self.dir.join(format!("{}.json", user_id)))
    }

    fn read_all(&self, path: &Path) -> Result<Vec<AssessmentResult>> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::AssessmentUnavailable(format!("failed to read {:?}: {}", path, e))
        })?;

        let file: AssessmentFile = serde_json::from_str(&contents).map_err(|e| {
            Error::AssessmentUnavailable(format!("failed to parse {:?}: {}", path, e))
        })?;

        Ok(file.into_vec())
    }

    /// Lock file serializing writers for `user_id`
    fn lock_path_for(&self, user_id: &str) -> Result<PathBuf> {
        let path = self.path_for(user_id)?;
        Ok(path.with_extension("json.lock"))
    }

    /// Existing assessments for a write. A file that cannot be read is moved
    /// aside to `<user_id>.json.bak` and the history starts over.
    fn existing_for_write(&self, path: &Path) -> Result<Vec<AssessmentResult>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        match self.read_all(path) {
            Ok(all) => Ok(all),
            Err(e) => {
                let backup = path.with_extension("json.bak");
                tracing::warn!(
                    "{}. Moving it to {:?} and starting a fresh history.",
                    e,
                    backup
                );
                std::fs::rename(path, &backup)?;
                Ok(Vec::new())
            }
        }
    }

    /// Append an assessment to the user's file.
    ///
    /// Writers hold an exclusive lock on `<user_id>.json.lock` for the whole
    /// read-modify-write. The file is rewritten through a temp file and
    /// renamed into place.
    pub fn record(&self, user_id: &str, assessment: &AssessmentResult) -> Result<()> {
        assessment.validate()?;
        let path = self.path_for(user_id)?;
        std::fs::create_dir_all(&self.dir)?;

        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path_for(user_id)?)?;
        lock.lock_exclusive()?;

        let mut all = self.existing_for_write(&path)?;
        all.push(assessment.clone());

        let temp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, &all)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        lock.unlock()?;

        tracing::info!("Recorded assessment for {} ({} on file)", user_id, all.len());
        Ok(())
    }
}

impl AssessmentStore for AssessmentDir {
    fn latest_assessment(&self, user_id: &str) -> Result<Option<AssessmentResult>> {
        let path = self.path_for(user_id)?;
        if !path.exists() {
            tracing::debug!("No assessment file found at {:?}", path);
            return Ok(None);
        }

        let latest = self
            .read_all(&path)?
            .into_iter()
            .max_by_key(|a| a.assessed_at);

        if let Some(ref assessment) = latest {
            assessment.validate()?;
            tracing::info!(
                "Loaded assessment for {} from {}",
                user_id,
                assessment.assessed_at
            );
        }

        Ok(latest)
    }
}
