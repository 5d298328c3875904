use std::collections::BTreeMap;
use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;

use crate::domain::{RawRecord, UserId};
use crate::error::GymError;

pub trait WorkoutStore: Send + Sync {
    fn fetch_records(&self, user: &UserId) -> Result<Vec<RawRecord>, GymError>;

    fn display_name(&self, user: &UserId) -> Result<Option<String>, GymError>;
}

impl<T: WorkoutStore + ?Sized> WorkoutStore for Box<T> {
    fn fetch_records(&self, user: &UserId) -> Result<Vec<RawRecord>, GymError> {
        (**self).fetch_records(user)
    }

    fn display_name(&self, user: &UserId) -> Result<Option<String>, GymError> {
        (**self).display_name(user)
    }
}

/// Worksheet export on disk:
///
/// ```text
/// <root>/worksheets/<user>.json   JSON array of row objects
/// <root>/profiles.json            {"<user>": "<display name>"}
/// ```
#[derive(Debug, Clone)]
pub struct DirStore {
    root: Utf8PathBuf,
}

impl DirStore {
    pub fn new() -> Result<Self, GymError> {
        let root = BaseDirs::new()
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.data_dir().join("gymbot")).ok())
            .ok_or_else(|| {
                GymError::SourceUnavailable("unable to resolve data directory".to_string())
            })?;
        Ok(Self { root })
    }

    pub fn new_with_root(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn worksheets_dir(&self) -> Utf8PathBuf {
        self.root.join("worksheets")
    }

    pub fn worksheet_path(&self, user: &UserId) -> Utf8PathBuf {
        self.worksheets_dir().join(format!("{user}.json"))
    }

    pub fn profiles_path(&self) -> Utf8PathBuf {
        self.root.join("profiles.json")
    }
}

impl WorkoutStore for DirStore {
    fn fetch_records(&self, user: &UserId) -> Result<Vec<RawRecord>, GymError> {
        if !self.root.as_std_path().is_dir() {
            return Err(GymError::SourceUnavailable(format!(
                "store directory {} does not exist",
                self.root
            )));
        }
        let path = self.worksheet_path(user);
        let content = match fs::read_to_string(path.as_std_path()) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(GymError::ProfileNotFound(user.to_string()));
            }
            Err(_) => return Err(GymError::StoreRead(path.into_std_path_buf())),
        };
        let records: Vec<RawRecord> = serde_json::from_str(&content)
            .map_err(|err| GymError::StoreParse(format!("{path}: {err}")))?;
        tracing::debug!(user = %user, rows = records.len(), "worksheet loaded");
        Ok(records)
    }

    fn display_name(&self, user: &UserId) -> Result<Option<String>, GymError> {
        let path = self.profiles_path();
        if !path.as_std_path().exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|_| GymError::StoreRead(path.clone().into_std_path_buf()))?;
        let profiles: BTreeMap<String, String> = serde_json::from_str(&content)
            .map_err(|err| GymError::StoreParse(format!("{path}: {err}")))?;
        Ok(profiles
            .get(user.as_str())
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths() {
        let store = DirStore::new_with_root(Utf8PathBuf::from("/srv/gymbot"));
        let user: UserId = "5511999990000".parse().unwrap();
        assert!(
            store
                .worksheet_path(&user)
                .ends_with("worksheets/5511999990000.json")
        );
        assert!(store.profiles_path().ends_with("profiles.json"));
    }
}
