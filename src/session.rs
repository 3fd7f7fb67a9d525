use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const IDENTITY_FILE: &str = "travel-quiz.identity";

/// The player the client is currently acting for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userName")]
    pub user_name: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), user_name: user_name.into() }
    }
}

/// Local identity cache. Holds at most one identity; establishing a new one
/// replaces the old one outright.
#[derive(Debug)]
pub struct SessionStore {
    current: Option<Identity>,
    /// Backing file, `None` for a purely in-memory store.
    path: Option<PathBuf>,
}

impl SessionStore {
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self { current: None, path: None }
    }

    /// Open the store at `path`, picking up whatever identity it holds.
    pub fn load(path: PathBuf) -> Self {
        let current = read_identity(&path);
        if let Some(identity) = &current {
            info!(user_id = %identity.user_id, "restored cached identity");
        }
        Self { current, path: Some(path) }
    }

    /// Default location, next to the executable.
    pub fn default_path() -> PathBuf {
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                return dir.join(IDENTITY_FILE);
            }
        }
        PathBuf::from(IDENTITY_FILE)
    }

    pub fn current(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    pub fn establish(&mut self, identity: Identity) {
        info!(user_id = %identity.user_id, "identity established");
        self.current = Some(identity);
        self.write_file();
    }

    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            info!("identity cleared");
        }
        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => warn!(path = %path.display(), error = %err, "could not remove identity file"),
            }
        }
    }

    fn write_file(&self) {
        let (Some(path), Some(identity)) = (&self.path, &self.current) else { return };
        let result = serde_json::to_vec(identity)
            .map_err(io::Error::from)
            .and_then(|bytes| fs::write(path, bytes));
        if let Err(err) = result {
            warn!(path = %path.display(), error = %err, "could not persist identity");
        }
    }
}

fn read_identity(path: &Path) -> Option<Identity> {
    let data = fs::read(path).ok()?;
    match serde_json::from_slice::<Identity>(&data) {
        Ok(identity) if !identity.user_id.is_empty() => Some(identity),
        Ok(_) => None,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "ignoring unreadable identity file");
            None
        }
    }
}
