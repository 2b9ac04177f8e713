//! Signed-in session persisted between invocations.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use fieldsched_model::{AuthState, Session};
use tracing::{debug, warn};

use crate::config::project_dirs;

const SESSION_FILENAME: &str = "session.json";

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data folder.
    pub fn default_location() -> Result<Self> {
        match project_dirs() {
            Some(dirs) => Ok(Self::new(dirs.data_dir().join(SESSION_FILENAME))),
            None => bail!("could not determine data folder for the session file"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current auth state. An expired session reads as signed out.
    pub fn load(&self) -> Result<AuthState> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(AuthState::SignedOut);
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("read session {}", self.path.display()));
            }
        };
        let session: Session = serde_json::from_str(&content)
            .with_context(|| format!("parse session {}", self.path.display()))?;
        if session.is_expired_at(Utc::now()) {
            warn!("stored session has expired; sign in again");
            return Ok(AuthState::SignedOut);
        }
        Ok(AuthState::SignedIn(session))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(session)?;
        let mut file = open_private(&self.path)
            .with_context(|| format!("open session {}", self.path.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("write session {}", self.path.display()))?;
        debug!(path = %self.path.display(), "saved session");
        Ok(())
    }

    /// Remove the stored session. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(error) => {
                Err(error).with_context(|| format!("remove session {}", self.path.display()))
            }
        }
    }
}

/// Open the session file for writing, owner read/write only. The token is
/// never on disk with wider permissions.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten a file left by an older build.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
