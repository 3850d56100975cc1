//! File gateway for the UI asset tree.
//!
//! Every path from the session is joined onto one fixed root. Parent
//! segments (`..`) are passed through unchecked, so a session can reach
//! anything the process can; see DESIGN.md.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{RouteError, RouteResult};
use crate::router::{file_frame, file_list_frame, GET_FILE, GET_FILE_LIST, PUT_FILE};

#[derive(Debug, Clone)]
pub struct FileGateway {
    root: PathBuf,
}

impl FileGateway {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a session-supplied path. A leading `/` still
    /// means "relative to the root".
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    /// List a directory, replying `FileList|<name>|<name>...` sorted by name.
    pub async fn list(&self, path: &str) -> RouteResult<String> {
        let dir = self.resolve(path);
        debug!(path = %dir.display(), "Listing directory");

        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| RouteError::file(GET_FILE_LIST, path, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RouteError::file(GET_FILE_LIST, path, e))?
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        Ok(file_list_frame(&names))
    }

    /// Read a file, replying `File|<contents>`.
    pub async fn read(&self, path: &str) -> RouteResult<String> {
        let file = self.resolve(path);
        debug!(path = %file.display(), "Reading file");

        let bytes = tokio::fs::read(&file)
            .await
            .map_err(|e| RouteError::file(GET_FILE, path, e))?;

        Ok(file_frame(&String::from_utf8_lossy(&bytes)))
    }

    /// Write `contents` verbatim, replacing any existing file.
    pub async fn write(&self, path: &str, contents: &str) -> RouteResult<()> {
        let file = self.resolve(path);
        debug!(path = %file.display(), bytes = contents.len(), "Writing file");

        tokio::fs::write(&file, contents)
            .await
            .map_err(|e| RouteError::file(PUT_FILE, path, e))
    }
}
