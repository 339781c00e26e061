use crate::client::QnapError::{InvalidInput, InvalidResponse};
use crate::client::{Qnap, QnapError, Session, UploadFile};
use crate::entities::{
    ConflictMode, CopyOptions, FileEntry, FileList, FileStationStatus, ShareNode,
};
use crate::utils::{intermediate_dirs, mkdir_target, progress_token, split_path};
use anyhow::{Context, Result};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

const DEFAULT_LIMIT: u32 = 10_000;
const UPLOAD_MIME: &str = "application/octet-stream";

/// QNAP File Station client
///
/// Every operation is a single request made through the wrapped [`Session`],
/// except [`FileStation::mkdir_rec`] which issues one request per directory.
pub struct FileStation<S = Qnap> {
    session: S,
}

impl<S: Session> FileStation<S> {
    /// Creates a File Station client on top of an authorized session
    pub fn new(session: S) -> Self {
        Self { session }
    }

    /// Underlying session, e.g. to log out
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Lists all shared folders
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is not a list of shares.
    pub async fn list_share(&self) -> Result<Vec<ShareNode>> {
        let endpoint = self.session.endpoint(
            "get_tree",
            vec![("is_iso", "0".into()), ("node", "share_root".into())],
        );
        let value = self
            .session
            .req(endpoint)
            .await
            .context("Failed to list shared folders")?;
        parse(value)
    }

    /// Lists the content of a folder, up to 10000 entries
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty, the request fails or the reply cannot be parsed.
    pub async fn list(&self, path: &str) -> Result<FileList> {
        self.list_with_limit(path, DEFAULT_LIMIT).await
    }

    /// Lists the content of a folder, up to `limit` entries
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty, the request fails or the reply cannot be parsed.
    pub async fn list_with_limit(&self, path: &str, limit: u32) -> Result<FileList> {
        require_path(path)?;
        let endpoint = self.session.endpoint(
            "get_list",
            vec![
                ("is_iso", "0".into()),
                ("limit", limit.to_string()),
                ("path", path.into()),
            ],
        );
        let value = self
            .session
            .req(endpoint)
            .await
            .with_context(|| format!("Failed to list {path}"))?;
        parse(value)
    }

    /// Gets information about a single file or folder
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty, the request fails or the NAS returns no entry.
    pub async fn get_file_info(&self, path: &str) -> Result<FileEntry> {
        require_path(path)?;
        let (dir_path, file_name) = split_path(path);
        let endpoint = self.session.endpoint(
            "stat",
            vec![("path", dir_path.into()), ("file_name", file_name.into())],
        );
        let value = self
            .session
            .req(endpoint)
            .await
            .with_context(|| format!("Failed to get file info for {path}"))?;
        parse::<FileList>(value)?
            .datas
            .into_iter()
            .next()
            .ok_or_else(|| InvalidResponse(format!("No file info returned for {path}")).into())
    }

    /// Searches files and folders under `path` whose name matches `pattern`
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty, the request fails or the reply cannot be parsed.
    pub async fn search(&self, path: &str, pattern: &str) -> Result<FileList> {
        require_path(path)?;
        let endpoint = self.session.endpoint(
            "search",
            vec![
                ("limit", DEFAULT_LIMIT.to_string()),
                ("start", "0".into()),
                ("source_path", path.into()),
                ("keyword", pattern.into()),
            ],
        );
        let value = self
            .session
            .req(endpoint)
            .await
            .with_context(|| format!("Failed to search {path} for {pattern}"))?;
        parse(value)
    }

    /// Deletes a single file or folder
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or the NAS refuses the deletion.
    pub async fn delete(&self, path: &str) -> Result<()> {
        require_path(path)?;
        let (dir_path, file_name) = split_path(path);
        let endpoint = self.session.endpoint(
            "delete",
            vec![
                ("path", dir_path.into()),
                ("file_total", "1".into()),
                ("file_name", file_name.into()),
            ],
        );
        self.session
            .req(endpoint)
            .await
            .with_context(|| format!("Failed to delete {path}"))?;
        Ok(())
    }

    /// Downloads a file
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or the transfer fails.
    pub async fn download(&self, path: &str) -> Result<Vec<u8>> {
        require_path(path)?;
        let (dir_path, file_name) = split_path(path);
        let endpoint = self.session.endpoint(
            "download",
            vec![
                ("isfolder", "0".into()),
                ("source_total", "1".into()),
                ("source_path", dir_path.into()),
                ("source_file", file_name.into()),
            ],
        );
        self.session
            .req_binary(endpoint)
            .await
            .with_context(|| format!("Failed to download {path}"))
    }

    /// Uploads `data` to `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or has no file name, or the upload is rejected.
    pub async fn upload(&self, path: &str, data: &[u8], overwrite: bool) -> Result<()> {
        require_path(path)?;
        let (dir_path, file_name) = split_path(path);
        if file_name.is_empty() {
            return Err(InvalidInput(format!(
                "Upload path must end with a file name, got: {path}"
            ))
            .into());
        }

        let endpoint = self.session.endpoint(
            "upload",
            vec![
                ("type", "standard".into()),
                ("overwrite", if overwrite { "1" } else { "0" }.into()),
                ("dest_path", dir_path.into()),
                ("progress", progress_token(path)),
            ],
        );
        let file = UploadFile {
            file_name: file_name.to_string(),
            data: data.to_vec(),
            mime: UPLOAD_MIME.to_string(),
        };
        self.session
            .req_post(endpoint, file)
            .await
            .with_context(|| format!("Failed to upload {path}"))?;
        Ok(())
    }

    /// Creates a directory; its parent must exist
    ///
    /// # Errors
    ///
    /// Returns an error if the target has no parent directory or the NAS refuses the creation.
    pub async fn mkdir(&self, target: &str) -> Result<()> {
        let (dest_path, dest_folder) = mkdir_target(target)?;
        let endpoint = self.session.endpoint(
            "createdir",
            vec![
                ("dest_folder", dest_folder.into()),
                ("dest_path", dest_path.into()),
            ],
        );
        self.session
            .req(endpoint)
            .await
            .with_context(|| format!("Failed to create directory {target}"))?;
        Ok(())
    }

    /// Creates a directory and the missing intermediate ones
    ///
    /// The share (first segment) must already exist. Intermediate directories
    /// that already exist are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the target has no parent directory or any creation fails.
    pub async fn mkdir_rec(&self, target: &str) -> Result<()> {
        mkdir_target(target)?;
        for dir in intermediate_dirs(target) {
            match self.mkdir(dir).await {
                Ok(()) => {}
                Err(e) if already_exists(&e) => debug!("Directory {dir} already exists"),
                Err(e) => return Err(e),
            }
        }
        self.mkdir(target).await
    }

    /// Copies a file or folder into `dest_dir`
    ///
    /// # Errors
    ///
    /// Returns an error if a path is empty or the NAS refuses the copy.
    pub async fn copy(&self, source: &str, dest_dir: &str, options: &CopyOptions) -> Result<()> {
        require_path(source)?;
        require_path(dest_dir)?;
        let (source_path, source_file) = split_path(source);
        let endpoint = self.session.endpoint(
            "copy",
            vec![
                ("source_file", source_file.into()),
                ("source_total", "1".into()),
                ("source_path", source_path.into()),
                ("dest_path", dest_dir.into()),
                ("mode", (options.mode as u8).to_string()),
                ("dup", options.dup.clone()),
            ],
        );
        self.session
            .req(endpoint)
            .await
            .with_context(|| format!("Failed to copy {source} to {dest_dir}"))?;
        Ok(())
    }

    /// Moves a file or folder into `dest_dir`
    ///
    /// # Errors
    ///
    /// Returns an error if a path is empty or the NAS refuses the move.
    pub async fn move_to(&self, source: &str, dest_dir: &str, mode: ConflictMode) -> Result<()> {
        require_path(source)?;
        require_path(dest_dir)?;
        let (source_path, source_file) = split_path(source);
        let endpoint = self.session.endpoint(
            "move",
            vec![
                ("source_file", source_file.into()),
                ("source_total", "1".into()),
                ("source_path", source_path.into()),
                ("dest_path", dest_dir.into()),
                ("mode", (mode as u8).to_string()),
            ],
        );
        self.session
            .req(endpoint)
            .await
            .with_context(|| format!("Failed to move {source} to {dest_dir}"))?;
        Ok(())
    }

    /// Renames a file or folder in place
    ///
    /// # Errors
    ///
    /// Returns an error if the path or new name is empty, the new name contains `/`,
    /// or the NAS refuses the rename.
    pub async fn rename(&self, path: &str, new_name: &str) -> Result<()> {
        require_path(path)?;
        if new_name.is_empty() || new_name.contains('/') {
            return Err(InvalidInput(format!("Invalid new name: {new_name:?}")).into());
        }
        let (dir_path, source_name) = split_path(path);
        let endpoint = self.session.endpoint(
            "rename",
            vec![
                ("path", dir_path.into()),
                ("source_name", source_name.into()),
                ("dest_name", new_name.into()),
            ],
        );
        self.session
            .req(endpoint)
            .await
            .with_context(|| format!("Failed to rename {path} to {new_name}"))?;
        Ok(())
    }
}

fn require_path(path: &str) -> Result<(), QnapError> {
    if path.is_empty() {
        return Err(InvalidInput("Path cannot be empty".into()));
    }
    Ok(())
}

fn parse<R: DeserializeOwned>(value: Value) -> Result<R> {
    serde_json::from_value(value)
        .map_err(|e| InvalidResponse(format!("Unexpected response shape: {e}")).into())
}

fn already_exists(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<QnapError>()
        .and_then(QnapError::status)
        == Some(FileStationStatus::FileExists)
}
