use crate::client::QnapError;
use crate::entities::FileEntry;
use byte_unit::{Byte, UnitType};

/// Splits a path into its directory and file name at the last `/`
///
/// `"/a/b/c.txt"` gives `("/a/b", "c.txt")`, `"/c.txt"` gives `("/", "c.txt")`
/// and a path without a separator has an empty directory.
#[must_use]
pub fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(0) => ("/", &path[1..]),
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// Upload progress token: the destination path with every `/` replaced by `-`
///
/// Distinct paths can map to the same token (`/a-b/c` and `/a/b-c`).
#[must_use]
pub fn progress_token(path: &str) -> String {
    path.replace('/', "-")
}

/// Parent directory and leaf folder of a directory to create
///
/// # Errors
///
/// Returns [`QnapError::InvalidInput`] when the target is empty or has no parent directory.
pub fn mkdir_target(target: &str) -> Result<(&str, &str), QnapError> {
    let trimmed = target.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(QnapError::InvalidInput(format!(
            "Directory path cannot be empty or root, got: {target:?}"
        )));
    }
    match trimmed.rsplit_once('/') {
        Some((_, "")) | None => Err(QnapError::InvalidInput(format!(
            "Directory path must contain a parent directory, got: {target:?}"
        ))),
        Some(("", leaf)) => Ok(("/", leaf)),
        Some((parent, leaf)) => Ok((parent, leaf)),
    }
}

/// Intermediate directories to create before `target`, shortest first
///
/// The first segment (the share) is never included, nor is `target` itself.
#[must_use]
pub fn intermediate_dirs(target: &str) -> Vec<&str> {
    let trimmed = target.trim_end_matches('/');
    trimmed
        .match_indices('/')
        .map(|(idx, _)| &trimmed[..idx])
        .filter(|prefix| !prefix.is_empty() && !prefix.ends_with('/'))
        .filter(|prefix| prefix.trim_start_matches('/').contains('/'))
        .collect()
}

impl FileEntry {
    #[must_use]
    pub fn human_size(&self) -> String {
        let size = Byte::from(self.size);
        format!("{:#.2}", size.get_appropriate_unit(UnitType::Decimal))
    }

    /// Modification time as `YYYY-MM-DD HH:MM:SS` UTC, or the NAS-formatted value
    #[must_use]
    pub fn modified_display(&self) -> String {
        self.modified
            .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
            .or_else(|| self.mt.clone())
            .unwrap_or_default()
    }
}
