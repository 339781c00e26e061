use chrono::serde::ts_seconds_option;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_repr::Deserialize_repr;

/// Reply of `authLogin.cgi`
///
/// The NAS answers with an XML `QDocRoot` document whose values are wrapped in CDATA.
#[derive(Deserialize, Debug, Default)]
pub struct AuthResponse {
    #[serde(rename = "authPassed", default)]
    pub auth_passed: Option<String>,
    /// Session ID used for authenticated requests
    #[serde(rename = "authSid", default)]
    pub auth_sid: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "errorValue", default)]
    pub error_value: Option<String>,
}

impl AuthResponse {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.auth_passed.as_deref().map(str::trim) == Some("1")
    }

    /// Session ID, if login succeeded and the NAS returned one
    #[must_use]
    pub fn sid(&self) -> Option<&str> {
        self.auth_sid
            .as_deref()
            .map(str::trim)
            .filter(|sid| !sid.is_empty())
    }
}

/// A shared folder as returned by `get_tree`
#[derive(Deserialize, Debug, Clone)]
pub struct ShareNode {
    /// Absolute path of the share, e.g. `/Public`
    pub id: String,
    /// Display name
    pub text: String,
    /// Access class (`w` read/write, `r` read only)
    #[serde(default)]
    pub cls: Option<String>,
    #[serde(rename = "iconCls", default)]
    pub icon_cls: Option<String>,
}

/// Folder listing or search result
#[derive(Deserialize, Debug, Default)]
pub struct FileList {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub datas: Vec<FileEntry>,
}

/// A file or folder entry
#[derive(Deserialize, Debug, Clone)]
pub struct FileEntry {
    pub filename: String,
    #[serde(rename = "isfolder", default)]
    pub kind: EntryKind,
    /// Size in bytes
    #[serde(rename = "filesize", default, deserialize_with = "deserialize_size")]
    pub size: u64,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub privilege: Option<String>,
    #[serde(default)]
    pub filetype: Option<i32>,
    /// Modification time as formatted by the NAS
    #[serde(default)]
    pub mt: Option<String>,
    /// Modification time
    #[serde(rename = "epochmt", default, with = "ts_seconds_option")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exist: Option<i32>,
}

impl FileEntry {
    #[must_use]
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, EntryKind::Folder)
    }
}

/// `isfolder` flag of a [`FileEntry`]
#[derive(Deserialize_repr, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum EntryKind {
    #[default]
    File = 0,
    Folder = 1,
}

/// `filesize` arrives as a number or as a numeric string depending on the firmware.
fn deserialize_size<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    use serde::de::{Error, Unexpected};
    match Value::deserialize(d)? {
        Value::Number(n) => match (n.as_u64(), n.as_i64()) {
            (Some(size), _) => Ok(size),
            (None, Some(signed)) => Err(Error::invalid_value(
                Unexpected::Signed(signed),
                &"a non-negative integer",
            )),
            (None, None) => Err(Error::invalid_value(
                Unexpected::Float(n.as_f64().unwrap_or_default()),
                &"a non-negative integer",
            )),
        },
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::invalid_value(Unexpected::Str(&s), &"a numeric string")),
        _ => Ok(0),
    }
}

/// Status codes carried by the `status` field of File Station replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStationStatus {
    Failure,
    Success,
    FileExists,
    AuthFailure,
    PermissionDenied,
    FileNotFound,
    SourceNotFound,
    Extracting,
    OpenFailed,
    Disabled,
    QuotaExceeded,
    SourcePermissionDenied,
    DestinationPermissionDenied,
    IllegalName,
    Unknown(i64),
}

impl FileStationStatus {
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Failure,
            1 => Self::Success,
            2 => Self::FileExists,
            3 => Self::AuthFailure,
            4 => Self::PermissionDenied,
            5 => Self::FileNotFound,
            6 => Self::SourceNotFound,
            7 => Self::Extracting,
            8 => Self::OpenFailed,
            9 => Self::Disabled,
            10 => Self::QuotaExceeded,
            11 => Self::SourcePermissionDenied,
            12 => Self::DestinationPermissionDenied,
            13 => Self::IllegalName,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Failure => "operation failed",
            Self::Success => "success",
            Self::FileExists => "file already exists",
            Self::AuthFailure => "authentication failure",
            Self::PermissionDenied => "permission denied",
            Self::FileNotFound => "file does not exist",
            Self::SourceNotFound => "source file does not exist",
            Self::Extracting => "archive is being extracted",
            Self::OpenFailed => "failed to open file",
            Self::Disabled => "File Station is disabled",
            Self::QuotaExceeded => "quota exceeded",
            Self::SourcePermissionDenied => "permission denied on source",
            Self::DestinationPermissionDenied => "permission denied on destination",
            Self::IllegalName => "illegal file name",
            Self::Unknown(_) => "unknown error",
        }
    }
}

/// Conflict handling for `copy` and `move`
#[derive(Deserialize_repr, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ConflictMode {
    Overwrite = 0,
    #[default]
    Skip = 1,
}

/// Options of a copy request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOptions {
    pub mode: ConflictMode,
    /// Suffix used by the NAS when it has to duplicate a name
    pub dup: String,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            mode: ConflictMode::default(),
            dup: String::from("copy"),
        }
    }
}
