use std::fmt;

use chrono::{DateTime, TimeZone};

use super::JobId;

const FALLBACK_FILENAME: &str = "upload";
const TRANSCRIPT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Object key relative to a store's root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    /// `<job_id>_<filename>`, unique per job so concurrent uploads never collide.
    pub fn for_upload(job_id: &JobId, filename: &str) -> Self {
        Self(format!("{}_{}", job_id, filename))
    }

    /// `<timestamp>_<upload name>.txt`
    pub fn for_transcript<Tz>(timestamp: &DateTime<Tz>, upload_path: &StoragePath) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self(format!(
            "{}_{}.txt",
            timestamp.format(TRANSCRIPT_TIMESTAMP_FORMAT),
            upload_path.as_str()
        ))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reduces a client-supplied filename to its last path component.
pub fn upload_filename(raw: Option<&str>) -> String {
    let name = raw
        .and_then(|n| n.rsplit(['/', '\\']).next())
        .map(str::trim)
        .unwrap_or_default();

    if name.is_empty() || name == "." || name == ".." {
        FALLBACK_FILENAME.to_string()
    } else {
        name.to_string()
    }
}
