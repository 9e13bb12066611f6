use super::{JobId, StoragePath};

/// Everything a runner needs to drive one submitted upload to a terminal state.
#[derive(Debug, Clone)]
pub struct TranscriptionJob {
    pub id: JobId,
    pub filename: String,
    pub upload_path: StoragePath,
}

impl TranscriptionJob {
    pub fn new(id: JobId, filename: String) -> Self {
        let upload_path = StoragePath::for_upload(&id, &filename);
        Self {
            id,
            filename,
            upload_path,
        }
    }
}
