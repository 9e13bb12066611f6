mod audio_chunk;
mod job_id;
mod job_record;
mod storage_path;
mod transcription_job;

pub use audio_chunk::AudioChunk;
pub use job_id::JobId;
pub use job_record::{JobRecord, JobRecordError};
pub use storage_path::{StoragePath, upload_filename};
pub use transcription_job::TranscriptionJob;
