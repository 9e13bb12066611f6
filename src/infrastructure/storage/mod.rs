mod local_store;
mod local_transcript_store;
mod mock_store;

pub use local_store::LocalStagingStore;
pub use local_transcript_store::LocalTranscriptStore;
pub use mock_store::{MockStagingStore, MockTranscriptStore};
