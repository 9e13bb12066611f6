use std::sync::{Arc, Mutex};
use std::time::Duration;

use chunkscribe::application::ports::{AudioChunker, AudioChunkerError};
use chunkscribe::application::services::estimate_remaining_secs;
use chunkscribe::domain::AudioChunk;
use chunkscribe::infrastructure::audio::SymphoniaAudioChunker;
use chunkscribe::domain::StoragePath;
use chunkscribe::infrastructure::audio::MockTranscriptionEngine;
use chunkscribe::infrastructure::storage::MockTranscriptStore;

use crate::helpers::{
    PipelineOptions, TEST_SAMPLE_RATE, build_wav, pipeline, pipeline_with, upload_stream,
    wait_for_terminal,
};

#[test]
fn given_first_of_three_chunks_when_estimating_then_two_averages_remain() {
    assert_eq!(estimate_remaining_secs(10.0, 3, 0), 20.0);
    assert_eq!(estimate_remaining_secs(9.0, 4, 2), 3.0);
}

#[test]
fn given_last_chunk_when_estimating_then_nothing_remains() {
    assert_eq!(estimate_remaining_secs(42.0, 3, 2), 0.0);
}

#[tokio::test]
async fn given_forty_second_upload_when_processed_then_three_chunks_are_transcribed_in_order() {
    let engine = Arc::new(MockTranscriptionEngine::with_script(["hello", "world", "end"]));
    let test = pipeline(engine.clone());
    let wav = build_wav(40.0, TEST_SAMPLE_RATE, 1000);

    let id = test
        .service
        .submit(Some("talk.wav"), upload_stream(wav))
        .await
        .unwrap();
    let record = wait_for_terminal(&test.service, id).await;

    assert!(record.is_complete());
    assert!(record.error().is_none());
    assert_eq!(record.total_chunks(), 3);
    assert_eq!(record.processed_chunks(), 3);
    assert_eq!(record.progress(), 100.0);
    assert_eq!(record.remaining_time(), 0.0);
    assert_eq!(record.transcript(), "hello\nworld\nend\n");
    assert_eq!(engine.call_count(), 3);
}

#[tokio::test]
async fn given_completed_job_when_finished_then_transcript_is_persisted_under_timestamped_name() {
    let engine = Arc::new(MockTranscriptionEngine::with_script(["only chunk"]));
    let test = pipeline(engine);

    let id = test
        .service
        .submit(Some("memo.wav"), upload_stream(build_wav(2.0, TEST_SAMPLE_RATE, 500)))
        .await
        .unwrap();
    wait_for_terminal(&test.service, id).await;

    let saved = test.transcript_store.saved().await;
    assert_eq!(saved.len(), 1);
    let (path, transcript) = &saved[0];
    assert!(path.as_str().ends_with(&format!("_{}_memo.wav.txt", id)));
    assert_eq!(transcript, "only chunk\n");
}

#[tokio::test]
async fn given_engine_failure_on_second_chunk_when_processed_then_job_fails_with_partial_transcript()
{
    let engine = Arc::new(
        MockTranscriptionEngine::with_script(["hello", "world", "end"]).failing_at(1),
    );
    let test = pipeline(engine.clone());

    let id = test
        .service
        .submit(Some("talk.wav"), upload_stream(build_wav(40.0, TEST_SAMPLE_RATE, 1000)))
        .await
        .unwrap();
    let record = wait_for_terminal(&test.service, id).await;

    assert!(!record.is_complete());
    assert_eq!(record.total_chunks(), 3);
    assert_eq!(record.processed_chunks(), 1);
    assert_eq!(record.transcript(), "hello\n");
    let error = record.error().unwrap();
    assert!(error.starts_with("chunk 2"), "unexpected error: {}", error);
    assert_eq!(engine.call_count(), 2);
    assert!(test.transcript_store.saved().await.is_empty());
}

#[tokio::test]
async fn given_undecodable_upload_when_processed_then_job_fails_before_any_chunk() {
    let engine = Arc::new(MockTranscriptionEngine::new());
    let test = pipeline(engine.clone());
    let garbage = b"definitely not an audio container".to_vec();

    let id = test
        .service
        .submit(Some("notes.txt"), upload_stream(garbage))
        .await
        .unwrap();
    let record = wait_for_terminal(&test.service, id).await;

    assert!(!record.is_complete());
    assert!(record.error().unwrap().starts_with("decoding"));
    assert_eq!(record.total_chunks(), 0);
    assert_eq!(record.processed_chunks(), 0);
    assert_eq!(record.progress(), 0.0);
    assert_eq!(engine.call_count(), 0);
}

#[tokio::test]
async fn given_failing_transcript_store_when_job_finishes_then_job_still_completes() {
    let engine = Arc::new(MockTranscriptionEngine::with_script(["kept in memory"]));
    let test = pipeline_with(
        engine,
        PipelineOptions {
            transcript_store: Arc::new(MockTranscriptStore::failing()),
            ..PipelineOptions::default()
        },
    );

    let id = test
        .service
        .submit(Some("memo.wav"), upload_stream(build_wav(3.0, TEST_SAMPLE_RATE, 800)))
        .await
        .unwrap();
    let record = wait_for_terminal(&test.service, id).await;

    assert!(record.is_complete());
    assert!(record.error().is_none());
    assert_eq!(record.transcript(), "kept in memory\n");
}

#[tokio::test]
async fn given_cleanup_enabled_when_job_finishes_then_staged_upload_is_deleted() {
    let engine = Arc::new(MockTranscriptionEngine::new());
    let test = pipeline_with(
        engine,
        PipelineOptions {
            delete_upload_after_processing: true,
            ..PipelineOptions::default()
        },
    );

    let id = test
        .service
        .submit(Some("memo.wav"), upload_stream(build_wav(1.0, TEST_SAMPLE_RATE, 800)))
        .await
        .unwrap();
    wait_for_terminal(&test.service, id).await;

    let upload = StoragePath::for_upload(&id, "memo.wav");
    assert!(!test.staging_store.contains(&upload).await);
}

#[tokio::test]
async fn given_cleanup_disabled_when_job_finishes_then_staged_upload_is_kept() {
    let test = pipeline(Arc::new(MockTranscriptionEngine::new()));

    let id = test
        .service
        .submit(Some("memo.wav"), upload_stream(build_wav(1.0, TEST_SAMPLE_RATE, 800)))
        .await
        .unwrap();
    wait_for_terminal(&test.service, id).await;

    let upload = StoragePath::for_upload(&id, "memo.wav");
    assert!(test.staging_store.contains(&upload).await);
}

#[tokio::test]
async fn given_short_chunks_when_polling_then_observed_state_never_regresses() {
    let engine = Arc::new(MockTranscriptionEngine::new().with_delay(Duration::from_millis(30)));
    let test = pipeline_with(
        engine,
        PipelineOptions {
            chunk_duration: Duration::from_secs(1),
            ..PipelineOptions::default()
        },
    );

    let id = test
        .service
        .submit(Some("steps.wav"), upload_stream(build_wav(5.0, TEST_SAMPLE_RATE, 300)))
        .await
        .unwrap();

    let mut snapshots = Vec::new();
    tokio::time::timeout(Duration::from_secs(20), async {
        loop {
            let record = test.service.progress(id).await.unwrap();
            let done = record.is_terminal();
            snapshots.push(record);
            if done {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    for pair in snapshots.windows(2) {
        let (before, after) = (&pair[0], &pair[1]);
        assert!(after.processed_chunks() >= before.processed_chunks());
        assert!(after.progress() >= before.progress());
        assert!(after.elapsed_time() >= before.elapsed_time());
        assert!(after.transcript().starts_with(before.transcript()));
    }

    for record in &snapshots {
        assert!(record.processed_chunks() <= record.total_chunks() || record.total_chunks() == 0);
        if record.total_chunks() > 0 {
            let expected =
                record.processed_chunks() as f64 / record.total_chunks() as f64 * 100.0;
            assert!((record.progress() - expected).abs() < 1e-9);
        }
        assert_eq!(record.transcript().matches('\n').count(), record.processed_chunks());
    }

    let last = snapshots.last().unwrap();
    assert!(last.is_complete());
    assert_eq!(last.total_chunks(), 5);
}

/// Records the size of every buffer it is handed, then splits it for real.
#[derive(Default)]
struct RecordingChunker {
    received: Mutex<Vec<usize>>,
}

impl AudioChunker for RecordingChunker {
    fn split(
        &self,
        data: Vec<u8>,
        chunk_duration: Duration,
    ) -> Result<Vec<AudioChunk>, AudioChunkerError> {
        self.received.lock().unwrap().push(data.len());
        SymphoniaAudioChunker::new().split(data, chunk_duration)
    }
}

#[tokio::test]
async fn given_staged_upload_when_splitting_then_chunker_takes_the_whole_buffer() {
    let chunker = Arc::new(RecordingChunker::default());
    let test = pipeline_with(
        Arc::new(MockTranscriptionEngine::new()),
        PipelineOptions {
            chunker: chunker.clone(),
            ..PipelineOptions::default()
        },
    );
    let wav = build_wav(2.0, TEST_SAMPLE_RATE, 700);
    let upload_len = wav.len();

    let id = test
        .service
        .submit(Some("memo.wav"), upload_stream(wav))
        .await
        .unwrap();
    let record = wait_for_terminal(&test.service, id).await;

    assert!(record.is_complete());
    assert_eq!(*chunker.received.lock().unwrap(), vec![upload_len]);
}
