use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chunkscribe::application::ports::JobStoreError;
use chunkscribe::application::services::SubmissionError;
use chunkscribe::domain::JobId;
use chunkscribe::infrastructure::audio::MockTranscriptionEngine;

use crate::helpers::{
    LevelEngine, TEST_SAMPLE_RATE, build_wav, pipeline, upload_stream, wait_for_terminal,
};

#[tokio::test]
async fn given_slow_engine_when_submitting_then_record_is_visible_before_work_finishes() {
    let engine = Arc::new(MockTranscriptionEngine::new().with_delay(Duration::from_millis(300)));
    let test = pipeline(engine);

    let id = test
        .service
        .submit(Some("slow.wav"), upload_stream(build_wav(20.0, TEST_SAMPLE_RATE, 100)))
        .await
        .unwrap();
    let record = test.service.progress(id).await.unwrap();

    assert_eq!(record.processed_chunks(), 0);
    assert!(!record.is_complete());
    assert!(record.error().is_none());
}

#[tokio::test]
async fn given_unknown_id_when_reading_progress_then_not_found_is_returned() {
    let test = pipeline(Arc::new(MockTranscriptionEngine::new()));

    let result = test.service.progress(JobId::new()).await;

    assert!(matches!(result, Err(JobStoreError::NotFound(_))));
}

#[tokio::test]
async fn given_finished_job_when_reading_twice_then_records_are_identical() {
    let test = pipeline(Arc::new(MockTranscriptionEngine::with_script(["stable"])));

    let id = test
        .service
        .submit(Some("a.wav"), upload_stream(build_wav(1.0, TEST_SAMPLE_RATE, 100)))
        .await
        .unwrap();
    let first = wait_for_terminal(&test.service, id).await;
    let second = test.service.progress(id).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn given_two_concurrent_uploads_when_processed_then_transcripts_do_not_interleave() {
    let test = pipeline(Arc::new(LevelEngine));

    let quiet = build_wav(40.0, TEST_SAMPLE_RATE, 1000);
    let loud = build_wav(40.0, TEST_SAMPLE_RATE, 8000);

    let (first, second) = tokio::join!(
        test.service.submit(Some("quiet.wav"), upload_stream(quiet)),
        test.service.submit(Some("loud.wav"), upload_stream(loud)),
    );
    let (first, second) = (first.unwrap(), second.unwrap());
    assert_ne!(first, second);

    let first_record = wait_for_terminal(&test.service, first).await;
    let second_record = wait_for_terminal(&test.service, second).await;

    let mut seen_levels = Vec::new();
    for record in [&first_record, &second_record] {
        assert!(record.is_complete());
        assert_eq!(record.processed_chunks(), 3);

        let lines: HashSet<&str> = record.transcript().lines().collect();
        assert_eq!(lines.len(), 1, "mixed transcript: {:?}", record.transcript());
        seen_levels.push(lines.into_iter().next().unwrap().to_string());
    }
    assert_ne!(seen_levels[0], seen_levels[1]);
}

#[tokio::test]
async fn given_many_submissions_when_registered_then_every_id_is_unique() {
    let test = pipeline(Arc::new(MockTranscriptionEngine::new()));
    let mut ids = HashSet::new();

    for n in 0..5 {
        let id = test
            .service
            .submit(
                Some("same-name.wav"),
                upload_stream(build_wav(0.5, TEST_SAMPLE_RATE, 100 * (n + 1))),
            )
            .await
            .unwrap();
        ids.insert(id);
    }

    assert_eq!(ids.len(), 5);
    for id in ids {
        assert!(wait_for_terminal(&test.service, id).await.is_complete());
    }
}

#[tokio::test]
async fn given_empty_upload_when_submitting_then_no_job_is_created_and_bytes_are_discarded() {
    let engine = Arc::new(MockTranscriptionEngine::new());
    let test = pipeline(engine.clone());

    let result = test
        .service
        .submit(Some("empty.wav"), upload_stream(Vec::new()))
        .await;

    assert!(matches!(result, Err(SubmissionError::EmptyUpload)));
    assert!(test.job_store.is_empty().await);
    assert!(test.staging_store.is_empty().await);
    assert_eq!(engine.call_count(), 0);
}
