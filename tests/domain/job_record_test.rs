use chunkscribe::domain::{JobRecord, JobRecordError};

#[test]
fn given_new_record_when_created_then_nothing_is_processed() {
    let record = JobRecord::new(0);

    assert_eq!(record.progress(), 0.0);
    assert_eq!(record.transcript(), "");
    assert_eq!(record.processed_chunks(), 0);
    assert!(!record.is_complete());
    assert!(record.error().is_none());
    assert!(!record.is_terminal());
}

#[test]
fn given_three_chunks_when_recording_each_then_progress_tracks_ratio() {
    let mut record = JobRecord::new(0);
    record.set_total_chunks(3).unwrap();

    record.record_chunk("hello", 1.0, 2.0).unwrap();
    assert!((record.progress() - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(record.transcript(), "hello\n");

    record.record_chunk("world", 2.0, 1.0).unwrap();
    record.record_chunk("end", 3.0, 0.0).unwrap();

    assert_eq!(record.progress(), 100.0);
    assert_eq!(record.processed_chunks(), 3);
    assert_eq!(record.transcript(), "hello\nworld\nend\n");
}

#[test]
fn given_chunk_text_with_whitespace_when_recorded_then_text_is_kept_verbatim() {
    let mut record = JobRecord::new(2);

    record.record_chunk("  spaced out ", 0.5, 0.5).unwrap();
    record.record_chunk("", 1.0, 0.0).unwrap();

    assert_eq!(record.transcript(), "  spaced out \n\n");
}

#[test]
fn given_all_chunks_processed_when_recording_another_then_transition_is_refused() {
    let mut record = JobRecord::new(1);
    record.record_chunk("only", 1.0, 0.0).unwrap();

    let result = record.record_chunk("extra", 2.0, 0.0);

    assert!(matches!(result, Err(JobRecordError::InvalidTransition(_))));
    assert_eq!(record.processed_chunks(), 1);
    assert_eq!(record.transcript(), "only\n");
}

#[test]
fn given_smaller_elapsed_time_when_recording_then_elapsed_never_decreases() {
    let mut record = JobRecord::new(2);
    record.record_chunk("a", 5.0, 5.0).unwrap();

    record.record_chunk("b", 3.0, -1.0).unwrap();

    assert_eq!(record.elapsed_time(), 5.0);
    assert_eq!(record.remaining_time(), 0.0);
}

#[test]
fn given_partial_progress_when_marking_complete_then_transition_is_refused() {
    let mut record = JobRecord::new(3);
    record.record_chunk("a", 1.0, 2.0).unwrap();

    assert!(record.mark_complete().is_err());
    assert!(!record.is_complete());
}

#[test]
fn given_all_chunks_processed_when_marking_complete_then_remaining_time_is_zero() {
    let mut record = JobRecord::new(1);
    record.record_chunk("a", 1.0, 4.0).unwrap();

    record.mark_complete().unwrap();

    assert!(record.is_complete());
    assert!(record.is_terminal());
    assert_eq!(record.remaining_time(), 0.0);
}

#[test]
fn given_failed_record_when_marking_complete_then_complete_stays_false() {
    let mut record = JobRecord::new(0);
    record.mark_failed("decode failed").unwrap();

    assert!(record.mark_complete().is_err());
    assert!(!record.is_complete());
    assert_eq!(record.error(), Some("decode failed"));
}

#[test]
fn given_complete_record_when_marking_failed_then_error_is_not_set() {
    let mut record = JobRecord::new(1);
    record.record_chunk("a", 1.0, 0.0).unwrap();
    record.mark_complete().unwrap();

    assert!(record.mark_failed("late failure").is_err());
    assert!(record.error().is_none());
}

#[test]
fn given_failed_record_when_failing_again_then_first_error_wins() {
    let mut record = JobRecord::new(2);

    record.mark_failed("chunk 1: timeout").unwrap();
    record.mark_failed("second").unwrap();

    assert_eq!(record.error(), Some("chunk 1: timeout"));
}

#[test]
fn given_blank_message_when_marking_failed_then_error_is_non_empty() {
    let mut record = JobRecord::new(0);

    record.mark_failed("   ").unwrap();

    assert_eq!(record.error(), Some("unknown error"));
}

#[test]
fn given_failed_record_when_recording_chunk_then_transition_is_refused() {
    let mut record = JobRecord::new(2);
    record.mark_failed("boom").unwrap();

    assert!(record.record_chunk("late", 1.0, 0.0).is_err());
    assert_eq!(record.processed_chunks(), 0);
}

#[test]
fn given_fixed_chunk_count_when_changing_it_then_transition_is_refused() {
    let mut record = JobRecord::new(0);
    record.set_total_chunks(3).unwrap();

    assert!(record.set_total_chunks(3).is_ok());
    assert!(record.set_total_chunks(4).is_err());
    assert_eq!(record.total_chunks(), 3);
}

#[test]
fn given_running_record_when_serialized_then_error_field_is_omitted() {
    let mut record = JobRecord::new(2);
    record.record_chunk("hi", 1.5, 1.5).unwrap();

    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["progress"], 50.0);
    assert_eq!(json["transcript"], "hi\n");
    assert_eq!(json["total_chunks"], 2);
    assert_eq!(json["processed_chunks"], 1);
    assert_eq!(json["elapsed_time"], 1.5);
    assert_eq!(json["remaining_time"], 1.5);
    assert_eq!(json["complete"], false);
    assert!(json.get("error").is_none());
}

#[test]
fn given_failed_record_when_serialized_then_error_field_is_present() {
    let mut record = JobRecord::new(0);
    record.mark_failed("unsupported format").unwrap();

    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["error"], "unsupported format");
    assert_eq!(json["complete"], false);
}
