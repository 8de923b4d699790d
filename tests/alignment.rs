//! Frame alignment integration tests.

use std::time::Duration;

use flightsrt::{
    AlignmentParams, FlightSrtError, NearestRecord, TelemetryRecord, align_frames,
    parse_telemetry, render_records,
};

fn records(indices: impl IntoIterator<Item = u64>) -> Vec<TelemetryRecord> {
    indices
        .into_iter()
        .map(|index| {
            let start = Duration::from_millis((index - 1) * 33);
            TelemetryRecord::new(index, start, start + Duration::from_millis(33), format!("n{index}"))
        })
        .collect()
}

// ── AlignmentParams ────────────────────────────────────────────────

#[test]
fn rejects_non_positive_rates() {
    for (original, extracted) in [(0.0, 1.0), (30.0, 0.0), (-1.0, 1.0), (30.0, f64::NAN)] {
        assert!(matches!(
            AlignmentParams::new(original, extracted),
            Err(FlightSrtError::InvalidFrameRate { .. })
        ));
    }
}

#[test]
fn invalid_rate_message_names_the_argument() {
    let error = AlignmentParams::new(30.0, 0.0).unwrap_err();
    assert_eq!(error.to_string(), "Extracted FPS must be greater than 0, got 0");
}

#[test]
fn interval_is_ratio_of_rates() {
    let params = AlignmentParams::new(29.97, 1.0).unwrap();
    assert!((params.interval() - 29.97).abs() < 1e-9);
    assert_eq!(params.target_index(0), 1);
    assert_eq!(params.target_index(2), 60);
}

// ── align_frames ───────────────────────────────────────────────────

#[test]
fn one_frame_per_second_of_thirty_fps_video() {
    let telemetry = records(1..=300);
    let params = AlignmentParams::new(30.0, 1.0).unwrap();

    let assignments = align_frames(10, &telemetry, &params);

    assert_eq!(assignments.len(), 10);
    assert_eq!(assignments[5].target_index, 151);
    assert_eq!(assignments[5].record().unwrap().sequence_index, 151);
    for (ordinal, assignment) in assignments.iter().enumerate() {
        assert_eq!(assignment.frame_ordinal, ordinal);
    }
}

#[test]
fn frames_past_the_end_snap_to_the_last_record() {
    let telemetry = records(1..=10);
    let params = AlignmentParams::new(30.0, 1.0).unwrap();

    let assignments = align_frames(3, &telemetry, &params);
    assert_eq!(assignments[2].record().unwrap().sequence_index, 10);
}

#[test]
fn empty_telemetry_leaves_every_frame_unmatched() {
    let params = AlignmentParams::new(30.0, 1.0).unwrap();
    let assignments = align_frames(4, &[], &params);
    assert_eq!(assignments.len(), 4);
    assert!(assignments.iter().all(|a| a.is_unmatched()));
}

#[test]
fn zero_frames_yield_no_assignments() {
    let params = AlignmentParams::new(30.0, 1.0).unwrap();
    assert!(align_frames(0, &records(1..=5), &params).is_empty());
}

#[test]
fn alignment_works_on_a_concatenated_render() {
    let rendered = render_records(&records(1..=90));
    let parsed = parse_telemetry(&rendered);
    let params = AlignmentParams::new(30.0, 1.0).unwrap();

    let indices: Vec<u64> = align_frames(3, &parsed.records, &params)
        .iter()
        .map(|a| a.record().unwrap().sequence_index)
        .collect();
    assert_eq!(indices, vec![1, 31, 61]);
}

// ── NearestRecord ──────────────────────────────────────────────────

#[test]
fn unsorted_and_sorted_lookups_agree_without_ties() {
    let sorted = records([1, 4, 9, 16]);
    let mut shuffled = sorted.clone();
    shuffled.swap(0, 3);
    shuffled.swap(1, 2);

    let fast = NearestRecord::new(&sorted);
    let slow = NearestRecord::new(&shuffled);
    for target in 0..20 {
        assert_eq!(
            fast.find(target).map(|r| r.sequence_index),
            slow.find(target).map(|r| r.sequence_index),
            "target {target}"
        );
    }
}

#[test]
fn ties_go_to_the_lower_index() {
    let telemetry = records([10, 20]);
    let nearest = NearestRecord::new(&telemetry);
    assert_eq!(nearest.find(15).unwrap().sequence_index, 10);
}

#[test]
fn unsorted_ties_go_to_the_first_record_in_sequence_order() {
    let telemetry = records([20, 10]);
    let nearest = NearestRecord::new(&telemetry);
    assert_eq!(nearest.find(15).unwrap().sequence_index, 20);
}
