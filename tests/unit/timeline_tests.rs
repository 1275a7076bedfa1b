/*!
 * Tests for caption timeline construction and SRT export
 */

use narravid::errors::TimelineError;
use narravid::segmenter::CaptionUnit;
use narravid::timeline::{CaptionTimeline, TimelineEntry};

fn units(texts: &[&str]) -> Vec<CaptionUnit> {
    texts.iter().map(|text| CaptionUnit::new(*text)).collect()
}

/// Test that entry starts accumulate the preceding durations
#[test]
fn test_build_withThreeDurations_shouldAccumulateStarts() {
    let timeline =
        CaptionTimeline::build(units(&["a", "b", "c"]), &[2.0, 1.5, 3.0]).unwrap();

    let starts: Vec<f64> = timeline.entries().iter().map(|e| e.start_secs).collect();
    assert_eq!(starts, vec![0.0, 2.0, 3.5]);

    let ends: Vec<f64> = timeline.entries().iter().map(|e| e.end_secs()).collect();
    assert_eq!(ends, vec![2.0, 3.5, 6.5]);

    assert!((timeline.total_duration() - 6.5).abs() < f64::EPSILON);
}

/// Test that mismatched lengths are rejected with both counts reported
#[test]
fn test_build_withMismatchedLengths_shouldReturnLengthMismatch() {
    let result = CaptionTimeline::build(units(&["a", "b"]), &[1.0, 1.0, 1.0]);

    match result {
        Err(TimelineError::LengthMismatch { units, durations }) => {
            assert_eq!(units, 2);
            assert_eq!(durations, 3);
        }
        other => panic!("Expected LengthMismatch, got {:?}", other),
    }
}

/// Test that the mismatch message names both counts
#[test]
fn test_build_withMismatchedLengths_shouldExplainInMessage() {
    let error = CaptionTimeline::build(units(&["a", "b"]), &[1.0]).unwrap_err();
    let display = format!("{}", error);

    assert!(display.contains("2 caption units"));
    assert!(display.contains("1 durations"));
}

/// Test that empty inputs build an empty timeline
#[test]
fn test_build_withEmptyInputs_shouldReturnEmptyTimeline() {
    let timeline = CaptionTimeline::build(Vec::new(), &[]).unwrap();

    assert!(timeline.is_empty());
    assert_eq!(timeline.len(), 0);
    assert_eq!(timeline.total_duration(), 0.0);
    assert_eq!(timeline.to_srt(), "");
}

/// Test that a middle entry shows its prefix with only itself highlighted
#[test]
fn test_visible_units_withMiddleEntry_shouldHighlightOnlyItself() {
    let timeline =
        CaptionTimeline::build(units(&["a", "b", "c"]), &[1.0, 1.0, 1.0]).unwrap();
    let entry = &timeline.entries()[1];

    let visible = timeline.visible_units(entry);
    assert_eq!(visible.len(), 2);
    assert_eq!(visible[0].text, "a");
    assert!(!visible[0].highlighted);
    assert_eq!(visible[1].text, "b");
    assert!(visible[1].highlighted);
}

/// Test that the last entry shows every unit
#[test]
fn test_visible_units_withLastEntry_shouldShowAllUnits() {
    let timeline =
        CaptionTimeline::build(units(&["a", "b", "c"]), &[1.0, 1.0, 1.0]).unwrap();
    let entry = &timeline.entries()[2];

    let visible = timeline.visible_units(entry);
    assert_eq!(visible.len(), 3);
    assert!(visible[2].highlighted);
    assert!(visible.iter().take(2).all(|unit| !unit.highlighted));
}

/// Test that an entry pointing past the last unit yields nothing instead
/// of panicking
#[test]
fn test_visible_units_withOutOfRangeEntry_shouldReturnEmpty() {
    let timeline = CaptionTimeline::build(units(&["a", "b"]), &[1.0, 1.0]).unwrap();
    let stray = TimelineEntry {
        index: 5,
        start_secs: 0.0,
        duration_secs: 1.0,
    };

    assert!(timeline.visible_units(&stray).is_empty());
}

/// Test SRT export numbering, timestamps and cue layout
#[test]
fn test_to_srt_withThreeUnits_shouldFormatCues() {
    let timeline =
        CaptionTimeline::build(units(&["First.", "Second.", "Third."]), &[2.0, 1.5, 3.0])
            .unwrap();

    let srt = timeline.to_srt();
    let expected = "1\n00:00:00,000 --> 00:00:02,000\nFirst.\n\n\
                    2\n00:00:02,000 --> 00:00:03,500\nSecond.\n\n\
                    3\n00:00:03,500 --> 00:00:06,500\nThird.\n\n";

    assert_eq!(srt, expected);
}

/// Test that timestamps roll over into minutes and hours
#[test]
fn test_format_timestamp_withHourSpan_shouldRollOver() {
    assert_eq!(TimelineEntry::format_timestamp(0.0), "00:00:00,000");
    assert_eq!(TimelineEntry::format_timestamp(3.5), "00:00:03,500");
    assert_eq!(TimelineEntry::format_timestamp(71.25), "00:01:11,250");
    assert_eq!(TimelineEntry::format_timestamp(3661.007), "01:01:01,007");
}

/// Test that negative inputs clamp to zero instead of underflowing
#[test]
fn test_format_timestamp_withNegativeSeconds_shouldClampToZero() {
    assert_eq!(TimelineEntry::format_timestamp(-1.0), "00:00:00,000");
}

/// Test that units are stored in segmentation order
#[test]
fn test_units_withBuildInput_shouldKeepOrder() {
    let timeline = CaptionTimeline::build(units(&["x", "y"]), &[1.0, 2.0]).unwrap();

    let stored: Vec<&str> = timeline.units().iter().map(|u| u.text.as_str()).collect();
    assert_eq!(stored, vec!["x", "y"]);
}

/// Test that zero-length durations are allowed and keep the clock in place
#[test]
fn test_build_withZeroDuration_shouldKeepClockStill() {
    let timeline = CaptionTimeline::build(units(&["a", "b"]), &[0.0, 2.0]).unwrap();

    assert_eq!(timeline.entries()[1].start_secs, 0.0);
    assert_eq!(timeline.entries()[1].end_secs(), 2.0);
}
