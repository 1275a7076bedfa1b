/*!
 * Tests for caption wrapping and layout
 */

use narravid::app_config::{CaptionStyle, VideoConfig};
use narravid::segmenter::CaptionUnit;
use narravid::timeline::CaptionTimeline;
use narravid::video_renderer::VideoRenderer;

fn default_renderer() -> VideoRenderer {
    VideoRenderer::new(CaptionStyle::default(), VideoConfig::default())
}

fn timeline_for(texts: &[&str]) -> CaptionTimeline {
    let units: Vec<CaptionUnit> = texts.iter().map(|t| CaptionUnit::new(*t)).collect();
    let durations = vec![1.0; texts.len()];
    CaptionTimeline::build(units, &durations).unwrap()
}

/// Test that text fitting the budget stays on one line
#[test]
fn test_wrap_caption_withShortText_shouldKeepOneLine() {
    let lines = VideoRenderer::wrap_caption("alpha beta gamma", 20);

    assert_eq!(lines, vec!["alpha beta gamma"]);
}

/// Test greedy filling up to the exact column budget
#[test]
fn test_wrap_caption_withTightBudget_shouldFillGreedily() {
    let lines = VideoRenderer::wrap_caption("alpha beta gamma", 10);

    // "alpha beta" is exactly ten columns
    assert_eq!(lines, vec!["alpha beta", "gamma"]);
}

/// Test that an overlong word gets its own line instead of being broken
#[test]
fn test_wrap_caption_withOverlongWord_shouldNotBreakIt() {
    let lines = VideoRenderer::wrap_caption("extraordinarily long", 5);

    assert_eq!(lines, vec!["extraordinarily", "long"]);
}

/// Test that empty text still produces one empty line
#[test]
fn test_wrap_caption_withEmptyText_shouldProduceOneEmptyLine() {
    let lines = VideoRenderer::wrap_caption("", 10);

    assert_eq!(lines, vec![""]);
}

/// Test that stray leading whitespace from lossy splits is normalized
#[test]
fn test_wrap_caption_withLeadingWhitespace_shouldNormalizeIt() {
    let lines = VideoRenderer::wrap_caption("  spaced out fragment", 30);

    assert_eq!(lines, vec!["spaced out fragment"]);
}

/// Test the column budget math at a common frame width
#[test]
fn test_caption_columns_withHdFrame_shouldUseWrapRatio() {
    let renderer = default_renderer();

    // 1280 * 0.85 = 1088 px of box, 40 * 0.6 = 24 px per glyph
    assert_eq!(renderer.caption_columns(1280), 45);
}

/// Test that the column budget never drops below one
#[test]
fn test_caption_columns_withTinyFrame_shouldClampToOne() {
    let renderer = default_renderer();

    assert_eq!(renderer.caption_columns(10), 1);
}

/// Test that blocks stack downward with the configured spacing
#[test]
fn test_caption_layout_withSingleLineUnits_shouldStackWithSpacing() {
    let renderer = default_renderer();
    let timeline = timeline_for(&["first", "second", "third"]);

    let blocks = renderer.caption_layout(&timeline, 1280);

    assert_eq!(blocks.len(), 3);
    // Line height is 40 * 1.2 = 48, spacing is 10
    assert_eq!(blocks[0].y_offset, 50);
    assert_eq!(blocks[1].y_offset, 108);
    assert_eq!(blocks[2].y_offset, 166);
    assert!(blocks.iter().all(|b| b.line_count == 1));
}

/// Test that a wrapped unit pushes later units further down
#[test]
fn test_caption_layout_withWrappedUnit_shouldReserveItsLines() {
    let renderer = default_renderer();
    let long_text = "this caption is long enough to need two lines here";
    let timeline = timeline_for(&[long_text, "short"]);

    let blocks = renderer.caption_layout(&timeline, 1280);

    assert_eq!(blocks[0].line_count, 2);
    assert!(blocks[0].text.contains('\n'));
    // 50 + 2 * 48 + 10
    assert_eq!(blocks[1].y_offset, 156);
}

/// Test that layout positions do not depend on which entry is rendered,
/// so captions never shift when new ones appear
#[test]
fn test_caption_layout_withSameTimeline_shouldBeStable() {
    let renderer = default_renderer();
    let timeline = timeline_for(&["one", "two"]);

    let first = renderer.caption_layout(&timeline, 1280);
    let second = renderer.caption_layout(&timeline, 1280);

    assert_eq!(first, second);
}
